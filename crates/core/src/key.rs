// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource key codec: `{kind}/{jobName}/node/{nodeName}`.
//!
//! Kinds, job names and node names are DNS labels, so no escaping is needed.
//! Parsing only looks at positions 0, 1 and 3; trailing segments are ignored.

use crate::kind::JobKind;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const NODE_SEGMENT: &str = "node";
const MIN_SEGMENTS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("malformed resource key {key:?}: expected at least 4 segments, found {found}")]
    TooFewSegments { key: String, found: usize },
    #[error("unknown job kind {0:?} in resource key")]
    UnknownKind(String),
    #[error("empty {field} in resource key {key:?}")]
    EmptyField { field: &'static str, key: String },
}

/// Routing address carried by every task message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: JobKind,
    pub job_name: String,
    pub node_name: String,
}

impl ResourceKey {
    pub fn new(kind: JobKind, job_name: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self { kind, job_name: job_name.into(), node_name: node_name.into() }
    }

    pub fn parse(key: &str) -> Result<Self, KeyError> {
        let parts: Vec<&str> = key.split('/').collect();
        if parts.len() < MIN_SEGMENTS {
            return Err(KeyError::TooFewSegments { key: key.to_string(), found: parts.len() });
        }
        let kind =
            JobKind::from_token(parts[0]).ok_or_else(|| KeyError::UnknownKind(parts[0].into()))?;
        let job_name = non_empty(parts[1], "job name", key)?;
        let node_name = non_empty(parts[3], "node name", key)?;
        Ok(Self { kind, job_name, node_name })
    }
}

fn non_empty(value: &str, field: &'static str, key: &str) -> Result<String, KeyError> {
    if value.is_empty() {
        return Err(KeyError::EmptyField { field, key: key.to_string() });
    }
    Ok(value.to_string())
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.kind, self.job_name, NODE_SEGMENT, self.node_name)
    }
}

impl FromStr for ResourceKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
