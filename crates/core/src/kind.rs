// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job kinds and their wire tokens.

use serde::{Deserialize, Serialize};

/// API group shared by both job resources.
pub const GROUP: &str = "operations.kubeedge.io";

/// API version shared by both job resources.
pub const VERSION: &str = "v1alpha1";

/// The two job kinds that share the dispatch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    #[serde(rename = "upgrade")]
    NodeUpgrade,
    #[serde(rename = "prepull")]
    ImagePrePull,
}

crate::simple_display! {
    JobKind {
        NodeUpgrade => "upgrade",
        ImagePrePull => "prepull",
    }
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::NodeUpgrade, JobKind::ImagePrePull];

    /// Token used as the first resource-key segment and as the message operation.
    pub fn token(self) -> &'static str {
        match self {
            JobKind::NodeUpgrade => "upgrade",
            JobKind::ImagePrePull => "prepull",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.token() == token)
    }

    /// Plural resource name of the job CRD.
    pub fn plural(self) -> &'static str {
        match self {
            JobKind::NodeUpgrade => "nodeupgradejobs",
            JobKind::ImagePrePull => "imageprepulljobs",
        }
    }
}

#[cfg(test)]
#[path = "kind_tests.rs"]
mod tests;
