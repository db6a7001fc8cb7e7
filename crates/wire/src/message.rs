// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use nt_core::{JobKind, KeyError, ResourceKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Module name the controller uses as message source.
pub const SOURCE_TASK_MANAGER: &str = "taskmanager";

/// Routing group for task messages.
pub const GROUP_TASK: &str = "task";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "msg_id")]
    pub id: String,
    #[serde(rename = "parent_msg_id", default, skip_serializing_if = "String::is_empty")]
    pub parent_id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub sync: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Router {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub group: String,
    pub resource: String,
    pub operation: String,
}

/// A message on the cloud/edge hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub header: Header,
    pub router: Router,
    #[serde(default)]
    pub content: Value,
}

impl Message {
    /// New task message addressed by `key`, with the kind token as operation.
    pub fn task(key: &ResourceKey, content: Value) -> Self {
        Self {
            header: Header {
                id: uuid::Uuid::new_v4().to_string(),
                parent_id: String::new(),
                timestamp: chrono::Utc::now().timestamp_millis(),
                sync: false,
            },
            router: Router {
                source: SOURCE_TASK_MANAGER.to_string(),
                group: GROUP_TASK.to_string(),
                resource: key.to_string(),
                operation: key.kind.token().to_string(),
            },
            content,
        }
    }

    /// Answer to this message with the same route.
    pub fn reply(&self, content: Value) -> Self {
        let mut reply = Self {
            header: Header {
                id: uuid::Uuid::new_v4().to_string(),
                parent_id: self.header.id.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
                sync: false,
            },
            router: self.router.clone(),
            content,
        };
        reply.router.source = self.router.group.clone();
        reply
    }

    pub fn id(&self) -> &str {
        &self.header.id
    }

    pub fn resource(&self) -> &str {
        &self.router.resource
    }

    pub fn resource_key(&self) -> Result<ResourceKey, KeyError> {
        ResourceKey::parse(&self.router.resource)
    }

    /// Kind named by the operation, if it is one of ours.
    pub fn kind(&self) -> Option<JobKind> {
        JobKind::from_token(&self.router.operation)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
