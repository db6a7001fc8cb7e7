// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message bodies exchanged with edge nodes.
//!
//! All bodies are camelCase JSON. Unknown fields are ignored on receipt and
//! absent optional fields fall back to their defaults.

use crate::state::TaskState;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reason recorded when an edge node never answers within its deadline.
pub const TIMEOUT_REASON: &str = "timeout to receive response from edge";

/// Cloud to edge: upgrade one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    pub upgrade_id: String,
    pub history_id: String,
    pub version: String,
    pub upgrade_tool: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_digest: Option<String>,
    #[serde(default)]
    pub require_confirmation: bool,
}

/// Final outcome reported by the edge upgrade tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeResult {
    UpgradeSuccess,
    UpgradeFailedRollbackSuccess,
    UpgradeFailedRollbackFailed,
}

crate::simple_display! {
    UpgradeResult {
        UpgradeSuccess => "upgrade_success",
        UpgradeFailedRollbackSuccess => "upgrade_failed_rollback_success",
        UpgradeFailedRollbackFailed => "upgrade_failed_rollback_failed",
    }
}

impl UpgradeResult {
    pub fn state(self) -> TaskState {
        match self {
            UpgradeResult::UpgradeSuccess => TaskState::Successful,
            UpgradeResult::UpgradeFailedRollbackSuccess
            | UpgradeResult::UpgradeFailedRollbackFailed => TaskState::Failed,
        }
    }
}

/// Edge to cloud: result of an upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeResponse {
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub history_id: String,
    #[serde(default)]
    pub from_version: String,
    #[serde(default)]
    pub to_version: String,
    pub status: UpgradeResult,
    #[serde(default)]
    pub reason: String,
}

/// Cloud to edge: pull images on one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrePullRequest {
    pub images: Vec<String>,
    pub node_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub retry_times: u32,
    #[serde(default)]
    pub check_items: Vec<String>,
}

/// Edge to cloud: result of a prepull.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrePullResponse {
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub state: TaskState,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub image_status: Vec<ImageStatus>,
}

/// Pull outcome for a single image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageStatus {
    pub image: String,
    #[serde(default)]
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

#[cfg(test)]
#[path = "body_tests.rs"]
mod tests;
