// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job custom resources and their shared status shape.
//!
//! Both kinds are cluster-scoped under `operations.kubeedge.io/v1alpha1`
//! and carry the same [`JobStatus`]: an aggregate state plus one entry
//! per targeted node.

use crate::body::ImageStatus;
use crate::state::TaskState;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Upgrade an edge node's runtime to a given version.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "operations.kubeedge.io",
    version = "v1alpha1",
    kind = "NodeUpgradeJob",
    plural = "nodeupgradejobs",
    singular = "nodeupgradejob",
    status = "JobStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpgradeJobSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds_on_each_node: Option<u32>,
    /// Target version, e.g. `v1.16.0`.
    pub version: String,
    /// Installation package image; the tag is always replaced by `version`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_digest: Option<String>,
    #[serde(default)]
    pub require_confirmation: bool,
}

/// Pull a set of images onto edge nodes ahead of workload scheduling.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "operations.kubeedge.io",
    version = "v1alpha1",
    kind = "ImagePrePullJob",
    plural = "imageprepulljobs",
    singular = "imageprepulljob",
    status = "JobStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ImagePrePullJobSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds_on_each_node: Option<u32>,
    pub images: Vec<String>,
    /// Name of a pull secret, as `namespace/name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_secrets: Option<String>,
    #[serde(default)]
    pub retry_times: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub check_items: Vec<String>,
}

/// Status subresource shared by both job kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub state: TaskState,
    #[serde(default)]
    pub status: Vec<NodeTaskStatus>,
}

impl JobStatus {
    pub fn entry(&self, node_name: &str) -> Option<&NodeTaskStatus> {
        self.status.iter().find(|e| e.node_name == node_name)
    }
}

/// One node's slice of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeTaskStatus {
    pub node_name: String,
    #[serde(default)]
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<UpgradeHistory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_status: Vec<ImageStatus>,
}

impl NodeTaskStatus {
    pub fn new(node_name: impl Into<String>, state: TaskState) -> Self {
        Self { node_name: node_name.into(), state, ..Default::default() }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

/// Upgrade bookkeeping recorded on a node entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeHistory {
    pub history_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<crate::body::UpgradeResult>,
    /// RFC 3339 dispatch time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_time: Option<String>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod tests;
