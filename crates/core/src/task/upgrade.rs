// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{JobError, NodeSelector, TaskJob};
use crate::body::{UpgradeRequest, UpgradeResponse, UpgradeResult, TIMEOUT_REASON};
use crate::crd::{JobStatus, NodeTaskStatus, NodeUpgradeJob, UpgradeHistory};
use crate::kind::JobKind;
use crate::node::{self, UPGRADE_HISTORY_ANNOTATION, UPGRADE_STATUS_LABEL, UPGRADE_STATUS_UPGRADING};
use crate::state::TaskState;
use crate::upgrade::{self, DEFAULT_IMAGE, DEFAULT_UPGRADE_TOOL};
use k8s_openapi::api::core::v1::Node;
use kube::ResourceExt;
use serde::Deserialize;
use serde_json::{json, Value};

impl NodeUpgradeJob {
    /// Full image reference for the installation package at the target version.
    pub fn package_image(&self) -> Result<String, JobError> {
        let image = self.spec.image.as_deref().filter(|i| !i.is_empty()).unwrap_or(DEFAULT_IMAGE);
        let repo = upgrade::image_repo(image)
            .ok_or_else(|| JobError::InvalidTemplate(format!("invalid image {image:?}")))?;
        Ok(format!("{repo}:{}", self.spec.version))
    }
}

impl TaskJob for NodeUpgradeJob {
    const KIND: JobKind = JobKind::NodeUpgrade;

    fn selector(&self) -> NodeSelector<'_> {
        NodeSelector {
            node_names: &self.spec.node_names,
            label_selector: self.spec.label_selector.as_ref(),
        }
    }

    fn timeout_seconds(&self) -> Option<u32> {
        self.spec.timeout_seconds_on_each_node
    }

    fn status(&self) -> Option<&JobStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut JobStatus {
        self.status.get_or_insert_with(JobStatus::default)
    }

    fn validate(&self) -> Result<(), JobError> {
        if self.spec.version.trim().is_empty() {
            return Err(JobError::InvalidTemplate("version is required".into()));
        }
        self.package_image().map(|_| ())
    }

    /// Skips nodes already at the target version and nodes mid-upgrade.
    fn accepts_node(&self, node: &Node) -> bool {
        if node::labels(node).contains_key(UPGRADE_STATUS_LABEL) {
            tracing::debug!(node = node::name(node), "node already upgrading, skipping");
            return false;
        }
        match node::kubelet_version(node) {
            Some(v) if !upgrade::filter_version(v, &self.spec.version) => true,
            version => {
                tracing::debug!(
                    node = node::name(node),
                    ?version,
                    target = %self.spec.version,
                    "node version filtered out"
                );
                false
            }
        }
    }

    fn project_template(&self, _node_name: &str) -> Result<Value, JobError> {
        let request = UpgradeRequest {
            upgrade_id: self.name_any(),
            history_id: uuid::Uuid::new_v4().to_string(),
            version: self.spec.version.clone(),
            upgrade_tool: self
                .spec
                .upgrade_tool
                .clone()
                .unwrap_or_else(|| DEFAULT_UPGRADE_TOOL.to_string()),
            image: self.package_image()?,
            image_digest: self.spec.image_digest.clone(),
            require_confirmation: self.spec.require_confirmation,
        };
        Ok(serde_json::to_value(request)?)
    }

    fn running_entry(&self, node_name: &str, body: &Value) -> NodeTaskStatus {
        let history_id = body.get("historyId").and_then(Value::as_str).unwrap_or_default();
        let mut entry = NodeTaskStatus::new(node_name, TaskState::Running);
        entry.history = Some(UpgradeHistory {
            history_id: history_id.to_string(),
            to_version: self.spec.version.clone(),
            upgrade_time: Some(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        });
        entry
    }

    fn decode_result(node_name: &str, body: &Value) -> Result<NodeTaskStatus, JobError> {
        let resp = UpgradeResponse::deserialize(body)?;
        Ok(NodeTaskStatus {
            node_name: node_name.to_string(),
            state: resp.status.state(),
            reason: resp.reason,
            history: Some(UpgradeHistory {
                history_id: resp.history_id,
                from_version: resp.from_version,
                to_version: resp.to_version,
                result: Some(resp.status),
                upgrade_time: None,
            }),
            image_status: Vec::new(),
        })
    }

    fn timeout_body(&self, node_name: &str) -> Value {
        let history = self.entry(node_name).and_then(|e| e.history.as_ref());
        json!({
            "nodeName": node_name,
            "historyId": history.map(|h| h.history_id.as_str()).unwrap_or_default(),
            "fromVersion": history.map(|h| h.from_version.as_str()).unwrap_or_default(),
            "toVersion": self.spec.version,
            "status": UpgradeResult::UpgradeFailedRollbackSuccess,
            "reason": TIMEOUT_REASON,
        })
    }

    /// Cordon the node and mark it as upgrading.
    fn dispatch_node_patch(&self, _node: &Node) -> Option<Value> {
        Some(json!({
            "metadata": { "labels": { UPGRADE_STATUS_LABEL: UPGRADE_STATUS_UPGRADING } },
            "spec": { "unschedulable": true },
        }))
    }

    /// Uncordon, clear the upgrading label and record successful upgrades.
    fn result_node_patch(node: &Node, entry: &NodeTaskStatus) -> Option<Value> {
        let mut patch = json!({
            "metadata": { "labels": { UPGRADE_STATUS_LABEL: null } },
            "spec": { "unschedulable": false },
        });
        let succeeded = entry.history.as_ref().filter(|_| entry.state == TaskState::Successful);
        if let Some(h) = succeeded {
            let merged = upgrade::merge_upgrade_history(
                node::annotation(node, UPGRADE_HISTORY_ANNOTATION),
                &h.from_version,
                &h.to_version,
            );
            patch["metadata"]["annotations"] = json!({ UPGRADE_HISTORY_ANNOTATION: merged });
        }
        Some(patch)
    }
}

#[cfg(test)]
#[path = "upgrade_tests.rs"]
mod tests;
