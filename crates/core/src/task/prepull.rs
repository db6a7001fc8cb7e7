// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{JobError, NodeSelector, TaskJob};
use crate::body::{PrePullRequest, PrePullResponse, TIMEOUT_REASON};
use crate::crd::{ImagePrePullJob, JobStatus, NodeTaskStatus};
use crate::kind::JobKind;
use crate::state::TaskState;
use serde::Deserialize;
use serde_json::{json, Value};

impl TaskJob for ImagePrePullJob {
    const KIND: JobKind = JobKind::ImagePrePull;

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
        if self.spec.images.is_empty() {
            return Err(JobError::InvalidTemplate("images must not be empty".into()));
        }
        if self.spec.images.iter().any(|i| i.trim().is_empty()) {
            return Err(JobError::InvalidTemplate("image names must not be blank".into()));
        }
        Ok(())
    }

    fn project_template(&self, node_name: &str) -> Result<Value, JobError> {
        let request = PrePullRequest {
            images: self.spec.images.clone(),
            node_name: node_name.to_string(),
            secret: self.spec.image_secrets.clone(),
            retry_times: self.spec.retry_times,
            check_items: self.spec.check_items.clone(),
        };
        Ok(serde_json::to_value(request)?)
    }

    fn decode_result(node_name: &str, body: &Value) -> Result<NodeTaskStatus, JobError> {
        let resp = PrePullResponse::deserialize(body)?;
        Ok(NodeTaskStatus {
            node_name: node_name.to_string(),
            state: resp.state,
            reason: resp.reason,
            history: None,
            image_status: resp.image_status,
        })
    }

    fn timeout_body(&self, node_name: &str) -> Value {
        json!({
            "nodeName": node_name,
            "state": TaskState::Failed,
            "reason": TIMEOUT_REASON,
        })
    }
}

#[cfg(test)]
#[path = "prepull_tests.rs"]
mod tests;
