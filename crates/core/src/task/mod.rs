// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kind strategy for the dispatch pipeline.
//!
//! The pipeline is kind-agnostic. Everything that differs between upgrade
//! and prepull jobs (message bodies, node eligibility, node bookkeeping)
//! lives behind [`TaskJob`].

mod prepull;
mod upgrade;

use crate::crd::{JobStatus, NodeTaskStatus};
use crate::kind::JobKind;
use crate::selector::SelectorError;
use crate::state::TaskState;
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Per-node timeout when the job does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(360);

/// Job-level failures. These leave the job at `initial` with no entries.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job has neither nodeNames nor labelSelector")]
    NoSelector,
    #[error("job sets both nodeNames and labelSelector")]
    AmbiguousSelector,
    #[error("invalid label selector: {0}")]
    Selector(#[from] SelectorError),
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("invalid message body: {0}")]
    Body(#[from] serde_json::Error),
}

/// The node selector half of a job spec.
#[derive(Debug, Clone, Copy)]
pub struct NodeSelector<'a> {
    pub node_names: &'a [String],
    pub label_selector: Option<&'a LabelSelector>,
}

/// A job kind the pipeline can dispatch.
pub trait TaskJob:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: JobKind;

    fn selector(&self) -> NodeSelector<'_>;

    fn timeout_seconds(&self) -> Option<u32>;

    fn status(&self) -> Option<&JobStatus>;

    fn status_mut(&mut self) -> &mut JobStatus;

    /// Check the kind-specific template before any node is touched.
    fn validate(&self) -> Result<(), JobError>;

    /// Kind-specific node filter applied after the edge and readiness checks.
    fn accepts_node(&self, _node: &Node) -> bool {
        true
    }

    /// Message body sent to one node.
    fn project_template(&self, node_name: &str) -> Result<Value, JobError>;

    /// Entry recorded once the body has been handed to the transport.
    fn running_entry(&self, node_name: &str, _body: &Value) -> NodeTaskStatus {
        NodeTaskStatus::new(node_name, TaskState::Running)
    }

    /// Decode an edge report for `node_name`.
    fn decode_result(node_name: &str, body: &Value) -> Result<NodeTaskStatus, JobError>;

    /// Body injected upstream when `node_name` misses its deadline.
    fn timeout_body(&self, node_name: &str) -> Value;

    /// Merge patch applied to a node after its task is dispatched.
    fn dispatch_node_patch(&self, _node: &Node) -> Option<Value> {
        None
    }

    /// Merge patch applied to a node once its entry turns terminal.
    fn result_node_patch(_node: &Node, _entry: &NodeTaskStatus) -> Option<Value> {
        None
    }

    fn job_name(&self) -> String {
        self.name_any()
    }

    fn state(&self) -> TaskState {
        self.status().map(|s| s.state).unwrap_or_default()
    }

    fn entry(&self, node_name: &str) -> Option<&NodeTaskStatus> {
        self.status()?.entry(node_name)
    }

    /// Per-node deadline; zero or absent falls back to `default`.
    fn timeout(&self, default: Duration) -> Duration {
        match self.timeout_seconds() {
            Some(secs) if secs > 0 => Duration::from_secs(u64::from(secs)),
            _ => default,
        }
    }

    /// Numeric resource version, when the server set one.
    fn resource_version_number(&self) -> Option<u64> {
        self.meta().resource_version.as_deref()?.parse().ok()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
