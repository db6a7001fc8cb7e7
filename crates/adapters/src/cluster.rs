// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster API writes: job status subresource and node bookkeeping.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use nt_core::TaskJob;
use serde_json::Value;
use thiserror::Error;

/// Errors from cluster API calls
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("kube api error: {0}")]
    Kube(#[from] kube::Error),
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Writes the controller performs against the API server.
#[async_trait]
pub trait ClusterApi: Clone + Send + Sync + 'static {
    /// Merge-patch the status subresource of a job and return the stored object.
    async fn patch_job_status<J: TaskJob>(&self, name: &str, patch: &Value) -> Result<J, ApiError>;

    /// Merge-patch a node.
    async fn patch_node(&self, name: &str, patch: &Value) -> Result<(), ApiError>;
}

/// [`ClusterApi`] backed by a kube client.
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
}

impl KubeClusterApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn patch_job_status<J: TaskJob>(&self, name: &str, patch: &Value) -> Result<J, ApiError> {
        let api: Api<J> = Api::all(self.client.clone());
        let job = api.patch_status(name, &PatchParams::default(), &Patch::Merge(patch)).await?;
        Ok(job)
    }

    async fn patch_node(&self, name: &str, patch: &Value) -> Result<(), ApiError> {
        let api: Api<Node> = Api::all(self.client.clone());
        api.patch(name, &PatchParams::default(), &Patch::Merge(patch)).await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ApiError, ClusterApi};
    use async_trait::async_trait;
    use kube::Resource;
    use nt_core::{merge_patch, JobKind, TaskJob};
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Recorded status patch
    #[derive(Debug, Clone, PartialEq)]
    pub struct StatusPatchCall {
        pub kind: JobKind,
        pub name: String,
        pub patch: Value,
    }

    /// Recorded node patch
    #[derive(Debug, Clone, PartialEq)]
    pub struct NodePatchCall {
        pub name: String,
        pub patch: Value,
    }

    #[derive(Default)]
    struct FakeClusterState {
        jobs: HashMap<(JobKind, String), Value>,
        status_patches: Vec<StatusPatchCall>,
        node_patches: Vec<NodePatchCall>,
        fail_status: bool,
        resource_version: u64,
    }

    /// In-memory API server for jobs. Status patches are applied with merge
    /// semantics and bump the resource version.
    #[derive(Clone, Default)]
    pub struct FakeClusterApi {
        inner: Arc<Mutex<FakeClusterState>>,
    }

    impl FakeClusterApi {
        pub fn new() -> Self {
            Self::default()
        }

        /// Store a job as the API server would hold it.
        pub fn insert<J: TaskJob>(&self, job: &J) {
            let mut inner = self.inner.lock();
            let rv = job.resource_version_number().unwrap_or(0);
            inner.resource_version = inner.resource_version.max(rv);
            if let Ok(value) = serde_json::to_value(job) {
                inner.jobs.insert((J::KIND, job.job_name()), value);
            }
        }

        /// Current stored copy of a job.
        pub fn job<J: TaskJob>(&self, name: &str) -> Option<J> {
            let inner = self.inner.lock();
            let value = inner.jobs.get(&(J::KIND, name.to_string()))?;
            serde_json::from_value(value.clone()).ok()
        }

        /// Every stored job of one kind, as a watch listing would return them.
        pub fn jobs<J: TaskJob>(&self) -> Vec<J> {
            let inner = self.inner.lock();
            let mut jobs: Vec<J> = inner
                .jobs
                .iter()
                .filter(|((kind, _), _)| *kind == J::KIND)
                .filter_map(|(_, value)| serde_json::from_value(value.clone()).ok())
                .collect();
            jobs.sort_by_key(|j| j.job_name());
            jobs
        }

        pub fn status_patches(&self) -> Vec<StatusPatchCall> {
            self.inner.lock().status_patches.clone()
        }

        pub fn node_patches(&self) -> Vec<NodePatchCall> {
            self.inner.lock().node_patches.clone()
        }

        /// Make status patches fail until reset.
        pub fn fail_status_patches(&self, fail: bool) {
            self.inner.lock().fail_status = fail;
        }
    }

    #[async_trait]
    impl ClusterApi for FakeClusterApi {
        async fn patch_job_status<J: TaskJob>(&self, name: &str, patch: &Value) -> Result<J, ApiError> {
            let mut inner = self.inner.lock();
            if inner.fail_status {
                return Err(ApiError::Rejected("injected failure".into()));
            }
            inner.resource_version += 1;
            let rv = inner.resource_version.to_string();
            let stored = inner
                .jobs
                .get_mut(&(J::KIND, name.to_string()))
                .ok_or_else(|| ApiError::NotFound { kind: J::KIND.token(), name: name.to_string() })?;
            merge_patch::apply(stored, patch);
            let mut job: J = serde_json::from_value(stored.clone())
                .map_err(|e| ApiError::Rejected(e.to_string()))?;
            job.meta_mut().resource_version = Some(rv);
            if let Ok(value) = serde_json::to_value(&job) {
                *stored = value;
            }
            inner.status_patches.push(StatusPatchCall {
                kind: J::KIND,
                name: name.to_string(),
                patch: patch.clone(),
            });
            Ok(job)
        }

        async fn patch_node(&self, name: &str, patch: &Value) -> Result<(), ApiError> {
            self.inner
                .lock()
                .node_patches
                .push(NodePatchCall { name: name.to_string(), patch: patch.clone() });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeClusterApi, NodePatchCall, StatusPatchCall};

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
