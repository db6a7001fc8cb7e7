// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status patcher: apply node updates to a job through its status subresource.
//!
//! Each call copies the cached job, applies the update, diffs the two into a
//! JSON merge patch and submits it. The stored result is written back to
//! the cache. Calls for the same job are serialized.

use crate::context::JobContext;
use crate::error::EngineError;
use nt_adapters::{ClusterApi, Transport};
use nt_core::status::{self, Upsert};
use nt_core::{merge_patch, NodeTaskStatus, TaskJob};
use std::sync::Arc;

/// Result of a status update
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    /// The entry changed and the patch was stored.
    Applied(NodeTaskStatus),
    /// Nothing to write.
    Unchanged(Upsert),
    /// The job is no longer cached.
    JobGone,
}

impl<J, T, A> JobContext<J, T, A>
where
    J: TaskJob,
    T: Transport,
    A: ClusterApi,
{
    /// Upsert one node entry and recompute the aggregate.
    pub async fn apply_node_status(
        &self,
        job_name: &str,
        update: NodeTaskStatus,
    ) -> Result<PatchOutcome, EngineError> {
        let lock = self.job_lock(job_name);
        let _guard = lock.lock().await;

        let Some(current) = self.cache.get(job_name) else {
            return Ok(PatchOutcome::JobGone);
        };
        let node_name = update.node_name.clone();
        let mut next = (*current).clone();
        let job_status = next.status_mut();
        let upsert = status::upsert(job_status, update);
        if !upsert.changed() {
            return Ok(PatchOutcome::Unchanged(upsert));
        }
        job_status.state = status::aggregate(job_status);

        let Some(entry) = next.entry(&node_name).cloned() else {
            return Ok(PatchOutcome::Unchanged(upsert));
        };
        let stored = self.submit(&current, &next).await?;
        tracing::debug!(
            job = job_name,
            node = %node_name,
            state = %entry.state,
            job_state = %stored.state(),
            "node status patched"
        );
        Ok(PatchOutcome::Applied(entry))
    }

    /// Record the targeted node set as `initial` entries and mark the job running.
    pub async fn seed_nodes(&self, job_name: &str, nodes: &[String]) -> Result<bool, EngineError> {
        let lock = self.job_lock(job_name);
        let _guard = lock.lock().await;

        let Some(current) = self.cache.get(job_name) else {
            return Ok(false);
        };
        let mut next = (*current).clone();
        status::seed(next.status_mut(), nodes);
        self.submit(&current, &next).await?;
        Ok(true)
    }

    async fn submit(&self, current: &Arc<J>, next: &J) -> Result<Arc<J>, EngineError> {
        let patch = merge_patch::diff(&serde_json::to_value(&**current)?, &serde_json::to_value(next)?);
        if merge_patch::is_empty(&patch) {
            return Ok(Arc::clone(current));
        }
        let name = current.job_name();
        let stored: J = self.api.patch_job_status(&name, &patch).await?;
        Ok(self.cache.store(stored))
    }
}

#[cfg(test)]
#[path = "patcher_tests.rs"]
mod tests;
