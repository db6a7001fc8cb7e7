// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Downstream dispatcher: expand a job into one task per target node.
//!
//! A job is dispatched only while its aggregate state is `initial`. The
//! targeted set is recorded as `initial` entries before any task is sent,
//! then every node gets its own task: send, mark running, bookkeeping,
//! watchdog. Jobs seen for the first time past `initial` (controller
//! restart) get watchdogs re-armed for their unfinished entries instead.

use crate::context::JobContext;
use kube::Resource;
use nt_adapters::{ClusterApi, Transport};
use nt_core::{resolve_nodes, ResourceKey, TaskJob, TaskState};
use nt_wire::Message;
use std::sync::Arc;
use std::time::Duration;

const SEED_RETRY: Duration = Duration::from_secs(1);

impl<J, T, A> JobContext<J, T, A>
where
    J: TaskJob,
    T: Transport,
    A: ClusterApi,
{
    /// A job appeared. The cache is updated before any dispatch decision.
    pub async fn on_job_added(self: &Arc<Self>, job: J) {
        let job = self.cache.store(job);
        let name = job.job_name();
        match job.state() {
            TaskState::Initial => self.dispatch(job).await,
            state if state.is_terminal() => {
                tracing::debug!(kind = %J::KIND, job = %name, %state, "job already finished");
            }
            state => {
                tracing::info!(kind = %J::KIND, job = %name, %state, "job in flight, re-arming watchdogs");
                self.rearm(&job);
            }
        }
    }

    /// A job changed. Unknown jobs are treated as new; known jobs are stored
    /// only. A cached name with a different uid was deleted and recreated
    /// while the watch was away, so the old run is dropped first.
    pub async fn on_job_updated(self: &Arc<Self>, job: J) {
        match self.cache.get(&job.job_name()) {
            Some(cached) if cached.meta().uid != job.meta().uid => {
                self.on_job_deleted(&cached);
                self.on_job_added(job).await;
            }
            Some(_) => {
                self.cache.store(job);
            }
            None => self.on_job_added(job).await,
        }
    }

    pub fn on_job_deleted(&self, job: &J) {
        let name = job.job_name();
        self.cache.remove(&name);
        self.forget_lock(&name);
        tracing::info!(kind = %J::KIND, job = %name, "job deleted");
    }

    async fn dispatch(self: &Arc<Self>, job: Arc<J>) {
        let name = job.job_name();
        if let Err(e) = job.validate() {
            tracing::error!(kind = %J::KIND, job = %name, error = %e, "rejecting job");
            return;
        }
        let nodes = match resolve_nodes(&*job, &*self.nodes) {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::error!(kind = %J::KIND, job = %name, error = %e, "rejecting job");
                return;
            }
        };
        if nodes.is_empty() {
            tracing::info!(kind = %J::KIND, job = %name, "no eligible nodes, nothing to dispatch");
            return;
        }

        if !self.seed_until_stored(&name, &nodes).await {
            return;
        }
        tracing::info!(kind = %J::KIND, job = %name, count = nodes.len(), "dispatching job");

        for node in nodes {
            let ctx = Arc::clone(self);
            let job = Arc::clone(&job);
            tokio::spawn(async move { ctx.dispatch_node(job, node).await });
        }
    }

    /// Record the targeted set, retrying until the patch lands. No task may
    /// go out before every target has an entry. Returns false when the job
    /// was deleted or shutdown began first.
    async fn seed_until_stored(&self, name: &str, nodes: &[String]) -> bool {
        loop {
            match self.seed_nodes(name, nodes).await {
                Ok(seeded) => return seeded,
                Err(e) => {
                    tracing::warn!(kind = %J::KIND, job = %name, error = %e, "failed to record target nodes, retrying");
                }
            }
            tokio::select! {
                _ = self.shutdown.cancelled() => return false,
                _ = tokio::time::sleep(SEED_RETRY) => {}
            }
        }
    }

    async fn dispatch_node(self: Arc<Self>, job: Arc<J>, node: String) {
        let key = ResourceKey::new(J::KIND, job.job_name(), &node);
        match job.project_template(&node) {
            Ok(body) => self.send_task(&job, &key, body).await,
            Err(e) => {
                tracing::warn!(resource = %key, error = %e, "cannot build task body");
            }
        }
        let timeout = job.timeout(self.config.default_timeout);
        self.watch(key, timeout).await;
    }

    async fn send_task(&self, job: &J, key: &ResourceKey, body: serde_json::Value) {
        let msg = Message::task(key, body.clone());
        if let Err(e) = self.transport.send(msg).await {
            tracing::warn!(resource = %key, error = %e, "task send failed, waiting for timeout");
            return;
        }
        tracing::info!(resource = %key, "task sent");

        let running = job.running_entry(&key.node_name, &body);
        if let Err(e) = self.apply_node_status(&key.job_name, running).await {
            tracing::warn!(resource = %key, error = %e, "failed to mark node running");
        }

        let Some(node) = self.nodes.get(&key.node_name) else { return };
        if let Some(patch) = job.dispatch_node_patch(&node) {
            if let Err(e) = self.api.patch_node(&key.node_name, &patch).await {
                tracing::warn!(node = %key.node_name, error = %e, "node patch after dispatch failed");
            }
        }
    }

    fn rearm(self: &Arc<Self>, job: &J) {
        let Some(status) = job.status() else { return };
        let timeout = job.timeout(self.config.default_timeout);
        for entry in status.status.iter().filter(|e| !e.state.is_terminal()) {
            let key = ResourceKey::new(J::KIND, job.job_name(), &entry.node_name);
            let ctx = Arc::clone(self);
            tokio::spawn(async move { ctx.watch(key, timeout).await });
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
