// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream ingest: edge reports into job status.
//!
//! A single [`UpstreamRouter`] drains the transport and forwards each message
//! to the inbox of the pipeline owning its kind. Each pipeline runs a small
//! pool of workers over its inbox; watchdog timeouts arrive on the same inbox.

use crate::context::JobContext;
use crate::patcher::PatchOutcome;
use nt_adapters::{ClusterApi, Transport, TransportError};
use nt_core::{JobKind, TaskJob};
use nt_wire::Message;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Pause after a receive error before trying again.
const RECEIVE_BACKOFF: Duration = Duration::from_secs(1);

/// Reads the transport and fans messages out by job kind.
pub struct UpstreamRouter<T> {
    transport: T,
    routes: HashMap<JobKind, mpsc::Sender<Message>>,
    shutdown: CancellationToken,
}

impl<T: Transport> UpstreamRouter<T> {
    pub fn new(transport: T, shutdown: CancellationToken) -> Self {
        Self { transport, routes: HashMap::new(), shutdown }
    }

    pub fn route(mut self, kind: JobKind, inbox: mpsc::Sender<Message>) -> Self {
        self.routes.insert(kind, inbox);
        self
    }

    /// Run until shutdown or until the transport closes.
    pub async fn run(self) {
        loop {
            let received = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                received = self.transport.receive() => received,
            };
            match received {
                Ok(msg) => self.forward(msg).await,
                Err(TransportError::Closed) => {
                    tracing::info!("transport closed, upstream router exiting");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "receive failed");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(RECEIVE_BACKOFF) => {}
                    }
                }
            }
        }
    }

    async fn forward(&self, msg: Message) {
        let key = match msg.resource_key() {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(resource = msg.resource(), error = %e, "dropping message");
                return;
            }
        };
        if let Some(kind) = msg.kind().filter(|kind| *kind != key.kind) {
            tracing::warn!(resource = %key, operation = %kind, "operation disagrees with resource key, dropping message");
            return;
        }
        let Some(inbox) = self.routes.get(&key.kind) else {
            tracing::debug!(resource = %key, "no pipeline for kind, dropping message");
            return;
        };
        if inbox.send(msg).await.is_err() {
            tracing::warn!(resource = %key, "inbox closed, dropping message");
        }
    }
}

impl<J, T, A> JobContext<J, T, A>
where
    J: TaskJob,
    T: Transport,
    A: ClusterApi,
{
    /// Start `config.workers` workers sharing `inbox`.
    pub fn spawn_workers(self: &Arc<Self>, inbox: mpsc::Receiver<Message>) -> Vec<JoinHandle<()>> {
        let inbox = Arc::new(Mutex::new(inbox));
        (0..self.config.workers.max(1))
            .map(|worker| {
                let ctx = Arc::clone(self);
                let inbox = Arc::clone(&inbox);
                tokio::spawn(async move { ctx.work(worker, inbox).await })
            })
            .collect()
    }

    async fn work(&self, worker: usize, inbox: Arc<Mutex<mpsc::Receiver<Message>>>) {
        tracing::debug!(kind = %J::KIND, worker, "upstream worker started");
        loop {
            let next = {
                let mut inbox = inbox.lock().await;
                tokio::select! {
                    _ = self.shutdown.cancelled() => None,
                    msg = inbox.recv() => msg,
                }
            };
            let Some(msg) = next else { break };
            self.handle_report(msg).await;
        }
        tracing::debug!(kind = %J::KIND, worker, "upstream worker stopped");
    }

    /// Apply one edge report (or injected timeout) to its job.
    pub async fn handle_report(&self, msg: Message) -> Option<PatchOutcome> {
        let key = match msg.resource_key() {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(resource = msg.resource(), error = %e, "dropping report");
                return None;
            }
        };
        if key.kind != J::KIND {
            tracing::warn!(resource = %key, expected = %J::KIND, "report for another kind");
            return None;
        }
        if !self.cache.contains(&key.job_name) {
            tracing::info!(resource = %key, "report for unknown job, dropping");
            return None;
        }
        let update = match J::decode_result(&key.node_name, &msg.content) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(resource = %key, error = %e, "undecodable report body");
                return None;
            }
        };

        let outcome = match self.apply_node_status(&key.job_name, update).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(resource = %key, error = %e, "status patch failed");
                return None;
            }
        };
        match &outcome {
            PatchOutcome::Applied(entry) => {
                tracing::info!(resource = %key, state = %entry.state, reason = %entry.reason, "node status updated");
                if entry.state.is_terminal() {
                    self.finish_node(entry).await;
                }
            }
            PatchOutcome::Unchanged(upsert) => {
                tracing::debug!(resource = %key, ?upsert, "report left status unchanged");
            }
            PatchOutcome::JobGone => {
                tracing::info!(resource = %key, "job deleted while applying report");
            }
        }
        Some(outcome)
    }

    async fn finish_node(&self, entry: &nt_core::NodeTaskStatus) {
        let Some(node) = self.nodes.get(&entry.node_name) else { return };
        let Some(patch) = J::result_node_patch(&node, entry) else { return };
        if let Err(e) = self.api.patch_node(&entry.node_name, &patch).await {
            tracing::warn!(node = %entry.node_name, error = %e, "node patch after result failed");
        }
    }
}

#[cfg(test)]
#[path = "upstream_tests.rs"]
mod tests;
