// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One pipeline per job kind, driven by a watch stream.
//!
//! A re-list (`Init` .. `InitDone`) carries no deletes, so jobs cached
//! but absent from the listing are dropped when it completes.

use crate::context::{ControllerDeps, EngineConfig, JobContext};
use futures_util::{Stream, StreamExt};
use kube::runtime::watcher;
use nt_adapters::{ClusterApi, Transport};
use nt_core::TaskJob;
use nt_wire::Message;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Controller<J, T, A> {
    ctx: Arc<JobContext<J, T, A>>,
    inbox_rx: Option<mpsc::Receiver<Message>>,
    /// Names seen since the last `Init`, while a re-list is in progress.
    relisted: Mutex<Option<HashSet<String>>>,
}

impl<J, T, A> Controller<J, T, A>
where
    J: TaskJob,
    T: Transport,
    A: ClusterApi,
{
    pub fn new(deps: ControllerDeps<T, A>, config: EngineConfig, shutdown: CancellationToken) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel(config.inbox_buffer.max(1));
        let ctx = Arc::new(JobContext::new(deps, config, inbox_tx, shutdown));
        Self { ctx, inbox_rx: Some(inbox_rx), relisted: Mutex::new(None) }
    }

    /// Sender side of the upstream inbox, for the router.
    pub fn inbox(&self) -> mpsc::Sender<Message> {
        self.ctx.inbox.clone()
    }

    pub fn context(&self) -> &Arc<JobContext<J, T, A>> {
        &self.ctx
    }

    /// Start the upstream workers. Only the first call spawns anything.
    pub fn spawn_workers(&mut self) -> Vec<JoinHandle<()>> {
        match self.inbox_rx.take() {
            Some(inbox) => self.ctx.spawn_workers(inbox),
            None => {
                tracing::warn!(kind = %J::KIND, "workers already running");
                Vec::new()
            }
        }
    }

    pub async fn handle_event(&self, event: watcher::Event<J>) {
        match event {
            watcher::Event::Apply(job) => self.ctx.on_job_updated(job).await,
            watcher::Event::InitApply(job) => {
                if let Some(seen) = self.relisted.lock().as_mut() {
                    seen.insert(job.job_name());
                }
                self.ctx.on_job_updated(job).await;
            }
            watcher::Event::Delete(job) => self.ctx.on_job_deleted(&job),
            watcher::Event::Init => {
                tracing::debug!(kind = %J::KIND, "job list resync started");
                *self.relisted.lock() = Some(HashSet::new());
            }
            watcher::Event::InitDone => {
                let seen = self.relisted.lock().take();
                if let Some(seen) = seen {
                    self.prune_unlisted(&seen);
                }
                tracing::debug!(kind = %J::KIND, jobs = self.ctx.cache.len(), "job list resync done");
            }
        }
    }

    fn prune_unlisted(&self, seen: &HashSet<String>) {
        for name in self.ctx.cache.names() {
            if seen.contains(&name) {
                continue;
            }
            if let Some(job) = self.ctx.cache.get(&name) {
                tracing::info!(kind = %J::KIND, job = %name, "job missing from listing");
                self.ctx.on_job_deleted(&job);
            }
        }
    }

    /// Consume watch events until shutdown or the stream ends.
    pub async fn run<S>(&self, events: S)
    where
        S: Stream<Item = Result<watcher::Event<J>, watcher::Error>> + Send,
    {
        futures_util::pin_mut!(events);
        loop {
            let next = tokio::select! {
                _ = self.ctx.shutdown.cancelled() => break,
                next = events.next() => next,
            };
            match next {
                Some(Ok(event)) => self.handle_event(event).await,
                Some(Err(e)) => tracing::warn!(kind = %J::KIND, error = %e, "job watch error"),
                None => {
                    tracing::info!(kind = %J::KIND, "job watch ended");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
