// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state for one job kind's pipeline.

use crate::cache::TaskCache;
use nt_adapters::{ClusterApi, Transport};
use nt_core::{NodeLister, TaskJob, DEFAULT_TIMEOUT};
use nt_wire::Message;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Pipeline tuning for one job kind
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of the upstream inbox
    pub inbox_buffer: usize,
    /// Upstream worker count
    pub workers: usize,
    /// Per-node deadline when a job sets none
    pub default_timeout: Duration,
    /// Watchdog poll period
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inbox_buffer: 1024,
            workers: 1,
            default_timeout: DEFAULT_TIMEOUT,
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// External collaborators of a pipeline
pub struct ControllerDeps<T, A> {
    pub transport: T,
    pub api: A,
    pub nodes: Arc<dyn NodeLister>,
}

/// Everything the dispatcher, watchdogs, workers and patcher share.
///
/// The cache is owned here; the dispatcher writes it from watch events and
/// the patcher, workers and watchdogs read it.
pub struct JobContext<J, T, A> {
    pub cache: TaskCache<J>,
    pub transport: T,
    pub api: A,
    pub nodes: Arc<dyn NodeLister>,
    /// Upstream inbox; watchdogs inject timeouts here.
    pub inbox: mpsc::Sender<Message>,
    pub config: EngineConfig,
    pub shutdown: CancellationToken,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<J, T, A> JobContext<J, T, A>
where
    J: TaskJob,
    T: Transport,
    A: ClusterApi,
{
    pub fn new(
        deps: ControllerDeps<T, A>,
        config: EngineConfig,
        inbox: mpsc::Sender<Message>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cache: TaskCache::new(),
            transport: deps.transport,
            api: deps.api,
            nodes: deps.nodes,
            inbox,
            config,
            shutdown,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Per-job lock serializing status patches.
    pub(crate) fn job_lock(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.locks.lock().entry(name.to_string()).or_default())
    }

    pub(crate) fn forget_lock(&self, name: &str) {
        self.locks.lock().remove(name);
    }
}
