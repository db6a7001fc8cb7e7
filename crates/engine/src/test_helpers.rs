// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for pipeline tests.

use crate::context::{ControllerDeps, EngineConfig, JobContext};
use nt_adapters::{FakeClusterApi, FakeTransport};
use nt_core::test_support::FakeNodes;
use nt_core::TaskJob;
use nt_wire::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub(crate) type TestContext<J> = JobContext<J, FakeTransport, FakeClusterApi>;

pub(crate) struct Harness<J> {
    pub ctx: Arc<TestContext<J>>,
    pub transport: FakeTransport,
    pub api: FakeClusterApi,
    pub nodes: FakeNodes,
    pub inbox: mpsc::Receiver<Message>,
    pub shutdown: CancellationToken,
}

pub(crate) fn test_config() -> EngineConfig {
    EngineConfig {
        inbox_buffer: 64,
        workers: 2,
        default_timeout: Duration::from_secs(360),
        poll_interval: Duration::from_secs(10),
    }
}

/// Pipeline over fakes with ready edge nodes named `nodes`.
pub(crate) fn harness<J: TaskJob>(nodes: &[&str]) -> Harness<J> {
    let transport = FakeTransport::new();
    let api = FakeClusterApi::new();
    let nodes = FakeNodes::edge(nodes);
    let shutdown = CancellationToken::new();
    let (inbox_tx, inbox) = mpsc::channel(64);
    let deps = ControllerDeps {
        transport: transport.clone(),
        api: api.clone(),
        nodes: Arc::new(nodes.clone()),
    };
    let ctx = Arc::new(JobContext::new(deps, test_config(), inbox_tx, shutdown.clone()));
    Harness { ctx, transport, api, nodes, inbox, shutdown }
}

impl<J: TaskJob> Harness<J> {
    /// Store `job` in both the fake API server and the cache.
    pub fn insert(&self, job: J) -> Arc<J> {
        self.api.insert(&job);
        self.ctx.cache.store(job)
    }

    /// The API server's copy of a job.
    pub fn stored(&self, name: &str) -> J {
        self.api.job::<J>(name).unwrap_or_else(|| panic!("job {name} not stored"))
    }
}

/// Let spawned tasks run until they block.
pub(crate) async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}
