//! Shared pipeline harness for specs.

pub use kube::runtime::watcher::Event;
pub use nt_adapters::{FakeClusterApi, FakeTransport};
pub use nt_core::test_support::{label_selector, prepull_job, upgrade_job, FakeNodes, NodeBuilder};
pub use nt_core::{
    ImagePrePullJob, JobKind, NodeUpgradeJob, ResourceKey, TaskJob, TaskState, TIMEOUT_REASON,
};
pub use nt_engine::{Controller, ControllerDeps, EngineConfig, UpstreamRouter};
pub use nt_wire::Message;
pub use serde_json::{json, Value};
pub use std::time::Duration;
pub use tokio::time::Instant;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub fn config() -> EngineConfig {
    EngineConfig {
        inbox_buffer: 64,
        workers: 2,
        default_timeout: Duration::from_secs(360),
        poll_interval: Duration::from_secs(10),
    }
}

/// Edge node running a kubelet old enough to be upgraded.
pub fn upgradable(name: &str) -> k8s_openapi::api::core::v1::Node {
    NodeBuilder::new(name).kubelet_version("v1.29.5-kubeedge-v1.18.0").build()
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..128 {
        tokio::task::yield_now().await;
    }
}

/// Sleep, then let the pipeline catch up.
pub async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
    settle().await;
}

/// A running controller for one job kind plus its fakes.
pub struct Pipeline<J: TaskJob> {
    pub ctrl: Controller<J, FakeTransport, FakeClusterApi>,
    pub transport: FakeTransport,
    pub api: FakeClusterApi,
    pub nodes: FakeNodes,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl<J: TaskJob> Pipeline<J> {
    pub fn start(nodes: FakeNodes) -> Self {
        Self::start_with(FakeTransport::new(), FakeClusterApi::new(), nodes)
    }

    fn start_with(transport: FakeTransport, api: FakeClusterApi, nodes: FakeNodes) -> Self {
        let shutdown = CancellationToken::new();
        let deps = ControllerDeps {
            transport: transport.clone(),
            api: api.clone(),
            nodes: Arc::new(nodes.clone()),
        };
        let mut ctrl = Controller::new(deps, config(), shutdown.clone());
        let mut tasks = ctrl.spawn_workers();
        let router = UpstreamRouter::new(transport.clone(), shutdown.clone()).route(J::KIND, ctrl.inbox());
        tasks.push(tokio::spawn(router.run()));
        Self { ctrl, transport, api, nodes, shutdown, tasks }
    }

    /// Create a job on the API server and deliver its watch event.
    pub async fn submit(&self, job: J) {
        self.api.insert(&job);
        self.ctrl.handle_event(Event::Apply(job)).await;
        settle().await;
    }

    /// Stop this controller and start a fresh one over the same API server,
    /// transport and nodes, replaying the initial job listing.
    pub async fn restart(self) -> Self {
        self.shutdown.cancel();
        for task in self.tasks {
            task.await.unwrap();
        }
        let listing: Vec<J> = self.api.jobs::<J>();
        let next = Self::start_with(self.transport, self.api, self.nodes);
        next.ctrl.handle_event(Event::Init).await;
        for job in listing {
            next.ctrl.handle_event(Event::InitApply(job)).await;
        }
        next.ctrl.handle_event(Event::InitDone).await;
        settle().await;
        next
    }

    /// The API server's copy of a job.
    pub fn job(&self, name: &str) -> J {
        self.api.job::<J>(name).unwrap()
    }

    pub fn entry(&self, job: &str, node: &str) -> nt_core::NodeTaskStatus {
        self.job(job).entry(node).cloned().unwrap()
    }

    /// Deliver an edge report answering the task sent for `job`/`node`.
    pub async fn report(&self, job: &str, node: &str, body: Value) {
        let key = ResourceKey::new(J::KIND, job, node);
        let msg = match self.transport.sent_to(&key.to_string()).pop() {
            Some(task) => task.reply(body),
            None => Message::task(&key, body),
        };
        self.transport.deliver(msg);
        settle().await;
    }

    pub fn sends_to(&self, job: &str, node: &str) -> usize {
        self.transport.sent_to(&ResourceKey::new(J::KIND, job, node).to_string()).len()
    }
}
