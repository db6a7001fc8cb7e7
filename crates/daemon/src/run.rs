// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon wiring: node cache, hub, one pipeline per job kind.

use crate::config::Config;
use futures_util::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Node;
use kube::runtime::{reflector, watcher, WatchStreamExt};
use kube::{Api, Client};
use nt_adapters::{HubTransport, KubeClusterApi, ReflectorNodes};
use nt_core::{ImagePrePullJob, JobKind, NodeLister, NodeUpgradeJob};
use nt_engine::{Controller, ControllerDeps, UpstreamRouter};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("kube client error: {0}")]
    Kube(#[from] kube::Error),
    #[error("node cache stopped before its first sync")]
    NodeCacheClosed,
}

/// Run the controller until `shutdown` is cancelled.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<(), DaemonError> {
    let client = Client::try_default().await?;

    let (node_store, node_writer) = reflector::store::<Node>();
    let node_events = reflector::reflector(
        node_writer,
        watcher(Api::<Node>::all(client.clone()), watcher::Config::default()).default_backoff(),
    );
    let node_cache = tokio::spawn(drain("nodes", node_events, shutdown.clone()));
    tracing::info!("waiting for node cache");
    node_store.wait_until_ready().await.map_err(|_| DaemonError::NodeCacheClosed)?;
    let nodes: Arc<dyn NodeLister> = Arc::new(ReflectorNodes::new(node_store));

    let transport = HubTransport::connect(config.hub.hub_config(), shutdown.clone());
    let api = KubeClusterApi::new(client.clone());
    let deps = || ControllerDeps { transport: transport.clone(), api: api.clone(), nodes: Arc::clone(&nodes) };

    let mut upgrade: Controller<NodeUpgradeJob, _, _> =
        Controller::new(deps(), config.upgrade.engine_config(), shutdown.clone());
    let mut prepull: Controller<ImagePrePullJob, _, _> =
        Controller::new(deps(), config.prepull.engine_config(), shutdown.clone());

    let mut workers = upgrade.spawn_workers();
    workers.extend(prepull.spawn_workers());

    let router = UpstreamRouter::new(transport.clone(), shutdown.clone())
        .route(JobKind::NodeUpgrade, upgrade.inbox())
        .route(JobKind::ImagePrePull, prepull.inbox());
    let router = tokio::spawn(router.run());

    tracing::info!(hub = %config.hub.url, "controller started");
    let upgrade_events =
        watcher(Api::<NodeUpgradeJob>::all(client.clone()), watcher::Config::default()).default_backoff();
    let prepull_events = watcher(Api::<ImagePrePullJob>::all(client), watcher::Config::default()).default_backoff();
    tokio::join!(upgrade.run(upgrade_events), prepull.run(prepull_events));

    shutdown.cancel();
    for handle in workers.into_iter().chain([router, node_cache]) {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "task ended abnormally");
        }
    }
    tracing::info!("controller stopped");
    Ok(())
}

async fn drain<S, T>(name: &'static str, events: S, shutdown: CancellationToken)
where
    S: Stream<Item = Result<T, watcher::Error>>,
{
    futures_util::pin_mut!(events);
    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = events.next() => next,
        };
        match next {
            Some(Ok(_)) => {}
            Some(Err(e)) => tracing::warn!(watch = name, error = %e, "watch error"),
            None => break,
        }
    }
}
