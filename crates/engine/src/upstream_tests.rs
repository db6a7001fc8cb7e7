// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{harness, settle};
use nt_adapters::FakeTransport;
use nt_core::node::{UPGRADE_HISTORY_ANNOTATION, UPGRADE_STATUS_LABEL};
use nt_core::test_support::{prepull_job, upgrade_job, with_status, NodeBuilder};
use nt_core::{
    ImagePrePullJob, JobStatus, NodeTaskStatus, NodeUpgradeJob, ResourceKey, TaskState, Upsert,
};
use serde_json::json;

fn running(nodes: &[&str]) -> JobStatus {
    JobStatus {
        state: TaskState::Running,
        status: nodes.iter().map(|n| NodeTaskStatus::new(*n, TaskState::Running)).collect(),
    }
}

fn report(resource: &str, content: serde_json::Value) -> Message {
    let mut msg = Message::task(&ResourceKey::new(JobKind::ImagePrePull, "x", "y"), content);
    msg.router.resource = resource.to_string();
    msg.router.operation = resource.split('/').next().unwrap_or_default().to_string();
    msg
}

#[tokio::test]
async fn prepull_report_updates_entry() {
    let h = harness::<ImagePrePullJob>(&["a", "b"]);
    h.insert(with_status(prepull_job("p", &["a", "b"], &["img:1"]), running(&["a", "b"])));

    let body = json!({
        "nodeName": "a",
        "state": "successful",
        "imageStatus": [{ "image": "img:1", "state": "successful" }],
        "extra": "ignored",
    });
    let outcome = h.ctx.handle_report(report("prepull/p/node/a", body)).await;

    assert!(matches!(outcome, Some(PatchOutcome::Applied(ref e)) if e.state == TaskState::Successful));
    let stored = h.stored("p");
    let entry = stored.entry("a").unwrap();
    assert_eq!(entry.image_status.len(), 1);
    assert_eq!(stored.state(), TaskState::Running);
}

#[tokio::test]
async fn malformed_key_is_dropped() {
    let h = harness::<ImagePrePullJob>(&["a"]);
    h.insert(with_status(prepull_job("p", &["a"], &["img:1"]), running(&["a"])));

    let outcome = h.ctx.handle_report(report("prepull/p", json!({ "state": "failed" }))).await;

    assert!(outcome.is_none());
    assert!(h.api.status_patches().is_empty());
}

#[tokio::test]
async fn unknown_job_is_dropped() {
    let h = harness::<ImagePrePullJob>(&["a"]);
    let outcome = h.ctx.handle_report(report("prepull/ghost/node/a", json!({ "state": "failed" }))).await;
    assert!(outcome.is_none());
    assert!(h.api.status_patches().is_empty());
}

#[tokio::test]
async fn other_kind_is_dropped() {
    let h = harness::<ImagePrePullJob>(&["a"]);
    h.insert(with_status(prepull_job("p", &["a"], &["img:1"]), running(&["a"])));
    let outcome = h.ctx.handle_report(report("upgrade/p/node/a", json!({ "state": "failed" }))).await;
    assert!(outcome.is_none());
}

#[tokio::test]
async fn undecodable_body_is_dropped() {
    let h = harness::<NodeUpgradeJob>(&["a"]);
    h.insert(with_status(upgrade_job("u", &["a"], "v1.19.0"), running(&["a"])));
    let outcome = h.ctx.handle_report(report("upgrade/u/node/a", json!({ "status": "exploded" }))).await;
    assert!(outcome.is_none());
    assert!(h.api.status_patches().is_empty());
}

#[tokio::test]
async fn late_report_cannot_revise_terminal_entry() {
    let h = harness::<ImagePrePullJob>(&["a"]);
    h.insert(with_status(prepull_job("p", &["a"], &["img:1"]), running(&["a"])));
    h.ctx.handle_report(report("prepull/p/node/a", json!({ "state": "successful" }))).await;

    let late = json!({ "state": "failed", "reason": "timeout to receive response from edge" });
    let outcome = h.ctx.handle_report(report("prepull/p/node/a", late)).await;

    assert_eq!(outcome, Some(PatchOutcome::Unchanged(Upsert::KeptTerminal)));
    let stored = h.stored("p");
    assert_eq!(stored.entry("a").unwrap().state, TaskState::Successful);
    assert_eq!(stored.state(), TaskState::Successful);
}

#[tokio::test]
async fn upgrade_success_uncordons_and_records_history() {
    let h = harness::<NodeUpgradeJob>(&[]);
    h.nodes.upsert(
        NodeBuilder::new("a")
            .label(UPGRADE_STATUS_LABEL, "upgrading")
            .annotation(UPGRADE_HISTORY_ANNOTATION, "v1.17.0->v1.18.0")
            .build(),
    );
    h.insert(with_status(upgrade_job("u", &["a"], "v1.19.0"), running(&["a"])));

    let body = json!({
        "nodeName": "a",
        "historyId": "h-1",
        "fromVersion": "v1.18.0",
        "toVersion": "v1.19.0",
        "status": "upgrade_success",
    });
    h.ctx.handle_report(report("upgrade/u/node/a", body)).await;

    let entry = h.stored("u").entry("a").cloned().unwrap();
    assert_eq!(entry.state, TaskState::Successful);
    let patches = h.api.node_patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].patch["spec"]["unschedulable"], false);
    assert!(patches[0].patch["metadata"]["labels"][UPGRADE_STATUS_LABEL].is_null());
    let history = patches[0].patch["metadata"]["annotations"][UPGRADE_HISTORY_ANNOTATION].as_str().unwrap();
    assert!(history.ends_with("v1.18.0->v1.19.0"));
}

#[tokio::test]
async fn workers_drain_inbox() {
    let mut h = harness::<ImagePrePullJob>(&["a", "b"]);
    h.insert(with_status(prepull_job("p", &["a", "b"], &["img:1"]), running(&["a", "b"])));
    let (tx, rx) = mpsc::channel(8);
    let workers = h.ctx.spawn_workers(rx);
    assert_eq!(workers.len(), 2);

    tx.send(report("prepull/p/node/a", json!({ "state": "successful" }))).await.unwrap();
    tx.send(report("prepull/p/node/b", json!({ "state": "failed", "reason": "no space" }))).await.unwrap();
    settle().await;

    assert_eq!(h.stored("p").state(), TaskState::Failed);
    h.shutdown.cancel();
    for worker in workers {
        worker.await.unwrap();
    }
    assert!(h.inbox.try_recv().is_err());
}

#[tokio::test]
async fn router_forwards_by_kind_and_drops_bad_or_mislabeled_keys() {
    let transport = FakeTransport::new();
    let shutdown = CancellationToken::new();
    let (prepull_tx, mut prepull_rx) = mpsc::channel(8);
    let (upgrade_tx, mut upgrade_rx) = mpsc::channel(8);
    let router = UpstreamRouter::new(transport.clone(), shutdown.clone())
        .route(JobKind::ImagePrePull, prepull_tx)
        .route(JobKind::NodeUpgrade, upgrade_tx);
    let task = tokio::spawn(router.run());

    transport.deliver(report("upgrade/J", json!({})));
    transport.deliver(report("prepull/p/node/a", json!({ "state": "successful" })));
    let mut mislabeled = report("upgrade/u/node/c", json!({ "status": "upgrade_success" }));
    mislabeled.router.operation = JobKind::ImagePrePull.token().to_string();
    transport.deliver(mislabeled);
    transport.deliver(report("upgrade/u/node/b", json!({ "status": "upgrade_success" })));

    assert_eq!(prepull_rx.recv().await.unwrap().resource(), "prepull/p/node/a");
    assert_eq!(upgrade_rx.recv().await.unwrap().resource(), "upgrade/u/node/b");
    assert!(prepull_rx.try_recv().is_err());
    assert!(upgrade_rx.try_recv().is_err());

    shutdown.cancel();
    task.await.unwrap();
}
