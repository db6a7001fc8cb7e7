//! Watchdog specs
//!
//! Silent nodes are failed at their deadline through the normal ingest path.

use crate::prelude::*;

/// One success, one failure, one silent node.
#[tokio::test(start_paused = true)]
async fn upgrade_partial_failure_with_silent_node() {
    let nodes = FakeNodes::new([upgradable("a"), upgradable("b"), upgradable("c")]);
    let p = Pipeline::<NodeUpgradeJob>::start(nodes);
    let mut job = upgrade_job("u", &["a", "b", "c"], "v2");
    job.spec.timeout_seconds_on_each_node = Some(30);
    p.submit(job).await;
    assert_eq!(p.transport.sent().len(), 3);

    advance(5).await;
    p.report(
        "u",
        "a",
        json!({ "nodeName": "a", "fromVersion": "v1.18.0", "toVersion": "v2", "status": "upgrade_success" }),
    )
    .await;
    advance(2).await;
    p.report(
        "u",
        "b",
        json!({ "nodeName": "b", "status": "upgrade_failed_rollback_success", "reason": "disk full" }),
    )
    .await;
    assert_eq!(p.job("u").state(), TaskState::Running);

    advance(24).await;

    let c = p.entry("u", "c");
    assert_eq!(c.state, TaskState::Failed);
    assert_eq!(c.reason, TIMEOUT_REASON);
    assert_eq!(p.entry("u", "a").state, TaskState::Successful);
    let b = p.entry("u", "b");
    assert_eq!(b.state, TaskState::Failed);
    assert_eq!(b.reason, "disk full");
    assert_eq!(p.job("u").state(), TaskState::Failed);
}

/// Every node silent: the job still finishes, within the per-node timeout.
#[tokio::test(start_paused = true)]
async fn silent_job_terminates_at_deadline() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a", "b", "c"]));
    let mut job = prepull_job("j", &["a", "b", "c"], &["img:1"]);
    job.spec.timeout_seconds_on_each_node = Some(20);
    p.submit(job).await;

    advance(19).await;
    assert_eq!(p.job("j").state(), TaskState::Running);

    advance(2).await;
    let status = p.job("j").status.unwrap();
    assert_eq!(status.state, TaskState::Failed);
    assert!(status.status.iter().all(|e| e.state == TaskState::Failed && e.reason == TIMEOUT_REASON));
}

/// An offline node is never marked running and times out like a silent one.
#[tokio::test(start_paused = true)]
async fn unreachable_node_times_out() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a"]));
    p.transport.fail_sends(true);
    let mut job = prepull_job("j", &["a"], &["img:1"]);
    job.spec.timeout_seconds_on_each_node = Some(15);
    p.submit(job).await;

    assert_eq!(p.entry("j", "a").state, TaskState::Initial);

    advance(16).await;
    assert_eq!(p.entry("j", "a").state, TaskState::Failed);
    assert_eq!(p.job("j").state(), TaskState::Failed);
}

/// A report before the deadline is not overturned by the watchdog.
#[tokio::test(start_paused = true)]
async fn report_beats_watchdog() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a"]));
    let mut job = prepull_job("j", &["a"], &["img:1"]);
    job.spec.timeout_seconds_on_each_node = Some(30);
    p.submit(job).await;

    advance(29).await;
    p.report("j", "a", json!({ "state": "successful" })).await;
    let patches = p.api.status_patches().len();

    advance(60).await;
    assert_eq!(p.entry("j", "a").state, TaskState::Successful);
    assert_eq!(p.job("j").state(), TaskState::Successful);
    assert_eq!(p.api.status_patches().len(), patches);
}
