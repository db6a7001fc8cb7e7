//! Upstream ingest specs
//!
//! Duplicate and malformed edge reports never disturb recorded results.

use crate::prelude::*;

/// The same success reported twice writes once.
#[tokio::test(start_paused = true)]
async fn duplicate_report_is_idempotent() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a"]));
    p.submit(prepull_job("j", &["a"], &["img:1"])).await;

    p.report("j", "a", json!({ "nodeName": "a", "state": "successful" })).await;
    let after_first = p.job("j");
    let patches = p.api.status_patches().len();

    p.report("j", "a", json!({ "nodeName": "a", "state": "successful" })).await;
    p.report("j", "a", json!({ "nodeName": "a", "state": "failed", "reason": "late" })).await;

    assert_eq!(p.api.status_patches().len(), patches);
    similar_asserts::assert_eq!(p.job("j").status, after_first.status);
    assert_eq!(p.entry("j", "a").state, TaskState::Successful);
}

/// A two-segment resource key is dropped without touching any job.
#[tokio::test(start_paused = true)]
async fn malformed_key_is_dropped() {
    let p = Pipeline::<NodeUpgradeJob>::start(FakeNodes::new([upgradable("a")]));
    p.submit(upgrade_job("J", &["a"], "v1.19.0")).await;
    let before = p.job("J");
    let patches = p.api.status_patches().len();

    let mut msg = Message::task(&ResourceKey::new(JobKind::NodeUpgrade, "J", "a"), json!({ "status": "upgrade_success" }));
    msg.router.resource = "upgrade/J".to_string();
    p.transport.deliver(msg);
    settle().await;

    assert_eq!(p.api.status_patches().len(), patches);
    assert_eq!(p.job("J").status, before.status);

    // the pipeline keeps working afterwards
    p.report("J", "a", json!({ "status": "upgrade_success" })).await;
    assert_eq!(p.entry("J", "a").state, TaskState::Successful);
}

#[tokio::test(start_paused = true)]
async fn report_for_deleted_job_is_dropped() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a"]));
    let job = prepull_job("j", &["a"], &["img:1"]);
    p.submit(job).await;
    let stored = p.job("j");
    p.ctrl.handle_event(Event::Delete(stored)).await;
    let patches = p.api.status_patches().len();

    p.report("j", "a", json!({ "state": "successful" })).await;

    assert_eq!(p.api.status_patches().len(), patches);
}

#[tokio::test(start_paused = true)]
async fn upgrade_result_releases_node() {
    let p = Pipeline::<NodeUpgradeJob>::start(FakeNodes::new([upgradable("a")]));
    p.submit(upgrade_job("u", &["a"], "v1.19.0")).await;

    p.report(
        "u",
        "a",
        json!({ "fromVersion": "v1.18.0", "toVersion": "v1.19.0", "status": "upgrade_success" }),
    )
    .await;

    let patches = p.api.node_patches();
    assert_eq!(patches.len(), 2);
    assert_eq!(patches[0].patch["spec"]["unschedulable"], true);
    assert_eq!(patches[1].patch["spec"]["unschedulable"], false);
    assert_eq!(
        patches[1].patch["metadata"]["annotations"]["nodeupgradejob.operations.kubeedge.io/history"],
        "v1.18.0->v1.19.0"
    );
    let history = p.entry("u", "a").history.unwrap();
    assert_eq!(history.to_version, "v1.19.0");
    assert!(history.upgrade_time.is_some());
    assert!(!history.history_id.is_empty());
}
