//! Dispatch specs
//!
//! A new job fans out to its eligible nodes exactly once; a job whose
//! selector matches nothing is left alone.

use crate::prelude::*;

/// Two prepull nodes report success at 10s and 20s.
#[tokio::test(start_paused = true)]
async fn prepull_happy_path_two_nodes() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a", "b"]));
    let started = Instant::now();
    let mut job = prepull_job("j", &["a", "b"], &["img:1"]);
    job.spec.timeout_seconds_on_each_node = Some(60);
    p.submit(job).await;

    assert_eq!(p.sends_to("j", "a"), 1);
    assert_eq!(p.sends_to("j", "b"), 1);
    assert_eq!(p.job("j").state(), TaskState::Running);

    advance(10).await;
    p.report("j", "a", json!({ "nodeName": "a", "state": "successful" })).await;
    assert_eq!(p.job("j").state(), TaskState::Running);

    advance(10).await;
    p.report("j", "b", json!({ "nodeName": "b", "state": "successful" })).await;

    let status = p.job("j").status.unwrap();
    assert_eq!(status.state, TaskState::Successful);
    let entries: Vec<_> = status.status.iter().map(|e| (e.node_name.as_str(), e.state)).collect();
    assert_eq!(entries, vec![("a", TaskState::Successful), ("b", TaskState::Successful)]);
    assert!(started.elapsed() <= Duration::from_secs(25));
}

/// A selector matching zero nodes never sends or patches.
#[tokio::test(start_paused = true)]
async fn selector_miss_leaves_job_initial() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a"]));
    let mut job = prepull_job("j", &[], &["img:1"]);
    job.spec.label_selector = Some(label_selector("zone", "nowhere"));
    p.submit(job).await;

    advance(400).await;

    assert!(p.transport.sent().is_empty());
    assert!(p.api.status_patches().is_empty());
    assert_eq!(p.job("j").state(), TaskState::Initial);
}

#[tokio::test(start_paused = true)]
async fn label_selector_targets_matching_edge_nodes() {
    let nodes = FakeNodes::new([
        NodeBuilder::new("b").label("zone", "east").build(),
        NodeBuilder::new("a").label("zone", "east").build(),
        NodeBuilder::new("c").label("zone", "west").build(),
        NodeBuilder::new("d").label("zone", "east").cloud().build(),
    ]);
    let p = Pipeline::<ImagePrePullJob>::start(nodes);
    let mut job = prepull_job("j", &[], &["img:1"]);
    job.spec.label_selector = Some(label_selector("zone", "east"));
    p.submit(job).await;

    let status = p.job("j").status.unwrap();
    let names: Vec<_> = status.status.iter().map(|e| e.node_name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(p.transport.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn upgrade_skips_nodes_already_at_target() {
    let nodes = FakeNodes::new([
        upgradable("a"),
        NodeBuilder::new("b").kubelet_version("v1.29.5-kubeedge-v1.19.0").build(),
    ]);
    let p = Pipeline::<NodeUpgradeJob>::start(nodes);
    p.submit(upgrade_job("u", &["a", "b"], "v1.19.0")).await;

    assert_eq!(p.sends_to("u", "a"), 1);
    assert_eq!(p.sends_to("u", "b"), 0);
    assert!(p.job("u").entry("b").is_none());
}
