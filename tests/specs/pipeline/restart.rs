//! Restart specs
//!
//! A controller that restarts mid-job never dispatches again and keeps
//! guarding unfinished nodes.

use crate::prelude::*;

/// A report arriving after restart completes the job without a second send.
#[tokio::test(start_paused = true)]
async fn restart_after_dispatch_does_not_resend() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a"]));
    p.submit(prepull_job("j", &["a"], &["img:1"])).await;
    assert_eq!(p.entry("j", "a").state, TaskState::Running);

    let p = p.restart().await;
    p.report("j", "a", json!({ "nodeName": "a", "state": "successful" })).await;

    assert_eq!(p.entry("j", "a").state, TaskState::Successful);
    assert_eq!(p.job("j").state(), TaskState::Successful);
    assert_eq!(p.sends_to("j", "a"), 1);
}

/// Watchdogs come back after restart for nodes still running.
#[tokio::test(start_paused = true)]
async fn restart_rearms_watchdogs() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a", "b"]));
    let mut job = prepull_job("j", &["a", "b"], &["img:1"]);
    job.spec.timeout_seconds_on_each_node = Some(30);
    p.submit(job).await;
    p.report("j", "a", json!({ "state": "successful" })).await;

    let p = p.restart().await;
    advance(31).await;

    assert_eq!(p.entry("j", "a").state, TaskState::Successful);
    let b = p.entry("j", "b");
    assert_eq!(b.state, TaskState::Failed);
    assert_eq!(b.reason, TIMEOUT_REASON);
    assert_eq!(p.job("j").state(), TaskState::Failed);
    assert_eq!(p.transport.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn finished_jobs_stay_quiet_after_restart() {
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a"]));
    p.submit(prepull_job("j", &["a"], &["img:1"])).await;
    p.report("j", "a", json!({ "state": "successful" })).await;
    let patches = p.api.status_patches().len();

    let p = p.restart().await;
    advance(400).await;

    assert_eq!(p.api.status_patches().len(), patches);
    assert_eq!(p.transport.sent().len(), 1);
}
