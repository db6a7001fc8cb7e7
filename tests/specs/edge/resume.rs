//! Edge resume specs
//!
//! The edge journals a task on receipt, finds it again after a restart and
//! forgets it once its result is reported.

use crate::prelude::*;
use nt_storage::TaskJournal;
use tempfile::tempdir;

/// The edge store survives a reopen, keeps one task per kind, and forgets finished ones.
#[test]
fn journal_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let first = Message::task(&ResourceKey::new(JobKind::ImagePrePull, "p1", "n"), json!({ "images": ["a"] }));
    let second = Message::task(&ResourceKey::new(JobKind::ImagePrePull, "p2", "n"), json!({ "images": ["b"] }));

    TaskJournal::open(&path).unwrap().accept(&first).unwrap();
    let pending = TaskJournal::open(&path).unwrap().pending(JobKind::ImagePrePull).unwrap();
    assert_eq!(pending.key.job_name, "p1");
    assert_eq!(pending.body, first.content);

    TaskJournal::open(&path).unwrap().accept(&second).unwrap();
    let pending = TaskJournal::open(&path).unwrap().pending(JobKind::ImagePrePull).unwrap();
    assert_eq!(pending.key.job_name, "p2");

    assert!(TaskJournal::open(&path).unwrap().complete(&second.reply(json!({}))).unwrap());
    assert!(TaskJournal::open(&path).unwrap().pending(JobKind::ImagePrePull).is_none());
}

/// An edge that restarts mid-task resumes it and its result completes the job.
#[tokio::test(start_paused = true)]
async fn edge_resumes_after_reboot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let p = Pipeline::<ImagePrePullJob>::start(FakeNodes::edge(&["a"]));
    p.submit(prepull_job("j", &["a"], &["img:1"])).await;

    let task = p.transport.sent().pop().unwrap();
    TaskJournal::open(&path).unwrap().accept(&task).unwrap();

    advance(60).await;
    let mut journal = TaskJournal::open(&path).unwrap();
    let resumed = journal.pending(JobKind::ImagePrePull).unwrap();
    assert_eq!(resumed.key, ResourceKey::new(JobKind::ImagePrePull, "j", "a"));
    assert_eq!(resumed.body["images"][0], "img:1");

    let result = task.reply(json!({ "nodeName": "a", "state": "successful" }));
    p.transport.deliver(result.clone());
    settle().await;
    assert!(journal.complete(&result).unwrap());

    assert_eq!(p.job("j").state(), TaskState::Successful);
    assert!(journal.pending(JobKind::ImagePrePull).is_none());
}
