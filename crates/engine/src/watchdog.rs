// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node watchdog.
//!
//! Polls the cache until the node's entry turns terminal or the deadline
//! passes. A missed deadline is not written directly: a failure report is
//! injected into the upstream inbox and goes through the normal ingest path.
//! A job recreated under the same name counts as gone for the old watchdog.

use crate::context::JobContext;
use kube::Resource;
use nt_adapters::{ClusterApi, Transport};
use nt_core::{ResourceKey, TaskJob};
use nt_wire::Message;
use std::time::Duration;
use tokio::time::Instant;

/// How a watch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The node's entry became terminal.
    Reported,
    /// The job left the cache.
    JobGone,
    /// Shutdown was requested.
    Cancelled,
    /// The deadline passed and a failure report was injected.
    TimedOut,
}

enum Poll {
    Gone,
    Terminal,
    Pending,
}

impl<J, T, A> JobContext<J, T, A>
where
    J: TaskJob,
    T: Transport,
    A: ClusterApi,
{
    /// Watch one node of one job until it reports or `timeout` elapses.
    pub async fn watch(&self, key: ResourceKey, timeout: Duration) -> WatchOutcome {
        let deadline = Instant::now() + timeout;
        let uid = self.cache.get(&key.job_name).and_then(|job| job.meta().uid.clone());
        loop {
            match self.poll_entry(&key, &uid) {
                Poll::Gone => {
                    tracing::debug!(resource = %key, "job gone, watchdog exiting");
                    return WatchOutcome::JobGone;
                }
                Poll::Terminal => return WatchOutcome::Reported,
                Poll::Pending => {}
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wake = (now + self.config.poll_interval).min(deadline);
            tokio::select! {
                _ = self.shutdown.cancelled() => return WatchOutcome::Cancelled,
                _ = tokio::time::sleep_until(wake) => {}
            }
        }
        self.inject_timeout(&key, &uid).await
    }

    fn poll_entry(&self, key: &ResourceKey, uid: &Option<String>) -> Poll {
        let Some(job) = self.cache.get(&key.job_name) else {
            return Poll::Gone;
        };
        if job.meta().uid != *uid {
            return Poll::Gone;
        }
        match job.entry(&key.node_name) {
            Some(entry) if entry.state.is_terminal() => Poll::Terminal,
            _ => Poll::Pending,
        }
    }

    async fn inject_timeout(&self, key: &ResourceKey, uid: &Option<String>) -> WatchOutcome {
        let Some(job) = self.cache.get(&key.job_name).filter(|job| job.meta().uid == *uid) else {
            return WatchOutcome::JobGone;
        };
        tracing::warn!(resource = %key, "no response from edge before deadline");
        let msg = Message::task(key, job.timeout_body(&key.node_name));
        if self.inbox.send(msg).await.is_err() {
            tracing::warn!(resource = %key, "upstream inbox closed, timeout report lost");
        }
        WatchOutcome::TimedOut
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
