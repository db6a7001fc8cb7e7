// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task cache: latest observed object per job name.
//!
//! Readers get an `Arc` snapshot. Writers replace the whole entry, unless
//! the incoming object carries an older resource version than the stored one.

use nt_core::TaskJob;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub struct TaskCache<J> {
    jobs: RwLock<HashMap<String, Arc<J>>>,
}

impl<J> Default for TaskCache<J> {
    fn default() -> Self {
        Self { jobs: RwLock::new(HashMap::new()) }
    }
}

impl<J: TaskJob> TaskCache<J> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<J>> {
        self.jobs.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.read().contains_key(name)
    }

    /// Store `job` and return whichever copy the cache now holds.
    pub fn store(&self, job: J) -> Arc<J> {
        let name = job.job_name();
        let incoming = Arc::new(job);
        let mut jobs = self.jobs.write();
        if let Some(existing) = jobs.get(&name) {
            let versions = (existing.resource_version_number(), incoming.resource_version_number());
            if let (Some(held), Some(seen)) = versions {
                if seen < held {
                    tracing::trace!(job = %name, held, seen, "ignoring stale job object");
                    return Arc::clone(existing);
                }
            }
        }
        jobs.insert(name, Arc::clone(&incoming));
        incoming
    }

    pub fn remove(&self, name: &str) -> Option<Arc<J>> {
        self.jobs.write().remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.jobs.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
