// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Edge task journal: what an edge node remembers about its current tasks.
//!
//! A downstream task is journaled on receipt, read back on boot to resume,
//! and removed when the node reports a terminal result for that job.

use crate::store::{parse_task_key, StoreError, TaskStore};
use nt_core::{JobKind, ResourceKey};
use nt_wire::Message;
use serde_json::Value;
use std::path::Path;

/// A task to resume after restart.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTask {
    pub key: ResourceKey,
    pub body: Value,
}

pub struct TaskJournal {
    store: TaskStore,
}

impl TaskJournal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self { store: TaskStore::open(path)? })
    }

    /// Persist a downstream task, superseding any earlier task of its kind.
    pub fn accept(&mut self, msg: &Message) -> Result<ResourceKey, StoreError> {
        let key = msg.resource_key()?;
        self.store.save(key.kind, &key.job_name, &key.node_name, msg.content.clone())?;
        tracing::info!(resource = %key, "task journaled");
        Ok(key)
    }

    /// The task to resume for `kind`.
    pub fn pending(&self, kind: JobKind) -> Option<PendingTask> {
        let row = self.store.get(kind)?;
        let Some((kind, job, node)) = parse_task_key(&row.key) else {
            tracing::warn!(key = %row.key, "ignoring row with unreadable key");
            return None;
        };
        Some(PendingTask { key: ResourceKey::new(kind, job, node), body: row.value.clone() })
    }

    /// Forget the task a result message answers. Rows for other jobs are kept.
    pub fn complete(&mut self, msg: &Message) -> Result<bool, StoreError> {
        let key = msg.resource_key()?;
        match self.store.get(key.kind) {
            Some(row) if row.name == key.job_name => {
                self.store.delete(key.kind)?;
                tracing::info!(resource = %key, "task completed");
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
