// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node status rules and job aggregation.
//!
//! A node entry never leaves a terminal state; the first terminal report
//! wins. The aggregate is recomputed from the entry list, which the
//! dispatcher seeds with every targeted node before any task is sent.

use crate::crd::{JobStatus, NodeTaskStatus};
use crate::state::TaskState;

/// What [`upsert`] did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Appended,
    Replaced,
    /// Update matched the stored entry.
    Unchanged,
    /// Stored entry is terminal and differs from the update.
    KeptTerminal,
    /// Update would demote the entry, or names an unknown node on a finished job.
    Ignored,
}

impl Upsert {
    pub fn changed(self) -> bool {
        matches!(self, Upsert::Appended | Upsert::Replaced)
    }
}

/// Apply one node update to a status in place.
pub fn upsert(status: &mut JobStatus, update: NodeTaskStatus) -> Upsert {
    let Some(idx) = status.status.iter().position(|e| e.node_name == update.node_name) else {
        if status.state.is_terminal() {
            return Upsert::Ignored;
        }
        status.status.push(update);
        return Upsert::Appended;
    };
    let existing = &mut status.status[idx];

    if existing.state.is_terminal() {
        return if *existing == update { Upsert::Unchanged } else { Upsert::KeptTerminal };
    }
    if update.state.rank() < existing.state.rank() {
        return Upsert::Ignored;
    }

    let merged = merge_entry(existing, update);
    if merged == *existing {
        return Upsert::Unchanged;
    }
    *existing = merged;
    Upsert::Replaced
}

/// The update wins field by field, except that details it leaves empty are
/// carried over from the stored entry.
fn merge_entry(existing: &NodeTaskStatus, mut update: NodeTaskStatus) -> NodeTaskStatus {
    match (&existing.history, &mut update.history) {
        (Some(old), Some(new)) => {
            if new.upgrade_time.is_none() {
                new.upgrade_time = old.upgrade_time.clone();
            }
            if new.history_id.is_empty() {
                new.history_id = old.history_id.clone();
            }
        }
        (Some(old), None) => update.history = Some(old.clone()),
        _ => {}
    }
    if update.image_status.is_empty() {
        update.image_status = existing.image_status.clone();
    }
    update
}

/// Add an `initial` entry for each node not yet present and mark the job running.
pub fn seed(status: &mut JobStatus, nodes: &[String]) {
    for node in nodes {
        if status.entry(node).is_none() {
            status.status.push(NodeTaskStatus::new(node.clone(), TaskState::Initial));
        }
    }
    if !status.status.is_empty() && !status.state.is_terminal() {
        status.state = TaskState::Running;
    }
}

/// Aggregate state derived from the entry list.
pub fn aggregate(status: &JobStatus) -> TaskState {
    if status.status.is_empty() {
        return TaskState::Initial;
    }
    if !status.status.iter().all(|e| e.state.is_terminal()) {
        return TaskState::Running;
    }
    if status.status.iter().any(|e| e.state == TaskState::Failed) {
        TaskState::Failed
    } else {
        TaskState::Successful
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
