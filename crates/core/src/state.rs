// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task state shared by job aggregates and per-node entries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Progress of a job or of one node's slice of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    #[default]
    Initial,
    Running,
    Successful,
    Failed,
}

crate::simple_display! {
    TaskState {
        Initial => "initial",
        Running => "running",
        Successful => "successful",
        Failed => "failed",
    }
}

impl TaskState {
    /// Terminal states are never revised once written.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Successful | TaskState::Failed)
    }

    /// Ordering used to refuse demotions: initial < running < terminal.
    pub(crate) fn rank(self) -> u8 {
        match self {
            TaskState::Initial => 0,
            TaskState::Running => 1,
            TaskState::Successful | TaskState::Failed => 2,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
