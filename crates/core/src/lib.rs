// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nt-core: job resources, node selection and status rules for edge node tasks

pub mod macros;

pub mod body;
pub mod crd;
pub mod filter;
pub mod key;
pub mod kind;
pub mod merge_patch;
pub mod node;
pub mod selector;
pub mod state;
pub mod status;
pub mod task;
pub mod upgrade;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use body::{ImageStatus, UpgradeResult, TIMEOUT_REASON};
pub use crd::{ImagePrePullJob, JobStatus, NodeTaskStatus, NodeUpgradeJob, UpgradeHistory};
pub use filter::{resolve_nodes, NodeLister};
pub use key::{KeyError, ResourceKey};
pub use kind::JobKind;
pub use state::TaskState;
pub use status::Upsert;
pub use task::{JobError, TaskJob, DEFAULT_TIMEOUT};
