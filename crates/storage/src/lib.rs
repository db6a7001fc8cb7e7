// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nt-storage: edge-side persistence of the last accepted task per job kind

mod journal;
mod store;

pub use journal::{PendingTask, TaskJournal};
pub use store::{gvr, parse_task_key, task_key, Row, StoreError, TaskStore, CURRENT_STORE_VERSION};
