// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nt-engine: job dispatch and status reconciliation pipeline

mod cache;
mod context;
mod controller;
mod dispatch;
mod error;
mod patcher;
mod upstream;
mod watchdog;

#[cfg(test)]
mod test_helpers;

pub use cache::TaskCache;
pub use context::{ControllerDeps, EngineConfig, JobContext};
pub use controller::Controller;
pub use error::EngineError;
pub use patcher::PatchOutcome;
pub use upstream::UpstreamRouter;
pub use watchdog::WatchOutcome;
