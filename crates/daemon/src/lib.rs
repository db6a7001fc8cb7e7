// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Edge node task controller daemon
//!
//! Watches job resources, dispatches per-node tasks over the hub and
//! reconciles edge reports back into job status.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod logging;
mod run;

pub use config::{Config, ConfigError};
pub use run::{run, DaemonError};
