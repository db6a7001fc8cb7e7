// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud/edge hub message envelope.
//!
//! Wire format: one JSON document per WebSocket text frame.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod message;
mod wire;

pub use message::{Header, Message, Router, GROUP_TASK, SOURCE_TASK_MANAGER};
pub use wire::{decode, encode, ProtocolError};
