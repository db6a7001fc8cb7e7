// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nt-adapters: the hub transport and cluster API seams

pub mod cluster;
pub mod hub;
pub mod nodes;
pub mod transport;

pub use cluster::{ApiError, ClusterApi, KubeClusterApi};
pub use hub::{HubConfig, HubTransport};
pub use nodes::ReflectorNodes;
pub use transport::{Transport, TransportError};

#[cfg(any(test, feature = "test-support"))]
pub use cluster::{FakeClusterApi, NodePatchCall, StatusPatchCall};
#[cfg(any(test, feature = "test-support"))]
pub use transport::FakeTransport;
