// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use nt_wire::Message;
use thiserror::Error;

/// Errors from the cloud/edge hub
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("hub not connected")]
    Disconnected,
    #[error("transport closed")]
    Closed,
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Bidirectional channel to edge nodes.
///
/// Delivery is at-least-once in both directions; callers tolerate duplicates.
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Best-effort push toward the node named in the message's resource key.
    async fn send(&self, msg: Message) -> Result<(), TransportError>;

    /// Next message from any edge node. Blocks until one arrives.
    async fn receive(&self) -> Result<Message, TransportError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Transport, TransportError};
    use async_trait::async_trait;
    use nt_wire::Message;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct FakeTransportState {
        sent: Vec<Message>,
        fail_sends: bool,
    }

    /// In-memory transport. Sent messages are recorded; tests feed edge
    /// reports through [`FakeTransport::deliver`].
    #[derive(Clone)]
    pub struct FakeTransport {
        inner: Arc<Mutex<FakeTransportState>>,
        inbound_tx: mpsc::UnboundedSender<Message>,
        inbound_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Message>>>,
    }

    impl Default for FakeTransport {
        fn default() -> Self {
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            Self {
                inner: Arc::new(Mutex::new(FakeTransportState { sent: Vec::new(), fail_sends: false })),
                inbound_tx,
                inbound_rx: Arc::new(tokio::sync::Mutex::new(inbound_rx)),
            }
        }
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a message as if an edge node had sent it.
        pub fn deliver(&self, msg: Message) {
            let _ = self.inbound_tx.send(msg);
        }

        /// All messages handed to `send`, in order.
        pub fn sent(&self) -> Vec<Message> {
            self.inner.lock().sent.clone()
        }

        /// Messages sent to one resource key.
        pub fn sent_to(&self, resource: &str) -> Vec<Message> {
            self.inner.lock().sent.iter().filter(|m| m.resource() == resource).cloned().collect()
        }

        /// Make subsequent sends fail as if the node were offline.
        pub fn fail_sends(&self, fail: bool) {
            self.inner.lock().fail_sends = fail;
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, msg: Message) -> Result<(), TransportError> {
            let mut inner = self.inner.lock();
            if inner.fail_sends {
                return Err(TransportError::Disconnected);
            }
            inner.sent.push(msg);
            Ok(())
        }

        async fn receive(&self) -> Result<Message, TransportError> {
            self.inbound_rx.lock().await.recv().await.ok_or(TransportError::Closed)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTransport;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
