// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket client for the cloud/edge hub.
//!
//! A background bridge owns the socket and reconnects until shutdown.
//! Outbound messages are refused while the bridge is disconnected; the
//! per-node watchdog turns those into timeouts.

use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use nt_wire::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub url: String,
    pub reconnect: Duration,
    pub buffer: usize,
}

/// Hub transport backed by a reconnecting WebSocket bridge.
#[derive(Clone)]
pub struct HubTransport {
    outbound: mpsc::Sender<Message>,
    inbound: Arc<tokio::sync::Mutex<mpsc::Receiver<Message>>>,
    connected: Arc<AtomicBool>,
}

impl HubTransport {
    /// Spawn the bridge and return immediately; the first connection is
    /// attempted in the background.
    pub fn connect(config: HubConfig, shutdown: CancellationToken) -> Self {
        let (outbound, out_rx) = mpsc::channel(config.buffer);
        let (in_tx, inbound) = mpsc::channel(config.buffer);
        let connected = Arc::new(AtomicBool::new(false));
        tokio::spawn(bridge(config, out_rx, in_tx, Arc::clone(&connected), shutdown));
        Self { outbound, inbound: Arc::new(tokio::sync::Mutex::new(inbound)), connected }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Transport for HubTransport {
    async fn send(&self, msg: Message) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        self.outbound.send(msg).await.map_err(|_| TransportError::Closed)
    }

    async fn receive(&self) -> Result<Message, TransportError> {
        self.inbound.lock().await.recv().await.ok_or(TransportError::Closed)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PumpExit {
    Disconnected,
    Shutdown,
}

type HubSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn bridge(
    config: HubConfig,
    mut out_rx: mpsc::Receiver<Message>,
    in_tx: mpsc::Sender<Message>,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    loop {
        let attempt = tokio::select! {
            _ = shutdown.cancelled() => break,
            r = tokio_tungstenite::connect_async(config.url.as_str()) => r,
        };
        match attempt {
            Ok((socket, _)) => {
                tracing::info!(url = %config.url, "hub connected");
                connected.store(true, Ordering::Release);
                let exit = pump(socket, &mut out_rx, &in_tx, &shutdown).await;
                connected.store(false, Ordering::Release);
                if exit == PumpExit::Shutdown {
                    break;
                }
                tracing::warn!(url = %config.url, "hub disconnected, reconnecting");
            }
            Err(e) => {
                tracing::warn!(url = %config.url, error = %e, "hub connect failed");
            }
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(config.reconnect) => {}
        }
    }
    tracing::info!("hub bridge stopped");
}

async fn pump(
    socket: HubSocket,
    out_rx: &mut mpsc::Receiver<Message>,
    in_tx: &mpsc::Sender<Message>,
    shutdown: &CancellationToken,
) -> PumpExit {
    let (mut write, mut read) = socket.split();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = write.send(Frame::Close(None)).await;
                return PumpExit::Shutdown;
            }
            outgoing = out_rx.recv() => {
                let Some(msg) = outgoing else { return PumpExit::Shutdown };
                let text = match nt_wire::encode(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(resource = msg.resource(), error = %e, "dropping unencodable message");
                        continue;
                    }
                };
                if let Err(e) = write.send(Frame::text(text)).await {
                    tracing::warn!(resource = msg.resource(), error = %e, "hub write failed");
                    return PumpExit::Disconnected;
                }
            }
            frame = read.next() => match frame {
                Some(Ok(Frame::Text(text))) => match nt_wire::decode(&text) {
                    Ok(msg) => {
                        if in_tx.send(msg).await.is_err() {
                            return PumpExit::Shutdown;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "dropping malformed hub frame"),
                },
                Some(Ok(Frame::Close(frame))) => {
                    tracing::info!(?frame, "hub sent close frame");
                    return PumpExit::Disconnected;
                }
                Some(Ok(_)) => {} // Ping/Pong/Binary
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "hub read failed");
                    return PumpExit::Disconnected;
                }
                None => return PumpExit::Disconnected,
            },
        }
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
