//! WebSocket transport for Replicant sessions

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use replicant_core::Registry;
use replicant_protocol::encode_reply;

use crate::handler::SessionHandler;

/// WebSocket server fronting the authoritative registry
pub struct WebSocketServer {
    registry: Arc<Registry>,
    addr: SocketAddr,
    connection_counter: AtomicU64,
}

impl WebSocketServer {
    pub fn new(registry: Arc<Registry>, addr: SocketAddr) -> Self {
        Self {
            registry,
            addr,
            connection_counter: AtomicU64::new(0),
        }
    }

    /// Start accepting connections. Each connection becomes one session;
    /// a reconnecting client gets a fresh session and re-declares.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "Replicant WebSocket server listening");

        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let connection = self.connection_counter.fetch_add(1, Ordering::Relaxed);
                    let registry = self.registry.clone();

                    tokio::spawn(async move {
                        if let Err(e) =
                            Self::handle_connection(stream, registry).await
                        {
                            error!(
                                peer = %peer_addr,
                                connection = connection,
                                error = %e,
                                "WebSocket connection error"
                            );
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    async fn handle_connection(
        stream: TcpStream,
        registry: Arc<Registry>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ws_stream = accept_async(stream).await?;
        let (mut write, mut read) = ws_stream.split();

        let mut handler = SessionHandler::new(registry.clone());
        let session_id = handler.session_id();
        let mut update_rx = registry.subscribe();

        info!(session = %session_id, "Session connected");

        'session: loop {
            tokio::select! {
                // Inbound frames from the client
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            for reply in handler.process(&text).await {
                                write.send(Message::Text(encode_reply(&reply).into())).await?;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(session = %session_id, "Session disconnected");
                            break;
                        }
                        Some(Ok(_)) => {
                            // Ignore other frame types
                        }
                        Some(Err(e)) => {
                            error!(session = %session_id, error = %e, "WebSocket read error");
                            break;
                        }
                    }
                }

                // Commit fan-out for declared replicants
                result = update_rx.recv() => {
                    match result {
                        Ok(broadcast) => {
                            if let Some(reply) = handler.forward(&broadcast) {
                                if let Err(e) = write
                                    .send(Message::Text(encode_reply(&reply).into()))
                                    .await
                                {
                                    error!(session = %session_id, error = %e, "WebSocket write error");
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(session = %session_id, missed = n, "Session lagged behind updates; resyncing");
                            for reply in handler.resync() {
                                if let Err(e) = write
                                    .send(Message::Text(encode_reply(&reply).into()))
                                    .await
                                {
                                    error!(session = %session_id, error = %e, "WebSocket write error");
                                    break 'session;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            break;
                        }
                    }
                }
            }
        }

        debug!(session = %session_id, "Session cleanup complete");
        Ok(())
    }
}
