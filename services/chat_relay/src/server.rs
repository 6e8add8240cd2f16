//! Relay server accept loop

use crate::config::RelayConfig;
use crate::error::Result;
use crate::websocket::WebSocketConnection;
use codec::BincodeCodec;
use messaging_actors::{ActorConfig, ClientActor, RelayHub};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub struct RelayServer {
    config: RelayConfig,
    hub: Arc<RelayHub>,
    codec: Arc<BincodeCodec>,
    connections: TaskTracker,
    active: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

/// One admitted connection, from accept until its task ends
struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    /// Claim a slot unless `limit` connections are already admitted
    fn acquire(active: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .ok()
            .map(|_| Self(active.clone()))
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Self {
        let codec = Arc::new(BincodeCodec::with_max_frame_size(config.max_frame_size));
        Self {
            config,
            hub: Arc::new(RelayHub::new()),
            codec,
            connections: TaskTracker::new(),
            active: Arc::new(AtomicUsize::new(0)),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn hub(&self) -> &Arc<RelayHub> {
        &self.hub
    }

    /// Connections admitted so far that have not finished, handshakes included
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        info!("Relay listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Bind the configured address and serve until the listener fails
    pub async fn start(&self) -> Result<()> {
        info!("Starting Chat Relay Server");
        info!("Configuration: {:?}", self.config);

        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Accept connections until shutdown, one actor per connection
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer_addr) = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                },
            };

            let Some(slot) = ConnectionSlot::acquire(&self.active, self.config.max_connections)
            else {
                warn!(
                    "Refusing connection from {}: maximum connections ({}) reached",
                    peer_addr, self.config.max_connections
                );
                continue;
            };

            let hub = self.hub.clone();
            let codec = self.codec.clone();
            let actor_config = self.config.actor.clone();
            let shutdown = self.shutdown.clone();
            self.connections.spawn(async move {
                let _slot = slot;
                if let Err(e) =
                    Self::handle_connection(hub, codec, actor_config, shutdown, stream, peer_addr)
                        .await
                {
                    warn!("Connection from {} failed: {}", peer_addr, e);
                }
            });
        }
    }

    /// Stop accepting, close every client and wait for connection tasks to
    /// finish their close handshakes. Returns false if the timeout elapsed
    /// first.
    pub async fn shutdown(&self, reason: &str) -> bool {
        self.shutdown.cancel();
        self.hub.close_all(reason);
        self.connections.close();

        let timeout = self.config.shutdown_timeout();
        match tokio::time::timeout(timeout, self.connections.wait()).await {
            Ok(()) => {
                info!("All connections closed");
                true
            }
            Err(_) => {
                warn!(
                    remaining = self.connections.len(),
                    "Shutdown timed out after {:?}", timeout
                );
                false
            }
        }
    }

    async fn handle_connection(
        hub: Arc<RelayHub>,
        codec: Arc<BincodeCodec>,
        actor_config: ActorConfig,
        shutdown: CancellationToken,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> Result<()> {
        let ws = tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Dropping handshake from {} during shutdown", peer_addr);
                return Ok(());
            }
            ws = tokio_tungstenite::accept_async(stream) => ws?,
        };
        info!("New WebSocket connection from {}", peer_addr);

        let connection = Arc::new(WebSocketConnection::new(ws, peer_addr));
        let (actor, outbound) = ClientActor::new(hub, codec, connection.clone(), actor_config);

        // Actors registering after close_all ran are closed here instead
        let run = actor.clone().run(outbound);
        tokio::pin!(run);
        tokio::select! {
            _ = &mut run => {}
            _ = shutdown.cancelled() => {
                actor.close("server shutting down");
                run.await;
            }
        }
        connection.finish().await;

        let metrics = actor.metrics().snapshot();
        if metrics.total_dropped() > 0 || metrics.decode_failures > 0 {
            error!(
                client = %actor.id(),
                dropped = metrics.total_dropped(),
                decode_failures = metrics.decode_failures,
                encode_failures = metrics.encode_failures,
                "Client disconnected with losses"
            );
        } else {
            info!(client = %actor.id(), peer = %peer_addr, "Client disconnected");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relay_server_creation() {
        let server = RelayServer::new(RelayConfig::default());
        assert_eq!(server.hub().client_count(), 0);
        assert_eq!(server.active_connections(), 0);
    }

    #[test]
    fn test_connection_slots_respect_limit() {
        let active = Arc::new(AtomicUsize::new(0));

        let first = ConnectionSlot::acquire(&active, 2).unwrap();
        let second = ConnectionSlot::acquire(&active, 2).unwrap();
        assert!(ConnectionSlot::acquire(&active, 2).is_none());
        assert_eq!(active.load(Ordering::Acquire), 2);

        drop(first);
        assert_eq!(active.load(Ordering::Acquire), 1);
        let third = ConnectionSlot::acquire(&active, 2);
        assert!(third.is_some());

        drop(second);
        drop(third);
        assert_eq!(active.load(Ordering::Acquire), 0);
    }

    #[tokio::test]
    async fn test_shutdown_without_connections_completes() {
        let server = RelayServer::new(RelayConfig::default());
        assert!(server.shutdown("idle").await);
    }
}
