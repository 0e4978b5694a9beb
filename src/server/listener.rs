//! Relay server listener
//!
//! Handles the TCP accept loop and spawns one handler task per connection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::error::Result;
use crate::registry::{ChannelRegistry, Subscriber};
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;

/// Relay server
///
/// Accepts connections and gives each one an independent handler task; the
/// only state shared between handlers is the channel registry. Failure to
/// bind the listening socket is the single process-fatal error; everything
/// after that is scoped to one connection.
pub struct RelayServer {
    config: ServerConfig,
    registry: Arc<ChannelRegistry>,
    next_session_id: AtomicU64,
}

impl RelayServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            registry: Arc::new(ChannelRegistry::new()),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Get a reference to the channel registry
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Relay server listening");
        self.serve(listener).await
    }

    /// Run the server with graceful shutdown
    ///
    /// Stops accepting when `shutdown` resolves; live handlers are not
    /// forcibly joined.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Relay server listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.serve(listener) => result,
        }
    }

    /// Accept connections on an already-bound listener.
    ///
    /// Binding separately lets callers use port 0 and read the real address
    /// from the listener first.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::warn!(peer = %peer_addr, error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            let (read_half, write_half) = socket.into_split();
            let subscriber = Arc::new(Subscriber::new(session_id, peer_addr, Box::new(write_half)));
            let mut connection = Connection::new(read_half, subscriber, registry);

            if let Err(e) = connection.run().await {
                tracing::debug!(
                    session_id = session_id,
                    peer = %peer_addr,
                    error = %e,
                    "Connection error"
                );
            }

            tracing::debug!(session_id = session_id, peer = %peer_addr, "Connection closed");
        });
    }
}
