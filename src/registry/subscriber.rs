//! Subscriber write handles
//!
//! The registry never owns a connection; it records a shared handle to the
//! connection's write half so the broadcast path and the connection's own
//! handler can both send lines. The read half stays exclusively with the
//! handler task.

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::protocol::LINE_TERMINATOR;

/// Boxed write half of a connection
///
/// Production code passes the write half of a `TcpStream`; tests pass
/// in-memory duplex or mock streams.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Shared write handle for one connection
///
/// Writes are serialized through an internal mutex so a broadcast delivery
/// and a handler reply can never interleave bytes on the socket. Every write
/// flushes before returning; nothing is coalesced.
pub struct Subscriber {
    id: u64,
    peer_addr: SocketAddr,
    writer: Mutex<BoxedWriter>,
}

impl Subscriber {
    /// Create a handle for the given session id and peer address.
    pub fn new(id: u64, peer_addr: SocketAddr, writer: BoxedWriter) -> Self {
        Self {
            id,
            peer_addr,
            writer: Mutex::new(writer),
        }
    }

    /// Process-unique session id of the connection
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remote address, used to key all logging for this connection
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Write one line, appending the CR LF terminator, and flush.
    pub async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(LINE_TERMINATOR.as_bytes()).await?;
        writer.flush().await
    }

    /// Write a pre-framed (already terminated) buffer and flush.
    ///
    /// `Bytes` is reference-counted, so a fan-out to N subscribers shares
    /// one allocation of the frame.
    pub async fn write_frame(&self, frame: &Bytes) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(frame).await?;
        writer.flush().await
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .finish_non_exhaustive()
    }
}
