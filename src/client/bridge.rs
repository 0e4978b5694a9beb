//! Bridge-side publisher
//!
//! High-level API for the producer side of the relay: open a TCP connection
//! and forward one pre-formatted chat line per upstream event. A bridge
//! never authenticates and never reads; the relay sends it no replies.

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::Result;
use crate::protocol::message::format_forward;
use crate::protocol::LINE_TERMINATOR;

/// Synthetic origin for system-level events (heartbeats, room interactions)
/// as opposed to user-originated chat
pub const SYSTEM_ORIGIN: &str = "SYSTEM";

/// Producer-side connection to the relay
///
/// # Example
/// ```no_run
/// use tmi_relay::client::BridgePublisher;
///
/// # async fn example() -> tmi_relay::Result<()> {
/// let mut bridge = BridgePublisher::connect("127.0.0.1:6667").await?;
/// bridge.send("alice", "lobby", "hello there").await?;
/// bridge.send_system("lobby", "alice joined the room").await?;
/// # Ok(())
/// # }
/// ```
pub struct BridgePublisher {
    stream: TcpStream,
}

impl BridgePublisher {
    /// Open a connection to the relay.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr()?;
        tracing::debug!(peer = %peer, "Bridge connected");
        Ok(Self { stream })
    }

    /// Forward one event into `#<channel>`, attributed to `origin`.
    ///
    /// The `#` prefix is prepended here; pass the bare channel name.
    pub async fn send(&mut self, origin: &str, channel: &str, text: &str) -> Result<()> {
        let line = format_forward(origin, channel, text);
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(LINE_TERMINATOR.as_bytes()).await?;
        self.stream.flush().await?;

        tracing::debug!(origin = %origin, channel = %channel, "Forwarded event");
        Ok(())
    }

    /// Forward a system-level event attributed to the fixed system identity.
    pub async fn send_system(&mut self, channel: &str, text: &str) -> Result<()> {
        self.send(SYSTEM_ORIGIN, channel, text).await
    }
}
