//! Per-connection protocol driver
//!
//! Wraps one accepted connection in a CR LF line adapter and runs the
//! protocol state machine over it: the first non-empty line fixes the
//! connection's role (bridge or client), after which every line is either a
//! forwarded message handed to the registry's broadcast or a client command
//! driving the PASS/NICK/JOIN lifecycle.
//!
//! Every error is returned as a value to the top of the loop, where the one
//! uniform reaction is: purge the connection from the registry and close the
//! stream. There is no retry; one malformed command ends the connection.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::error::{ProtocolError, Result};
use crate::protocol::constants::{NOTICE_AUTH_FAILED, NOTICE_AUTH_IMPROPER};
use crate::protocol::message::{self, ClientCommand};
use crate::registry::{ChannelRegistry, Subscriber};
use crate::session::{AuthState, Role, SessionState};

/// Handler for one accepted connection
///
/// Owns the read half exclusively; the write half lives in the shared
/// [`Subscriber`] handle so broadcasts from other connections can reach this
/// peer. Generic over the read stream so tests can drive the machine with
/// in-memory or mock I/O.
pub struct Connection<R> {
    reader: BufReader<R>,
    subscriber: Arc<Subscriber>,
    registry: Arc<ChannelRegistry>,
    state: SessionState,
    line_buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> Connection<R> {
    /// Create a handler for a freshly accepted connection.
    pub fn new(read_half: R, subscriber: Arc<Subscriber>, registry: Arc<ChannelRegistry>) -> Self {
        let state = SessionState::new(subscriber.id(), subscriber.peer_addr());
        Self {
            reader: BufReader::new(read_half),
            subscriber,
            registry,
            state,
            line_buf: Vec::with_capacity(512),
        }
    }

    /// Run the connection to completion.
    ///
    /// Whatever ends the loop (clean EOF, protocol violation, transport
    /// error), the connection's registry entries are purged before this
    /// returns. The stream itself closes when the handler is dropped.
    pub async fn run(&mut self) -> Result<()> {
        let result = self.drive().await;
        self.registry.unsubscribe_all(self.state.id).await;
        tracing::debug!(
            peer = %self.state.peer_addr,
            duration_ms = self.state.duration().as_millis() as u64,
            "Session ended"
        );
        result
    }

    async fn drive(&mut self) -> Result<()> {
        while let Some(line) = self.read_line().await? {
            // Empty lines are skipped everywhere except between PASS and
            // NICK, where the handshake consumes the very next line and a
            // blank one fails the two-token check
            if line.is_empty() && self.state.auth != AuthState::AwaitingNick {
                continue;
            }
            tracing::debug!(peer = %self.state.peer_addr, line = %line, "RECV");

            let role = match self.state.role {
                Some(role) => role,
                None => {
                    // First non-empty line fixes the role for the whole
                    // lifetime of the connection
                    let role = if line.starts_with(':') {
                        Role::Bridge
                    } else {
                        Role::Client
                    };
                    self.state.resolve_role(role);
                    role
                }
            };

            match role {
                Role::Bridge => self.handle_bridge_line(&line).await?,
                Role::Client => self.handle_client_line(&line).await?,
            }
        }

        // EOF between PASS and NICK: the handshake never completed. The
        // peer is already gone, so no notice can be delivered.
        if self.state.auth == AuthState::AwaitingNick {
            return Err(ProtocolError::ImproperAuth("<eof>".to_owned()).into());
        }

        Ok(())
    }

    /// Read one CR LF terminated line, without the terminator.
    ///
    /// Returns `Ok(None)` on clean EOF. Lines must be valid UTF-8 so
    /// arbitrary Unicode display names and message bodies round-trip.
    async fn read_line(&mut self) -> Result<Option<String>> {
        self.line_buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.line_buf).await?;
        if n == 0 {
            return Ok(None);
        }

        let mut end = self.line_buf.len();
        if end > 0 && self.line_buf[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && self.line_buf[end - 1] == b'\r' {
            end -= 1;
        }

        let line = std::str::from_utf8(&self.line_buf[..end])
            .map_err(|_| ProtocolError::InvalidUtf8)?;
        Ok(Some(line.to_owned()))
    }

    /// Write one reply line to this connection's peer.
    async fn reply(&self, line: &str) -> Result<()> {
        self.subscriber.write_line(line).await?;
        tracing::debug!(peer = %self.state.peer_addr, line = %line, "SEND");
        Ok(())
    }

    /// A bridge line: forward if well-formed, report and ignore otherwise.
    ///
    /// A forwarded channel without the `#` prefix tears the bridge down;
    /// the deployed bridge adapter always sends `#`-prefixed channels, so
    /// anything else is a broken producer.
    async fn handle_bridge_line(&mut self, line: &str) -> Result<()> {
        match message::parse_forward(line) {
            Some(forward) => {
                if !forward.channel.starts_with('#') {
                    return Err(ProtocolError::MalformedChannel(forward.channel.to_owned()).into());
                }

                tracing::debug!(
                    peer = %self.state.peer_addr,
                    origin = %forward.origin,
                    channel = %forward.channel,
                    "Forwarding"
                );
                // The raw line goes out verbatim so subscribers see exactly
                // what the bridge produced
                self.registry.broadcast(forward.channel, line).await;
            }
            None => {
                tracing::warn!(
                    peer = %self.state.peer_addr,
                    line = %line,
                    "Ignoring malformed bridge line"
                );
            }
        }
        Ok(())
    }

    async fn handle_client_line(&mut self, line: &str) -> Result<()> {
        // Mid-handshake, the only acceptable line is NICK
        if self.state.auth == AuthState::AwaitingNick {
            return self.finish_auth(line).await;
        }

        match message::parse_command(line) {
            ClientCommand::Pass => {
                if self.state.is_authenticated() {
                    self.reply(NOTICE_AUTH_FAILED).await?;
                    return Err(ProtocolError::AlreadyAuthenticated.into());
                }
                self.state.begin_auth();
                Ok(())
            }
            ClientCommand::Join(channels) => self.handle_join(&channels).await,
            ClientCommand::MalformedJoin => {
                Err(ProtocolError::MalformedCommand(line.to_owned()).into())
            }
            ClientCommand::Other => {
                // Real IRC clients send CAP, USER, PING and friends;
                // tolerate anything we do not implement
                tracing::debug!(
                    peer = %self.state.peer_addr,
                    line = %line,
                    "Ignoring unsupported command"
                );
                Ok(())
            }
        }
    }

    /// Complete the PASS/NICK handshake with the line that followed PASS.
    async fn finish_auth(&mut self, line: &str) -> Result<()> {
        let Some(nickname) = message::parse_nick(line) else {
            self.reply(NOTICE_AUTH_IMPROPER).await?;
            return Err(ProtocolError::ImproperAuth(line.to_owned()).into());
        };
        let nickname = nickname.to_owned();

        self.state.authenticate(&nickname);
        for banner_line in message::welcome_banner(&nickname) {
            self.reply(&banner_line).await?;
        }

        // A consumer is always a member of its own namesake channel
        let own_channel = format!("#{}", nickname);
        self.registry.subscribe(&self.subscriber, &own_channel).await;

        tracing::info!(
            peer = %self.state.peer_addr,
            nickname = %nickname,
            "Authenticated"
        );
        Ok(())
    }

    /// Subscribe to each requested channel, exactly as given.
    async fn handle_join(&mut self, channels: &[&str]) -> Result<()> {
        let Some(nickname) = self.state.nickname() else {
            return Err(ProtocolError::NotAuthenticated.into());
        };
        let nickname = nickname.to_owned();

        for channel in channels {
            self.registry.subscribe(&self.subscriber, channel).await;
            for reply_line in message::join_reply(&nickname, channel) {
                self.reply(&reply_line).await?;
            }
        }
        Ok(())
    }
}
