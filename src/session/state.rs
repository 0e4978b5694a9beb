//! Session state machine
//!
//! Tracks a connection's role and authentication progress from accept to
//! disconnect. The role is resolved once, by the first non-empty line, and
//! never changes; the nickname is assigned exactly once, at successful
//! authentication.

use std::net::SocketAddr;
use std::time::Instant;

/// Role of a connection, fixed by its first non-empty line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Forwards pre-formatted `:<origin> PRIVMSG ...` lines; never
    /// authenticates and never receives replies
    Bridge,
    /// Runs the PASS/NICK handshake and joins channels to receive
    /// forwarded lines
    Client,
}

/// Authentication progress of a client connection
///
/// The lookahead read of the original protocol ("PASS, then the very next
/// line must be NICK") is modeled as an explicit intermediate state instead
/// of a nested blocking read, so the same machine works under any
/// concurrency model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No PASS seen yet
    AwaitingPass,
    /// PASS received; the next line must be exactly `NICK <nickname>`
    AwaitingNick,
    /// Handshake complete
    Authenticated,
}

/// Per-connection session state
///
/// Created at accept time, mutated only by the connection's own handler
/// task, destroyed when the handler loop exits for any reason.
#[derive(Debug)]
pub struct SessionState {
    /// Unique session id
    pub id: u64,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Resolved role, `None` until the first non-empty line arrives
    pub role: Option<Role>,

    /// Authentication progress (only meaningful for clients)
    pub auth: AuthState,

    /// Nickname, assigned exactly once at successful authentication
    nickname: Option<String>,

    /// Connection start time
    pub connected_at: Instant,
}

impl SessionState {
    /// Create state for a freshly accepted connection.
    pub fn new(id: u64, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            role: None,
            auth: AuthState::AwaitingPass,
            nickname: None,
            connected_at: Instant::now(),
        }
    }

    /// Fix the role if it has not been resolved yet.
    pub fn resolve_role(&mut self, role: Role) {
        if self.role.is_none() {
            self.role = Some(role);
        }
    }

    /// Record a received PASS: move to the awaiting-NICK state.
    pub fn begin_auth(&mut self) {
        if self.auth == AuthState::AwaitingPass {
            self.auth = AuthState::AwaitingNick;
        }
    }

    /// Complete the handshake with the given nickname.
    ///
    /// The first call wins; the nickname is immutable afterwards.
    pub fn authenticate(&mut self, nickname: &str) {
        if self.nickname.is_none() {
            self.nickname = Some(nickname.to_owned());
            self.auth = AuthState::Authenticated;
        }
    }

    /// Whether the handshake has completed
    pub fn is_authenticated(&self) -> bool {
        self.auth == AuthState::Authenticated
    }

    /// Nickname, if authenticated
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    /// Session duration so far
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn new_state() -> SessionState {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 6667);
        SessionState::new(1, addr)
    }

    #[test]
    fn test_auth_lifecycle() {
        let mut state = new_state();

        assert_eq!(state.auth, AuthState::AwaitingPass);
        assert!(!state.is_authenticated());

        state.begin_auth();
        assert_eq!(state.auth, AuthState::AwaitingNick);

        state.authenticate("bob");
        assert!(state.is_authenticated());
        assert_eq!(state.nickname(), Some("bob"));
    }

    #[test]
    fn test_role_resolved_once() {
        let mut state = new_state();

        state.resolve_role(Role::Bridge);
        state.resolve_role(Role::Client);

        assert_eq!(state.role, Some(Role::Bridge));
    }

    #[test]
    fn test_duration_tracks_elapsed_time() {
        let state = new_state();

        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(state.duration() >= std::time::Duration::from_millis(5));
    }

    #[test]
    fn test_nickname_assigned_once() {
        let mut state = new_state();

        state.authenticate("bob");
        state.authenticate("mallory");

        assert_eq!(state.nickname(), Some("bob"));
    }
}
