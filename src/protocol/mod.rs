//! Wire protocol for the relay
//!
//! The relay speaks a minimal subset of the Twitch IRC (TMI) line protocol:
//! CR LF terminated UTF-8 text lines. Bridges forward pre-formatted
//! `PRIVMSG` lines; clients run a `PASS`/`NICK` handshake and `JOIN`
//! channels. Everything else real IRC defines (topics, user lists, PING,
//! capability negotiation) is tolerated on input and never produced.

pub mod constants;
pub mod message;

pub use constants::{
    DEFAULT_PORT, LINE_TERMINATOR, NOTICE_AUTH_FAILED, NOTICE_AUTH_IMPROPER, SERVER_IDENT,
};
pub use message::{ClientCommand, ForwardedMessage};
