//! # tmi-relay
//!
//! A relay server that forwards short text events from producer ("bridge")
//! connections to consumer ("client") connections grouped by named
//! channels, speaking a minimal subset of the Twitch IRC wire protocol.
//!
//! Bridges write pre-formatted `:<origin> PRIVMSG #<channel> :<text>`
//! lines; consumers authenticate with `PASS`/`NICK`, are auto-joined to
//! their own `#<nickname>` channel, and `JOIN` further channels to receive
//! forwarded lines verbatim.
//!
//! ```no_run
//! use tmi_relay::{RelayServer, ServerConfig};
//!
//! # async fn example() -> tmi_relay::Result<()> {
//! let config = ServerConfig::with_addr("0.0.0.0:6667".parse().unwrap());
//! let server = RelayServer::new(config);
//! server.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;

pub use error::{Error, Result};
pub use registry::ChannelRegistry;
pub use server::{RelayServer, ServerConfig};
