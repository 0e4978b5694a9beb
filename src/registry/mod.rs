//! Channel registry for pub/sub routing
//!
//! The registry is the single source of truth for "who gets this message".
//! It holds the bidirectional channel/connection mapping and the shared
//! write handles, all behind one mutex, and performs the broadcast fan-out.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<ChannelRegistry>
//!                 ┌──────────────────────────────┐
//!                 │ channels:    #ch -> {id}     │
//!                 │ memberships: id  -> {#ch}    │
//!                 │ subscribers: id  -> handle   │
//!                 └──────────────┬───────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//!    [Bridge]               [Consumer]              [Consumer]
//!    PRIVMSG #ch            write handle            write handle
//!        │                       ▲                       ▲
//!        └──► broadcast() ───────┴───────────────────────┘
//! ```
//!
//! The broadcast frame is a `bytes::Bytes`, so all subscribers share one
//! allocation of the delivered line.

pub mod store;
pub mod subscriber;

pub use store::ChannelRegistry;
pub use subscriber::{BoxedWriter, Subscriber};
