//! Producer-side client
//!
//! The relay's upstream collaborators (event-source adapters) use this to
//! feed bridge-formatted lines into the server.

pub mod bridge;

pub use bridge::{BridgePublisher, SYSTEM_ORIGIN};
