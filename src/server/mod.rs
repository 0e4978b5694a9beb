//! Relay server: listener, configuration, and per-connection handlers

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::RelayServer;
