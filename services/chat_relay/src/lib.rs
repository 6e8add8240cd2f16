//! Chat Relay WebSocket Server
//!
//! Accepts WebSocket connections and attaches a client actor to each one.
//! Actors share a single in-process relay hub.

pub mod config;
pub mod error;
pub mod server;
pub mod websocket;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use server::RelayServer;
pub use websocket::WebSocketConnection;
