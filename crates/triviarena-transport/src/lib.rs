//! Transport layer for Triviarena.
//!
//! Provides the [`Transport`] and [`Connection`] traits and their websocket
//! implementation. Accepting a socket is split in two so the layers above
//! can observe the gap between "TCP accepted" and "websocket open":
//!
//! ```text
//! accept() → PendingConnection ─ check_upgrade() ─ handshake() → WebSocketConnection
//!                                     │
//!                                     └─ not an upgrade → 501 Not Implemented
//! ```
//!
//! # Feature Flags
//!
//! - `websocket` (default): websocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    PendingConnection, WebSocketConnection, WebSocketTransport, is_websocket_upgrade,
};

use std::net::SocketAddr;

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// What `accept` yields: a connection that may still need a handshake.
    type Incoming: Send + 'static;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;

    /// The address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A single open connection that can send and receive messages.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one message to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// The remote peer's address.
    fn peer_addr(&self) -> SocketAddr;
}
