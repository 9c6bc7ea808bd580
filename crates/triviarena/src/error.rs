//! Unified error type for Triviarena.

use triviarena_arena::ArenaError;
use triviarena_protocol::ProtocolError;
use triviarena_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TriviarenaError {
    /// A transport-level error (bind, accept, handshake, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The arena actor is gone or hit a broken invariant.
    #[error(transparent)]
    Arena(#[from] ArenaError),
}
