/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer went away before the operation could complete.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The request did not ask for a websocket upgrade. The peer has
    /// already been answered with `501 Not Implemented`.
    #[error("request is not a websocket upgrade")]
    NotWebSocket,

    /// The websocket opening handshake failed.
    #[error("handshake failed: {0}")]
    HandshakeFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
