//! Error types for the protocol layer.
//!
//! Two different things live here. [`ProtocolError`] is what the codec
//! returns to Rust callers when bytes can't be turned into a message (or
//! back). [`Rejection`] is what a *client* gets told when its input is
//! refused: it is rendered on the wire as `{"tag":"error","message":...}`
//! and never closes the connection.

use std::fmt;

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, unknown `tag`, missing
    /// fields, or a value out of range (e.g. an answer of 7).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The payload parsed, but it is not a JSON object.
    /// Every client message is an object carrying a `tag`.
    #[error("payload is not an object")]
    NotAnObject,
}

/// A protocol error reported to the offending client.
///
/// The connection and the user's stage stay unchanged; the client is
/// expected to correct itself and resend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The payload was not a well-formed client message.
    InvalidData,
    /// The message is valid but the current stage doesn't accept it
    /// (e.g. `register` after already being registered).
    UnexpectedMessage,
    /// An answer arrived while no question was pending.
    DidNotAsk,
    /// A second answer arrived for the same question.
    DoubleAnswer,
}

impl Rejection {
    /// The string sent in the `message` field of the error payload.
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidData => "invalid data",
            Self::UnexpectedMessage => "unexpected_message",
            Self::DidNotAsk => "did_not_ask",
            Self::DoubleAnswer => "double_answer",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
