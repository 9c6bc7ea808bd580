//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" converts between Rust types and raw bytes. The session layer
//! doesn't care HOW messages are serialized; it holds something that
//! implements [`Codec`]. Today that's always [`JsonCodec`], because the
//! browser and Flutter clients speak JSON text frames.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientMessage, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec is shared by every connection
/// task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes an inbound client payload.
    ///
    /// Codecs with a notion of "object" should override this to reject
    /// non-object payloads before looking at the tag.
    fn decode_client(&self, data: &[u8]) -> Result<ClientMessage, ProtocolError> {
        self.decode(data)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use triviarena_protocol::{Codec, JsonCodec, ClientMessage};
///
/// let codec = JsonCodec;
/// let msg = codec.decode_client(br#"{"tag":"register","name":"ada"}"#).unwrap();
/// assert_eq!(msg, ClientMessage::Register { name: "ada".into() });
///
/// // Valid JSON, but not an object.
/// assert!(codec.decode_client(b"42").is_err());
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn decode_client(&self, data: &[u8]) -> Result<ClientMessage, ProtocolError> {
        // Parse to a generic value first so "not an object" is told apart
        // from "an object we don't understand".
        let value: serde_json::Value = self.decode(data)?;
        if !value.is_object() {
            return Err(ProtocolError::NotAnObject);
        }
        serde_json::from_value(value).map_err(ProtocolError::Decode)
    }
}
