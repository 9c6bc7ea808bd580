//! Behaviour shared by every stage.

use std::fmt;

use triviarena_protocol::{ClientMessage, Codec, JsonCodec, Rejection, ServerMessage, UserId};

use crate::Guts;

/// Which bucket a user lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Unconnected,
    Unregistered,
    Registered,
    Fighting,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconnected => "unconnected",
            Self::Unregistered => "unregistered",
            Self::Registered => "registered",
            Self::Fighting => "fighting",
        };
        f.write_str(name)
    }
}

/// What the arena has to do after a stage handled a message.
///
/// Stages can't move themselves between buckets. When a message calls
/// for a transition they say so here and the arena carries it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing beyond what the stage already did.
    None,
    /// The user asked to register under this name.
    Register(String),
}

/// A session stage wrapping one connection.
pub trait Stage: Sized {
    const KIND: StageKind;

    fn guts(&self) -> &Guts;

    /// Ends this stage and hands back the still-open connection.
    fn dispose(self) -> Guts;

    fn id(&self) -> UserId {
        self.guts().id()
    }

    fn send(&self, msg: ServerMessage) {
        self.guts().send(msg);
    }

    fn reject(&self, rejection: Rejection) {
        tracing::debug!(id = %self.id(), stage = %Self::KIND, %rejection, "message rejected");
        self.send(ServerMessage::rejection(rejection));
    }

    /// Stage-specific handling of a well-formed message. Ignores it by
    /// default.
    fn received(&mut self, _msg: ClientMessage) -> Reaction {
        Reaction::None
    }

    /// Entry point for a raw inbound payload.
    ///
    /// Anything that isn't a JSON object holding a known message is
    /// answered with `invalid data`, and the stage is left as it was.
    fn handle(&mut self, data: &[u8]) -> Reaction {
        match JsonCodec.decode_client(data) {
            Ok(msg) => self.received(msg),
            Err(e) => {
                tracing::debug!(id = %self.id(), error = %e, "undecodable payload");
                self.reject(Rejection::InvalidData);
                Reaction::None
            }
        }
    }
}
