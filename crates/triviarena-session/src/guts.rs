//! The connection resource shared by every stage.

use tokio::sync::mpsc;
use triviarena_protocol::{ServerMessage, UserId};

/// Sending half of a connection's outbound queue. The connection's writer
/// task owns the other half.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// A user's identity plus the way to reach their socket.
///
/// Deliberately not `Clone`: exactly one stage owns it. Dropping it closes
/// the outbound queue, which ends the writer task and closes the socket.
#[derive(Debug)]
pub struct Guts {
    id: UserId,
    outbound: Outbound,
}

impl Guts {
    pub fn new(id: UserId, outbound: Outbound) -> Self {
        Self { id, outbound }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    /// Queues a message for the socket. Never blocks. If the writer is
    /// already gone the message is dropped; the close event will follow.
    pub fn send(&self, msg: ServerMessage) {
        if self.outbound.send(msg).is_err() {
            tracing::trace!(id = %self.id, "outbound closed, message dropped");
        }
    }
}
