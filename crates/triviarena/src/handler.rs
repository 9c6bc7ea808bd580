//! Per-connection handler: upgrade, handshake, then pump bytes both ways.
//!
//! Each accepted socket gets its own Tokio task running this handler.
//! The flow is:
//!   1. Check the request is a websocket upgrade (501 otherwise)
//!   2. Register the socket with the arena → UserId
//!   3. Complete the handshake → arena sees the user open
//!   4. Spawn a writer that drains the user's outbound queue
//!   5. Loop: forward every inbound payload to the arena
//!
//! The arena owns the sending half of the outbound queue. When it drops
//! the user, the queue closes, the writer closes the socket, and the
//! reader loop ends.

use std::sync::Arc;

use tokio::sync::mpsc;
use triviarena_arena::ArenaHandle;
use triviarena_protocol::{Codec, JsonCodec, ServerMessage, UserId};
use triviarena_transport::{Connection, PendingConnection, WebSocketConnection};

use crate::TriviarenaError;

/// Drop guard that reports the socket closed when the handler exits.
///
/// Covers every exit path, including a failed handshake and a panic.
/// Since `Drop` is synchronous, the report is a fire-and-forget task.
struct CloseGuard {
    id: UserId,
    arena: ArenaHandle,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        let id = self.id;
        let arena = self.arena.clone();
        tokio::spawn(async move {
            // Unavailable just means the arena is already gone.
            let _ = arena.closed(id).await;
        });
    }
}

/// Handles a single socket from accept to close.
pub(crate) async fn handle_connection(
    mut pending: PendingConnection,
    arena: ArenaHandle,
) -> Result<(), TriviarenaError> {
    let addr = pending.peer_addr();
    pending.check_upgrade().await?;

    let (outbound, queue) = mpsc::unbounded_channel();
    let id = arena.socket_created(outbound).await?;
    let _guard = CloseGuard {
        id,
        arena: arena.clone(),
    };
    tracing::debug!(%id, %addr, "handling new connection");

    let conn = Arc::new(pending.handshake().await?);
    arena.opened(id).await?;

    tokio::spawn(write_outbound(id, Arc::clone(&conn), queue));

    loop {
        match conn.recv().await {
            Ok(Some(data)) => arena.received(id, data).await?,
            Ok(None) => {
                tracing::debug!(%id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%id, error = %e, "recv error");
                break;
            }
        }
    }

    // _guard drops here → arena learns about the close on its next tick.
    Ok(())
}

/// Encodes and sends queued messages until the queue closes, then closes
/// the socket.
async fn write_outbound(
    id: UserId,
    conn: Arc<WebSocketConnection>,
    mut queue: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(msg) = queue.recv().await {
        let bytes = match JsonCodec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%id, error = %e, "send failed, stopping writer");
            return;
        }
    }

    tracing::debug!(%id, "outbound queue closed, closing socket");
    let _ = conn.close().await;
}
