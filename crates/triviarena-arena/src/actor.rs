//! Arena actor: a single Tokio task that owns the [`Arena`] and its tick.
//!
//! Connection tasks never touch the arena directly. They send commands
//! through an [`ArenaHandle`], and the actor applies them one at a time,
//! interleaved with ticks. That gives the arena a single logical thread
//! without any locks.

use tokio::sync::{mpsc, oneshot};
use triviarena_protocol::UserId;
use triviarena_session::Outbound;
use triviarena_tick::TickScheduler;

use crate::{Arena, ArenaConfig, ArenaError, ArenaSnapshot};

/// Commands sent to the arena actor.
pub(crate) enum ArenaCommand {
    /// A socket was accepted; reply with its new user id.
    SocketCreated {
        outbound: Outbound,
        reply: oneshot::Sender<UserId>,
    },
    /// The websocket handshake completed.
    Opened(UserId),
    /// A payload arrived from the user.
    Received(UserId, Vec<u8>),
    /// The socket closed.
    Closed(UserId),
    /// Report the current buckets, battles and scores.
    Snapshot { reply: oneshot::Sender<ArenaSnapshot> },
    /// Stop ticking and drop every connection.
    Shutdown,
}

/// Handle to the running arena actor.
///
/// Cheap to clone; every connection task holds one. Once the actor has
/// stopped, every call returns [`ArenaError::Unavailable`].
#[derive(Clone)]
pub struct ArenaHandle {
    sender: mpsc::Sender<ArenaCommand>,
}

impl ArenaHandle {
    /// Registers a freshly accepted socket and returns its user id.
    pub async fn socket_created(&self, outbound: Outbound) -> Result<UserId, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ArenaCommand::SocketCreated {
            outbound,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| ArenaError::Unavailable)
    }

    /// Reports that the websocket handshake completed.
    pub async fn opened(&self, id: UserId) -> Result<(), ArenaError> {
        self.send(ArenaCommand::Opened(id)).await
    }

    /// Forwards an inbound payload (fire-and-forget).
    pub async fn received(&self, id: UserId, data: Vec<u8>) -> Result<(), ArenaError> {
        self.send(ArenaCommand::Received(id, data)).await
    }

    /// Reports that the socket closed.
    pub async fn closed(&self, id: UserId) -> Result<(), ArenaError> {
        self.send(ArenaCommand::Closed(id)).await
    }

    /// Requests a snapshot of the arena.
    pub async fn snapshot(&self) -> Result<ArenaSnapshot, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ArenaCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| ArenaError::Unavailable)
    }

    /// Tells the arena to shut down.
    pub async fn shutdown(&self) -> Result<(), ArenaError> {
        self.send(ArenaCommand::Shutdown).await
    }

    /// Resolves once the actor has stopped.
    pub async fn stopped(&self) {
        self.sender.closed().await;
    }

    async fn send(&self, cmd: ArenaCommand) -> Result<(), ArenaError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| ArenaError::Unavailable)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct ArenaActor {
    arena: Arena,
    scheduler: TickScheduler,
    receiver: mpsc::Receiver<ArenaCommand>,
}

impl ArenaActor {
    /// Processes commands and ticks until shutdown, until every handle is
    /// gone, or until a tick fails.
    async fn run(mut self) {
        tracing::info!(period_ms = self.scheduler.period().as_millis() as u64, "arena started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(ArenaCommand::Shutdown) => {
                        tracing::info!("arena shutting down");
                        break;
                    }
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                _ = self.scheduler.wait_for_tick() => {
                    if let Err(e) = self.arena.step() {
                        tracing::error!(error = %e, "arena invariant violated, stopping");
                        break;
                    }
                    self.scheduler.record_tick_end();
                }
            }
        }

        self.scheduler.stop();
        self.arena.dispose();
        tracing::info!(ticks = self.scheduler.tick_count(), "arena stopped");
    }

    fn handle(&mut self, cmd: ArenaCommand) {
        match cmd {
            ArenaCommand::SocketCreated { outbound, reply } => {
                let id = self.arena.socket_created(outbound);
                let _ = reply.send(id);
            }
            ArenaCommand::Opened(id) => self.arena.user_opened(id),
            ArenaCommand::Received(id, data) => self.arena.received(id, &data),
            ArenaCommand::Closed(id) => self.arena.user_disconnected(id),
            ArenaCommand::Snapshot { reply } => {
                let _ = reply.send(self.arena.snapshot());
            }
            // Handled by the run loop.
            ArenaCommand::Shutdown => {}
        }
    }
}

/// Spawns the arena actor and returns a handle to it.
///
/// `config.channel_size` bounds the command queue: when it is full,
/// connection tasks wait.
pub fn spawn_arena(config: ArenaConfig) -> ArenaHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let actor = ArenaActor {
        arena: Arena::new(config.battle),
        scheduler: TickScheduler::new(config.tick),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    ArenaHandle { sender: tx }
}
