//! `TriviarenaServer` builder and accept loop.
//!
//! This is the entry point for running a Triviarena server. It ties the
//! layers together: transport → handler task per socket → arena actor.

use std::time::Duration;

use triviarena_arena::{ArenaConfig, ArenaHandle, spawn_arena};
use triviarena_transport::{Transport, WebSocketTransport};

use crate::TriviarenaError;
use crate::handler::handle_connection;

/// Builder for configuring and starting a Triviarena server.
///
/// # Example
///
/// ```rust,ignore
/// use triviarena::prelude::*;
///
/// let server = TriviarenaServer::builder()
///     .bind("0.0.0.0:8000")
///     .tick_period(Duration::from_millis(500))
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct TriviarenaServerBuilder {
    bind_addr: String,
    arena_config: ArenaConfig,
}

impl TriviarenaServerBuilder {
    /// Address used when [`bind`](Self::bind) isn't called.
    pub const DEFAULT_ADDR: &'static str = "0.0.0.0:8000";

    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: Self::DEFAULT_ADDR.to_string(),
            arena_config: ArenaConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole arena configuration.
    pub fn arena_config(mut self, config: ArenaConfig) -> Self {
        self.arena_config = config;
        self
    }

    /// Sets how often the arena ticks.
    pub fn tick_period(mut self, period: Duration) -> Self {
        self.arena_config.tick.period = period;
        self
    }

    /// Binds the listener and spawns the arena actor.
    pub async fn build(self) -> Result<TriviarenaServer, TriviarenaError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let arena = spawn_arena(self.arena_config);
        Ok(TriviarenaServer { transport, arena })
    }
}

impl Default for TriviarenaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Triviarena server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TriviarenaServer {
    transport: WebSocketTransport,
    arena: ArenaHandle,
}

impl TriviarenaServer {
    /// Creates a new builder.
    pub fn builder() -> TriviarenaServerBuilder {
        TriviarenaServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the arena, e.g. to shut it down or take a snapshot.
    pub fn arena(&self) -> ArenaHandle {
        self.arena.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for every accepted socket. Returns once the
    /// arena has stopped; a failed accept is logged and skipped.
    pub async fn run(mut self) -> Result<(), TriviarenaError> {
        tracing::info!("triviarena server running");

        loop {
            tokio::select! {
                incoming = self.transport.accept() => match incoming {
                    Ok(pending) => {
                        let arena = self.arena.clone();
                        let addr = pending.peer_addr();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(pending, arena).await {
                                tracing::debug!(
                                    %addr,
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
                _ = self.arena.stopped() => {
                    tracing::info!("arena stopped, no longer accepting");
                    return Ok(());
                }
            }
        }
    }
}
