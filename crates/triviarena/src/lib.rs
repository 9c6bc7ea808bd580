//! # Triviarena
//!
//! A realtime trivia battle server. Players connect over a websocket,
//! pick a name, and are paired two by two. Each battle alternates combat
//! rounds with trivia questions; correct answers recruit soldiers that
//! guard the base and hit the opponent's. A running leaderboard tracks
//! wins minus losses per name.
//!
//! The crates underneath, bottom to top:
//!
//! ```text
//! transport (websocket) → protocol (JSON messages) → session (stages)
//!                                                   → battle (rules)
//!                                                   → arena (actor + tick)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use triviarena::prelude::*;
//!
//! # async fn run() -> Result<(), TriviarenaError> {
//! let server = TriviarenaServer::builder()
//!     .bind("0.0.0.0:8000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::TriviarenaError;
pub use server::{TriviarenaServer, TriviarenaServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{TriviarenaError, TriviarenaServer, TriviarenaServerBuilder};
    pub use triviarena_arena::{ArenaConfig, ArenaError, ArenaHandle, ArenaSnapshot};
    pub use triviarena_battle::BattleConfig;
    pub use triviarena_protocol::{
        BattleView, Choice, ClientMessage, Rejection, ServerMessage, UserId,
    };
    pub use triviarena_tick::TickConfig;
}
