//! Session stages for Triviarena.
//!
//! Every connected user is, at any moment, in exactly one stage:
//!
//! ```text
//! Unconnected ──open──→ Unregistered ──register──→ Registered ⇄ Fighting
//!   (socket accepted,     (asked for a             (idle,        (in a
//!    no handshake yet)     display name)            queued)       battle)
//! ```
//!
//! Each stage is its own type wrapping the connection's [`Guts`].
//! Transitions consume the old stage and return the new one, so a
//! connection can never be held by two stages at once.
//!
//! # How it fits in the stack
//!
//! ```text
//! Arena (above)     ← keeps one bucket per stage, drives transitions
//!     ↕
//! Session (this)    ← per-user stage behaviour, inbound parsing
//!     ↕
//! Protocol (below)  ← UserId, ClientMessage, ServerMessage
//! ```

mod guts;
mod stage;
mod stages;

pub use guts::{Guts, Outbound};
pub use stage::{Reaction, Stage, StageKind};
pub use stages::{Fighting, Registered, Unconnected, Unregistered, is_valid_name};
