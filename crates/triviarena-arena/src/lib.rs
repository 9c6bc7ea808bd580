//! The Triviarena coordinator.
//!
//! One [`Arena`] tracks every connected user in four stage buckets, runs
//! the battles between them and keeps the leaderboard. It is owned by a
//! single actor task (see [`spawn_arena`]) that interleaves connection
//! events with a fixed tick.
//!
//! # Key types
//!
//! - [`Arena`]: buckets, battles, disconnect queue and leaderboard
//! - [`ArenaHandle`]: send events to a running arena actor
//! - [`ArenaConfig`]: tick, battle and channel settings
//! - [`Bucket`]: insertion-ordered users of one stage
//! - [`Leaderboard`]: name → wins minus losses

mod actor;
mod arena;
mod bucket;
mod config;
mod error;
mod itertools;
mod leaderboard;

pub use actor::{ArenaHandle, spawn_arena};
pub use arena::{Arena, ArenaSnapshot};
pub use bucket::Bucket;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use leaderboard::Leaderboard;
