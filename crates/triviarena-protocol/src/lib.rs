//! Wire protocol for Triviarena.
//!
//! This crate defines what travels over a client's websocket:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`BattleView`], ...):
//!   JSON objects tagged by a `tag` field.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) for encode/decode failures, and
//!   [`Rejection`] for the protocol errors reported back to a client.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage / ServerMessage) → Session (stage behaviour)
//! ```
//!
//! The protocol layer knows nothing about connections or battles; it only
//! knows the shape of the messages.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ProtocolError, Rejection};
pub use types::{
    BaseView, BattleView, Choice, ClientMessage, EnemyView, QuestionView,
    Scores, ServerMessage, SoldierView, UserId,
};
