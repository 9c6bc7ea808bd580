//! Error types for the arena.

use triviarena_battle::BattleError;
use triviarena_protocol::UserId;

/// Errors raised by the arena.
///
/// Everything except [`Unavailable`](Self::Unavailable) is an internal
/// invariant violation: the arena actor logs it and stops.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// A battle names a fighter that isn't in the fighting bucket.
    #[error("fighter {0} of an active battle is not fighting")]
    MissingFighter(UserId),

    /// The battle engine detected misuse.
    #[error(transparent)]
    Battle(#[from] BattleError),

    /// The arena actor has stopped, or its command channel is closed.
    #[error("arena is unavailable")]
    Unavailable,
}
