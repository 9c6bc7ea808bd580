use triviarena_protocol::UserId;

/// Internal invariant violations inside the battle engine.
///
/// None of these are reachable from client input. The arena treats them
/// as fatal.
#[derive(Debug, thiserror::Error)]
pub enum BattleError {
    /// An answer slot was used outside its precondition.
    #[error("answer slot misuse: {0}")]
    AnswerSlot(String),

    /// `step` was handed a fighter that isn't part of this battle.
    #[error("{0} is not a fighter in this battle")]
    NotAFighter(UserId),
}
