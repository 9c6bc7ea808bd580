//! Battle tuning.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Numbers that shape every battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Health each base starts with.
    pub base_health: i32,

    /// Idle ticks before the first question.
    pub opening_countdown: u32,

    /// Idle ticks between a resolved question and the next one.
    pub idle_countdown: u32,

    /// Ticks a question stays open.
    pub question_countdown: u32,

    /// Health of a reward soldier, drawn uniformly.
    pub reward_health: Range<i32>,

    /// Damage of a reward soldier, drawn uniformly.
    pub reward_damage: Range<i32>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            base_health: 10,
            opening_countdown: 10,
            idle_countdown: 5,
            question_countdown: 60,
            reward_health: 1..8,
            reward_damage: 1..3,
        }
    }
}
