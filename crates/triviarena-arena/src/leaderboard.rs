//! Running scores for the lifetime of the process.

use triviarena_protocol::Scores;

/// Display name → wins minus losses.
///
/// Keyed by name, not by user id, so a returning player under the same
/// name keeps their score (and two players sharing a name share one).
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    scores: Scores,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// +1 for the winner, −1 for the loser. Unseen names start at 0.
    pub fn record(&mut self, winner: &str, loser: &str) {
        *self.scores.entry(winner.to_string()).or_insert(0) += 1;
        *self.scores.entry(loser.to_string()).or_insert(0) -= 1;
    }

    /// A name's score; 0 if it never finished a battle.
    pub fn score(&self, name: &str) -> i64 {
        self.scores.get(name).copied().unwrap_or(0)
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }
}
