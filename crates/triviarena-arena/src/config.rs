//! Arena configuration.

use triviarena_battle::BattleConfig;
use triviarena_tick::TickConfig;

/// Everything needed to spawn an arena.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Tick cadence. Default: one tick per second, skipping missed ticks.
    pub tick: TickConfig,

    /// Numbers every battle starts from.
    pub battle: BattleConfig,

    /// Capacity of the actor's command channel. Connection tasks wait
    /// when it is full.
    pub channel_size: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tick: TickConfig::default(),
            battle: BattleConfig::default(),
            channel_size: 1024,
        }
    }
}
