//! Bases and the soldiers that defend them.

use std::collections::VecDeque;
use std::ops::Range;

use rand::Rng;
use triviarena_protocol::{BaseView, SoldierView};

use crate::BattleConfig;

/// Cosmetic names handed out to reward soldiers.
pub const ROSTER: [&str; 9] = [
    "Mikkel", "From", "Teis", "Theis", "Pieter", "Phami", "Mads", "Kasper", "Chris",
];

/// A unit in a base's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soldier {
    name: &'static str,
    health: i32,
    damage: i32,
}

impl Soldier {
    pub fn new(name: &'static str, health: i32, damage: i32) -> Self {
        Self {
            name,
            health,
            damage,
        }
    }

    /// A reward soldier with a random roster name and stats drawn from
    /// the config's reward ranges.
    pub fn recruit(config: &BattleConfig) -> Self {
        let mut rng = rand::rng();
        let name = ROSTER[rng.random_range(0..ROSTER.len())];
        let health = draw(&mut rng, &config.reward_health);
        let damage = draw(&mut rng, &config.reward_damage);
        Self::new(name, health, damage)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn view(&self) -> SoldierView {
        SoldierView {
            name: self.name.to_string(),
            health: self.health,
            damage: self.damage,
        }
    }
}

/// Uniform draw from `range`. An empty range yields its start.
fn draw(rng: &mut impl Rng, range: &Range<i32>) -> i32 {
    if range.is_empty() {
        range.start
    } else {
        rng.random_range(range.clone())
    }
}

/// A fighter's combat state: a health pool behind a queue of soldiers.
///
/// The front soldier both deals this base's damage and absorbs incoming
/// damage. Only once the queue is empty does the base itself get hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base {
    health: i32,
    soldiers: VecDeque<Soldier>,
}

impl Base {
    /// A fresh base with no soldiers.
    pub fn new(health: i32) -> Self {
        Self {
            health,
            soldiers: VecDeque::new(),
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    /// Front of the queue first.
    pub fn soldiers(&self) -> impl Iterator<Item = &Soldier> {
        self.soldiers.iter()
    }

    pub fn alive(&self) -> bool {
        self.health > 0
    }

    /// Damage this base deals per idle tick: its front soldier's, or 0.
    pub fn damage(&self) -> i32 {
        self.soldiers.front().map_or(0, Soldier::damage)
    }

    /// Takes a hit. The front soldier absorbs it and falls at 0 health or
    /// below; with no soldiers the base's own health pays.
    pub fn absorb(&mut self, damage: i32) {
        match self.soldiers.front_mut() {
            Some(front) => {
                front.health -= damage;
                if front.health <= 0 {
                    self.soldiers.pop_front();
                }
            }
            None => self.health -= damage,
        }
    }

    /// Enqueues a soldier at the back.
    pub fn recruit(&mut self, soldier: Soldier) {
        self.soldiers.push_back(soldier);
    }

    pub fn view(&self) -> BaseView {
        BaseView {
            health: self.health,
            soldiers: self.soldiers.iter().map(Soldier::view).collect(),
        }
    }
}
