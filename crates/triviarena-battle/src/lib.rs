//! Trivia-combat engine for Triviarena.
//!
//! A [`Battle`] pits two fighters against each other. It is advanced once
//! per arena tick through [`Battle::step`] and never schedules itself:
//!
//! ```text
//! Idle(10) ─ countdown hits 0 ─→ QuestionAsked(60) ─ both answered / timeout ─→ Idle(5) ─→ …
//!    │                                  │
//!    └── a base falls / a fighter ──────┴──→ Done(winner, loser)
//!        disconnects
//! ```
//!
//! While idle, both [`Base`]s trade blows with their front soldiers. Every
//! correct trivia answer recruits a new [`Soldier`] at the back of the
//! answerer's base.
//!
//! The engine doesn't own the fighters. The caller passes them in on each
//! step through the [`Combatant`] trait, and gets back the per-fighter
//! renders to deliver.

mod answer;
mod base;
mod battle;
mod config;
mod error;
mod trivia;

pub use answer::AnswerState;
pub use base::{Base, ROSTER, Soldier};
pub use battle::{Battle, BattleState, Combatant, Outcome, Render};
pub use config::BattleConfig;
pub use error::BattleError;
pub use trivia::{TRIVIA, Trivia, TriviaDeck};
