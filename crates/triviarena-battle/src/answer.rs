//! A fighter's answer slot.

use triviarena_protocol::{Choice, Rejection};

use crate::BattleError;

/// Tracks whether a fighter owes, or has given, an answer.
///
/// ```text
/// Idle ── request() ──→ Requested ── submit(c) ──→ Answered(c)
///   ↑                                                  │
///   └──────────────────── reset() ─────────────────────┘
/// ```
///
/// `submit` is driven by client input and so reports a [`Rejection`].
/// `request` and `peek` are only called by the engine and report
/// [`BattleError`] when misused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerState {
    #[default]
    Idle,
    Requested,
    Answered(Choice),
}

impl AnswerState {
    /// Opens the slot for a new question.
    pub fn request(&mut self) -> Result<(), BattleError> {
        match self {
            Self::Idle => {
                *self = Self::Requested;
                Ok(())
            }
            other => Err(BattleError::AnswerSlot(format!(
                "answer requested while {other:?}"
            ))),
        }
    }

    /// Records the client's answer.
    pub fn submit(&mut self, choice: Choice) -> Result<(), Rejection> {
        match self {
            Self::Idle => Err(Rejection::DidNotAsk),
            Self::Answered(_) => Err(Rejection::DoubleAnswer),
            Self::Requested => {
                *self = Self::Answered(choice);
                Ok(())
            }
        }
    }

    /// The submitted answer, or `None` if still outstanding.
    pub fn peek(&self) -> Result<Option<Choice>, BattleError> {
        match self {
            Self::Idle => Err(BattleError::AnswerSlot(
                "answer read before one was requested".into(),
            )),
            Self::Requested => Ok(None),
            Self::Answered(choice) => Ok(Some(*choice)),
        }
    }

    /// Closes the slot.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
