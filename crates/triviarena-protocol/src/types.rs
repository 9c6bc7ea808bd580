//! Core protocol types for Triviarena's wire format.
//!
//! Every message on the wire is a JSON object with a `tag` field naming the
//! variant, for example:
//!
//! ```text
//! client → server   {"tag":"register","name":"ada"}
//! client → server   {"tag":"answer","answer":2}
//! server → client   {"tag":"register_name"}
//! server → client   {"tag":"battle","battle":{"tag":"question_waiting_on_enemy","countdown":41}}
//! ```
//!
//! `#[serde(tag = "tag", rename_all = "snake_case")]` produces exactly
//! this "internally tagged" shape, which is what the Flutter client
//! switches on.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Rejection;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A process-unique identifier for a connected user.
///
/// Assigned once when the socket is accepted, never reused, and stable
/// across every stage the user moves through. Serialized as a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// One of the four options of a trivia question.
///
/// Deserialization goes through `TryFrom<u8>`, so `{"answer": 7}` is a
/// decode error rather than a value the battle has to re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Choice(u8);

impl Choice {
    /// Number of options every question has.
    pub const COUNT: u8 = 4;

    /// Returns `None` if `index` is not in `0..4`.
    pub fn new(index: u8) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index))
    }

    /// The option index, `0..4`.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<u8> for Choice {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
            .ok_or_else(|| format!("answer must be in 0..{}, got {value}", Self::COUNT))
    }
}

impl From<Choice> for u8 {
    fn from(choice: Choice) -> Self {
        choice.0
    }
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Messages a client may send.
///
/// Which ones are accepted depends on the user's stage: `register` only
/// while unregistered, `answer` only while a question is pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Pick a display name.
    Register { name: String },
    /// Answer the pending trivia question.
    Answer { answer: Choice },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Leaderboard scores keyed by display name.
///
/// A `BTreeMap` so the JSON object comes out in a stable order.
pub type Scores = BTreeMap<String, i64>;

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum ServerMessage {
    /// "Your socket is open, tell me your name."
    RegisterName,

    /// A protocol error. Never closes the connection.
    Error { message: String },

    /// Sent every tick to idle (registered) users.
    Leaderboard {
        leaderboard: Scores,
        /// The recipient's own display name.
        you: String,
        /// Every registered name suffixed `(waiting)`, then every fighting
        /// name suffixed `(fighting)`.
        users: Vec<String>,
    },

    /// A per-tick render of the recipient's battle.
    Battle { battle: BattleView },
}

impl ServerMessage {
    /// Builds the error payload for a rejected client message.
    pub fn rejection(rejection: Rejection) -> Self {
        Self::Error {
            message: rejection.message().to_string(),
        }
    }
}

/// What a fighter sees of its battle on a given tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum BattleView {
    /// Combat round: your base and your opponent's.
    Idle { you: BaseView, enemy: EnemyView },

    /// A question is pending and you haven't answered yet.
    Question {
        question: QuestionView,
        countdown: u32,
    },

    /// You answered; the opponent hasn't yet. The question text is
    /// withheld so it can't be re-read.
    QuestionWaitingOnEnemy { countdown: u32 },
}

/// A base as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseView {
    pub health: i32,
    /// Front of the queue first.
    pub soldiers: Vec<SoldierView>,
}

/// A soldier as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldierView {
    pub name: String,
    pub health: i32,
    pub damage: i32,
}

/// The opponent half of an idle render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyView {
    pub name: String,
    pub base: BaseView,
}

/// A trivia question without its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub question: String,
    pub answers: [String; 4],
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The Flutter client switches on exact JSON shapes, so most of these
    //! tests pin the serialized form rather than just round-tripping.

    use super::*;
    use serde_json::json;

    fn base(health: i32) -> BaseView {
        BaseView {
            health,
            soldiers: vec![SoldierView {
                name: "Kasper".into(),
                health: 4,
                damage: 2,
            }],
        }
    }

    // =====================================================================
    // Identity
    // =====================================================================

    #[test]
    fn test_user_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&UserId(42)).unwrap(), "42");
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId(7).to_string(), "U-7");
    }

    #[test]
    fn test_user_ids_order_numerically() {
        assert!(UserId(2) < UserId(10));
    }

    #[test]
    fn test_choice_bounds() {
        assert!(Choice::new(0).is_some());
        assert!(Choice::new(3).is_some());
        assert!(Choice::new(4).is_none());
        assert_eq!(Choice::new(2).unwrap().index(), 2);
    }

    #[test]
    fn test_choice_serializes_as_plain_number() {
        let json = serde_json::to_string(&Choice::new(1).unwrap()).unwrap();
        assert_eq!(json, "1");
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_client_register_json_format() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"tag": "register", "name": "A"})).unwrap();
        assert_eq!(msg, ClientMessage::Register { name: "A".into() });
    }

    #[test]
    fn test_client_answer_missing_field_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_value(json!({"tag": "answer"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_register_with_non_string_name_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_value(json!({"tag": "register", "name": 5}));
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerMessage: JSON shape
    // =====================================================================

    #[test]
    fn test_register_name_json_format() {
        let json = serde_json::to_value(ServerMessage::RegisterName).unwrap();
        assert_eq!(json, json!({"tag": "register_name"}));
    }

    #[test]
    fn test_rejection_json_format() {
        let json =
            serde_json::to_value(ServerMessage::rejection(Rejection::InvalidData)).unwrap();
        assert_eq!(json, json!({"tag": "error", "message": "invalid data"}));
    }

    #[test]
    fn test_leaderboard_json_format() {
        let mut leaderboard = Scores::new();
        leaderboard.insert("A".into(), 1);
        leaderboard.insert("B".into(), -1);
        let msg = ServerMessage::Leaderboard {
            leaderboard,
            you: "A".into(),
            users: vec!["A (waiting)".into(), "C (fighting)".into()],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({
                "tag": "leaderboard",
                "leaderboard": {"A": 1, "B": -1},
                "you": "A",
                "users": ["A (waiting)", "C (fighting)"],
            })
        );
    }

    #[test]
    fn test_battle_idle_json_format() {
        let msg = ServerMessage::Battle {
            battle: BattleView::Idle {
                you: base(10),
                enemy: EnemyView {
                    name: "B".into(),
                    base: base(7),
                },
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["tag"], "battle");
        assert_eq!(json["battle"]["tag"], "idle");
        assert_eq!(json["battle"]["you"]["health"], 10);
        assert_eq!(json["battle"]["enemy"]["name"], "B");
        assert_eq!(json["battle"]["enemy"]["base"]["soldiers"][0]["name"], "Kasper");
    }

    #[test]
    fn test_battle_question_json_format() {
        let msg = ServerMessage::Battle {
            battle: BattleView::Question {
                question: QuestionView {
                    question: "what's 2+2?".into(),
                    answers: ["4".into(), "2".into(), "9".into(), "22".into()],
                },
                countdown: 59,
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["battle"]["tag"], "question");
        assert_eq!(json["battle"]["countdown"], 59);
        assert_eq!(json["battle"]["question"]["answers"][3], "22");
    }

    #[test]
    fn test_battle_waiting_json_format() {
        let msg = ServerMessage::Battle {
            battle: BattleView::QuestionWaitingOnEnemy { countdown: 12 },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({"tag": "battle", "battle": {"tag": "question_waiting_on_enemy", "countdown": 12}})
        );
    }

    // =====================================================================
    // ServerMessage: every tag survives serialize → parse
    // =====================================================================

    #[test]
    fn test_every_server_message_round_trips() {
        let messages = vec![
            ServerMessage::RegisterName,
            ServerMessage::rejection(Rejection::DoubleAnswer),
            ServerMessage::Leaderboard {
                leaderboard: Scores::from([("A".to_string(), 3)]),
                you: "A".into(),
                users: vec!["A (waiting)".into()],
            },
            ServerMessage::Battle {
                battle: BattleView::Idle {
                    you: base(1),
                    enemy: EnemyView {
                        name: "B".into(),
                        base: base(-2),
                    },
                },
            },
            ServerMessage::Battle {
                battle: BattleView::Question {
                    question: QuestionView {
                        question: "q".into(),
                        answers: ["a".into(), "b".into(), "c".into(), "d".into()],
                    },
                    countdown: 1,
                },
            },
            ServerMessage::Battle {
                battle: BattleView::QuestionWaitingOnEnemy { countdown: 0 },
            },
        ];

        for msg in messages {
            let bytes = serde_json::to_vec(&msg).unwrap();
            let decoded: ServerMessage = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(msg, decoded);
        }
    }

    #[test]
    fn test_unknown_server_tag_is_rejected() {
        let result: Result<ServerMessage, _> =
            serde_json::from_value(json!({"tag": "teleport"}));
        assert!(result.is_err());
    }
}
