//! The question pool.

use triviarena_protocol::{Choice, QuestionView};

/// A multiple-choice question with exactly one correct option.
#[derive(Debug, PartialEq, Eq)]
pub struct Trivia {
    pub question: &'static str,
    pub answers: [&'static str; 4],
    pub correct: usize,
}

impl Trivia {
    pub fn is_correct(&self, choice: Choice) -> bool {
        choice.index() == self.correct
    }

    /// The question as shown to fighters, without the answer key.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            question: self.question.to_string(),
            answers: self.answers.map(str::to_string),
        }
    }
}

/// Every question a battle can ask.
pub static TRIVIA: [Trivia; 5] = [
    Trivia {
        question: "what's 2+2?",
        answers: ["4", "2", "9", "2"],
        correct: 0,
    },
    Trivia {
        question: "what's 4+4?",
        answers: ["4", "2", "8", "9"],
        correct: 2,
    },
    Trivia {
        question: "what's 3*3?",
        answers: ["6", "9", "33", "12"],
        correct: 1,
    },
    Trivia {
        question: "what's 10-7?",
        answers: ["17", "7", "4", "3"],
        correct: 3,
    },
    Trivia {
        question: "what's 12/4?",
        answers: ["3", "4", "8", "16"],
        correct: 0,
    },
];

/// Round-robin cursor over [`TRIVIA`]. Each battle has its own.
#[derive(Debug, Clone, Default)]
pub struct TriviaDeck {
    cursor: usize,
}

impl TriviaDeck {
    pub fn next_question(&mut self) -> &'static Trivia {
        let trivia = &TRIVIA[self.cursor];
        self.cursor = (self.cursor + 1) % TRIVIA.len();
        trivia
    }
}
