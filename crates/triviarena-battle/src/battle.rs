//! The battle state machine.

use tracing::{debug, info};
use triviarena_protocol::{BattleView, Choice, EnemyView, UserId};

use crate::{AnswerState, Base, BattleConfig, BattleError, Soldier, Trivia, TriviaDeck};

// ---------------------------------------------------------------------------
// Combatant
// ---------------------------------------------------------------------------

/// What the engine needs from a fighter.
///
/// The arena's fighting-stage sessions implement this, so a battle can
/// mutate bases and answer slots without owning the sessions.
pub trait Combatant {
    fn id(&self) -> UserId;
    fn name(&self) -> &str;
    fn base(&self) -> &Base;
    fn base_mut(&mut self) -> &mut Base;
    fn answer(&self) -> &AnswerState;
    fn answer_mut(&mut self) -> &mut AnswerState;
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub winner: UserId,
    pub loser: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleState {
    /// Bases trade blows until the countdown runs out.
    Idle { countdown: u32 },
    /// A question is open. `answers` is indexed like the fighters.
    QuestionAsked {
        countdown: u32,
        trivia: &'static Trivia,
        answers: [Option<Choice>; 2],
    },
    /// Terminal. Waiting to be harvested.
    Done(Outcome),
}

/// One render for one fighter, produced by [`Battle::step`].
pub type Render = (UserId, BattleView);

// ---------------------------------------------------------------------------
// Battle
// ---------------------------------------------------------------------------

/// A match between two fighters.
///
/// The first fighter is the "left" seat. It is the one that was
/// registered earlier and wins a simultaneous knockout on equal health.
#[derive(Debug)]
pub struct Battle {
    fighters: [UserId; 2],
    state: BattleState,
    deck: TriviaDeck,
    config: BattleConfig,
}

impl Battle {
    pub fn new(left: UserId, right: UserId, config: BattleConfig) -> Self {
        info!(%left, %right, "battle started");
        Self {
            fighters: [left, right],
            state: BattleState::Idle {
                countdown: config.opening_countdown,
            },
            deck: TriviaDeck::default(),
            config,
        }
    }

    pub fn fighters(&self) -> [UserId; 2] {
        self.fighters
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn involves(&self, id: UserId) -> bool {
        self.fighters.contains(&id)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            BattleState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.outcome().is_some()
    }

    /// Advances the battle by one tick and returns what each fighter
    /// should be shown. A finished battle doesn't move.
    ///
    /// `left` and `right` must be this battle's fighters, in seat order.
    pub fn step<C: Combatant>(
        &mut self,
        left: &mut C,
        right: &mut C,
    ) -> Result<Vec<Render>, BattleError> {
        for (seat, fighter) in self.fighters.iter().zip([left.id(), right.id()]) {
            if *seat != fighter {
                return Err(BattleError::NotAFighter(fighter));
            }
        }

        match self.state.clone() {
            BattleState::Idle { countdown } => self.step_idle(countdown, left, right),
            BattleState::QuestionAsked {
                countdown,
                trivia,
                answers,
            } => self.step_question(countdown, trivia, answers, left, right),
            BattleState::Done(_) => Ok(Vec::new()),
        }
    }

    fn step_idle<C: Combatant>(
        &mut self,
        countdown: u32,
        left: &mut C,
        right: &mut C,
    ) -> Result<Vec<Render>, BattleError> {
        let countdown = countdown.saturating_sub(1);

        if countdown == 0 {
            left.answer_mut().request()?;
            right.answer_mut().request()?;
            let trivia = self.deck.next_question();
            debug!(fighters = ?self.fighters, question = trivia.question, "question asked");
            self.state = BattleState::QuestionAsked {
                countdown: self.config.question_countdown,
                trivia,
                answers: [None, None],
            };
            return Ok(Vec::new());
        }

        // Both hits are computed before either lands.
        let to_left = right.base().damage();
        let to_right = left.base().damage();
        left.base_mut().absorb(to_left);
        right.base_mut().absorb(to_right);

        if !left.base().alive() || !right.base().alive() {
            let outcome = decide(left, right);
            info!(winner = %outcome.winner, loser = %outcome.loser, "battle finished");
            self.state = BattleState::Done(outcome);
            return Ok(Vec::new());
        }

        self.state = BattleState::Idle { countdown };
        Ok(vec![
            (left.id(), idle_view(left, right)),
            (right.id(), idle_view(right, left)),
        ])
    }

    fn step_question<C: Combatant>(
        &mut self,
        countdown: u32,
        trivia: &'static Trivia,
        mut answers: [Option<Choice>; 2],
        left: &mut C,
        right: &mut C,
    ) -> Result<Vec<Render>, BattleError> {
        let countdown = countdown.saturating_sub(1);

        for (answer, fighter) in answers.iter_mut().zip([&*left, &*right]) {
            if let Some(choice) = fighter.answer().peek()? {
                *answer = Some(choice);
            }
        }

        if countdown == 0 || answers.iter().all(Option::is_some) {
            for (answer, fighter) in answers.iter().zip([&mut *left, &mut *right]) {
                if answer.is_some_and(|choice| trivia.is_correct(choice)) {
                    let soldier = Soldier::recruit(&self.config);
                    debug!(fighter = %fighter.id(), soldier = soldier.name(), "soldier recruited");
                    fighter.base_mut().recruit(soldier);
                }
                fighter.answer_mut().reset();
            }
            self.state = BattleState::Idle {
                countdown: self.config.idle_countdown,
            };
            return Ok(Vec::new());
        }

        self.state = BattleState::QuestionAsked {
            countdown,
            trivia,
            answers,
        };
        let renders = [left.id(), right.id()]
            .into_iter()
            .zip(answers)
            .map(|(id, answer)| {
                let view = match answer {
                    Some(_) => BattleView::QuestionWaitingOnEnemy { countdown },
                    None => BattleView::Question {
                        question: trivia.view(),
                        countdown,
                    },
                };
                (id, view)
            })
            .collect();
        Ok(renders)
    }

    /// Ends the battle in the other fighter's favour.
    ///
    /// Returns `true` if this changed anything: ids that aren't fighters
    /// here, and battles that are already over, are left alone.
    pub fn disconnect_happened(&mut self, id: UserId) -> bool {
        if self.is_done() {
            return false;
        }
        let Some(seat) = self.fighters.iter().position(|f| *f == id) else {
            return false;
        };
        let outcome = Outcome {
            winner: self.fighters[1 - seat],
            loser: id,
        };
        info!(winner = %outcome.winner, loser = %outcome.loser, "battle forfeited");
        self.state = BattleState::Done(outcome);
        true
    }
}

/// Picks a winner once at least one base has fallen. The higher remaining
/// health wins; on equal health the left seat does.
fn decide<C: Combatant>(left: &C, right: &C) -> Outcome {
    if left.base().health() >= right.base().health() {
        Outcome {
            winner: left.id(),
            loser: right.id(),
        }
    } else {
        Outcome {
            winner: right.id(),
            loser: left.id(),
        }
    }
}

fn idle_view<C: Combatant>(you: &C, enemy: &C) -> BattleView {
    BattleView::Idle {
        you: you.base().view(),
        enemy: EnemyView {
            name: enemy.name().to_string(),
            base: enemy.base().view(),
        },
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TRIVIA;

    struct Dummy {
        id: UserId,
        name: &'static str,
        base: Base,
        answer: AnswerState,
    }

    impl Dummy {
        fn new(id: u64, name: &'static str) -> Self {
            Self {
                id: UserId(id),
                name,
                base: Base::new(10),
                answer: AnswerState::default(),
            }
        }
    }

    impl Combatant for Dummy {
        fn id(&self) -> UserId {
            self.id
        }
        fn name(&self) -> &str {
            self.name
        }
        fn base(&self) -> &Base {
            &self.base
        }
        fn base_mut(&mut self) -> &mut Base {
            &mut self.base
        }
        fn answer(&self) -> &AnswerState {
            &self.answer
        }
        fn answer_mut(&mut self) -> &mut AnswerState {
            &mut self.answer
        }
    }

    fn setup() -> (Battle, Dummy, Dummy) {
        let a = Dummy::new(1, "A");
        let b = Dummy::new(2, "B");
        let battle = Battle::new(a.id, b.id, BattleConfig::default());
        (battle, a, b)
    }

    /// Steps through the opening countdown until the first question.
    fn skip_to_question(battle: &mut Battle, a: &mut Dummy, b: &mut Dummy) {
        for _ in 0..BattleConfig::default().opening_countdown {
            battle.step(a, b).unwrap();
        }
        assert!(matches!(battle.state(), BattleState::QuestionAsked { .. }));
    }

    fn choice(i: u8) -> Choice {
        Choice::new(i).unwrap()
    }

    // =====================================================================
    // Idle combat
    // =====================================================================

    #[test]
    fn test_new_battle_opens_idle() {
        let (battle, _, _) = setup();
        assert_eq!(battle.state(), &BattleState::Idle { countdown: 10 });
        assert_eq!(battle.outcome(), None);
        assert!(battle.involves(UserId(1)));
        assert!(!battle.involves(UserId(3)));
    }

    #[test]
    fn test_idle_tick_renders_both_sides() {
        let (mut battle, mut a, mut b) = setup();
        let renders = battle.step(&mut a, &mut b).unwrap();

        assert_eq!(renders.len(), 2);
        let (to, view) = &renders[0];
        assert_eq!(*to, UserId(1));
        match view {
            BattleView::Idle { you, enemy } => {
                assert_eq!(you.health, 10);
                assert_eq!(enemy.name, "B");
            }
            other => panic!("expected idle render, got {other:?}"),
        }
        assert_eq!(renders[1].0, UserId(2));
        assert_eq!(battle.state(), &BattleState::Idle { countdown: 9 });
    }

    #[test]
    fn test_opening_countdown_ends_in_a_question() {
        let (mut battle, mut a, mut b) = setup();
        for _ in 0..9 {
            assert_eq!(battle.step(&mut a, &mut b).unwrap().len(), 2);
        }

        // Asking is silent; the question is rendered from the next tick.
        let renders = battle.step(&mut a, &mut b).unwrap();
        assert!(renders.is_empty());
        match battle.state() {
            BattleState::QuestionAsked {
                countdown, answers, ..
            } => {
                assert_eq!(*countdown, 60);
                assert_eq!(*answers, [None, None]);
            }
            other => panic!("expected a question, got {other:?}"),
        }
        assert_eq!(a.answer, AnswerState::Requested);
        assert_eq!(b.answer, AnswerState::Requested);
    }

    #[test]
    fn test_soldier_damage_is_simultaneous() {
        let (mut battle, mut a, mut b) = setup();
        a.base.recruit(Soldier::new("Mads", 5, 2));
        b.base.recruit(Soldier::new("Teis", 3, 4));

        battle.step(&mut a, &mut b).unwrap();
        assert_eq!(a.base.soldiers().next().unwrap().health(), 1);
        assert_eq!(b.base.soldiers().next().unwrap().health(), 1);
        assert_eq!(a.base.health(), 10);
        assert_eq!(b.base.health(), 10);
    }

    #[test]
    fn test_undefended_base_falls_and_battle_ends() {
        let (mut battle, mut a, mut b) = setup();
        a.base.recruit(Soldier::new("Kasper", 100, 2));

        for tick in 1..5 {
            let renders = battle.step(&mut a, &mut b).unwrap();
            assert_eq!(renders.len(), 2, "tick {tick} should render");
        }
        assert_eq!(b.base.health(), 2);

        let renders = battle.step(&mut a, &mut b).unwrap();
        assert!(renders.is_empty(), "no render on the knockout tick");
        assert_eq!(
            battle.outcome(),
            Some(Outcome {
                winner: UserId(1),
                loser: UserId(2),
            })
        );
    }

    #[test]
    fn test_right_seat_can_win() {
        let (mut battle, mut a, mut b) = setup();
        b.base.recruit(Soldier::new("Chris", 100, 2));
        for _ in 0..5 {
            battle.step(&mut a, &mut b).unwrap();
        }
        assert_eq!(battle.outcome().unwrap().winner, UserId(2));
    }

    #[test]
    fn test_double_knockout_higher_health_wins() {
        let mut a = Dummy::new(1, "A");
        let mut b = Dummy::new(2, "B");
        a.base.absorb(12);
        b.base.absorb(11);
        assert_eq!(decide(&a, &b).winner, UserId(2));
    }

    #[test]
    fn test_double_knockout_equal_health_left_wins() {
        let mut a = Dummy::new(1, "A");
        let mut b = Dummy::new(2, "B");
        a.base.absorb(10);
        b.base.absorb(10);
        let outcome = decide(&a, &b);
        assert_eq!(outcome.winner, UserId(1));
        assert_eq!(outcome.loser, UserId(2));
    }

    // =====================================================================
    // Questions
    // =====================================================================

    #[test]
    fn test_unanswered_question_renders_question() {
        let (mut battle, mut a, mut b) = setup();
        skip_to_question(&mut battle, &mut a, &mut b);

        let renders = battle.step(&mut a, &mut b).unwrap();
        assert_eq!(renders.len(), 2);
        for (_, view) in renders {
            match view {
                BattleView::Question {
                    question,
                    countdown,
                } => {
                    assert_eq!(question.question, TRIVIA[0].question);
                    assert_eq!(countdown, 59);
                }
                other => panic!("expected question render, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_answered_fighter_only_sees_waiting() {
        let (mut battle, mut a, mut b) = setup();
        skip_to_question(&mut battle, &mut a, &mut b);
        a.answer.submit(choice(1)).unwrap();

        let renders = battle.step(&mut a, &mut b).unwrap();
        assert_eq!(
            renders[0],
            (
                UserId(1),
                BattleView::QuestionWaitingOnEnemy { countdown: 59 }
            )
        );
        assert!(matches!(renders[1].1, BattleView::Question { .. }));
    }

    #[test]
    fn test_both_correct_both_rewarded() {
        let (mut battle, mut a, mut b) = setup();
        skip_to_question(&mut battle, &mut a, &mut b);

        let key = choice(TRIVIA[0].correct as u8);
        a.answer.submit(key).unwrap();
        b.answer.submit(key).unwrap();

        let renders = battle.step(&mut a, &mut b).unwrap();
        assert!(renders.is_empty());
        assert_eq!(a.base.soldiers().count(), 1);
        assert_eq!(b.base.soldiers().count(), 1);
        assert_eq!(battle.state(), &BattleState::Idle { countdown: 5 });
        assert_eq!(a.answer, AnswerState::Idle);
        assert_eq!(b.answer, AnswerState::Idle);
    }

    #[test]
    fn test_wrong_answer_is_not_rewarded() {
        let (mut battle, mut a, mut b) = setup();
        skip_to_question(&mut battle, &mut a, &mut b);

        let key = TRIVIA[0].correct as u8;
        a.answer.submit(choice(key)).unwrap();
        b.answer.submit(choice((key + 1) % 4)).unwrap();

        battle.step(&mut a, &mut b).unwrap();
        assert_eq!(a.base.soldiers().count(), 1);
        assert_eq!(b.base.soldiers().count(), 0);
    }

    #[test]
    fn test_question_timeout_rewards_nobody() {
        let (mut battle, mut a, mut b) = setup();
        skip_to_question(&mut battle, &mut a, &mut b);

        for _ in 0..59 {
            assert_eq!(battle.step(&mut a, &mut b).unwrap().len(), 2);
        }
        let renders = battle.step(&mut a, &mut b).unwrap();
        assert!(renders.is_empty());
        assert_eq!(battle.state(), &BattleState::Idle { countdown: 5 });
        assert_eq!(a.base.soldiers().count(), 0);
        assert_eq!(b.base.soldiers().count(), 0);
        assert_eq!(a.answer, AnswerState::Idle);
    }

    #[test]
    fn test_late_single_answer_is_kept_until_timeout() {
        let (mut battle, mut a, mut b) = setup();
        skip_to_question(&mut battle, &mut a, &mut b);
        for _ in 0..30 {
            battle.step(&mut a, &mut b).unwrap();
        }
        a.answer.submit(choice(TRIVIA[0].correct as u8)).unwrap();
        for _ in 0..30 {
            battle.step(&mut a, &mut b).unwrap();
        }
        assert_eq!(battle.state(), &BattleState::Idle { countdown: 5 });
        assert_eq!(a.base.soldiers().count(), 1);
    }

    #[test]
    fn test_questions_cycle_round_robin() {
        let (mut battle, mut a, mut b) = setup();
        skip_to_question(&mut battle, &mut a, &mut b);
        a.answer.submit(choice(0)).unwrap();
        b.answer.submit(choice(0)).unwrap();
        battle.step(&mut a, &mut b).unwrap();

        for _ in 0..BattleConfig::default().idle_countdown {
            battle.step(&mut a, &mut b).unwrap();
        }
        match battle.state() {
            BattleState::QuestionAsked { trivia, .. } => assert_eq!(*trivia, &TRIVIA[1]),
            other => panic!("expected the second question, got {other:?}"),
        }
    }

    // =====================================================================
    // Disconnects
    // =====================================================================

    #[test]
    fn test_disconnect_mid_question_forfeits() {
        let (mut battle, mut a, mut b) = setup();
        skip_to_question(&mut battle, &mut a, &mut b);
        a.answer.submit(choice(0)).unwrap();

        assert!(battle.disconnect_happened(UserId(1)));
        assert_eq!(
            battle.outcome(),
            Some(Outcome {
                winner: UserId(2),
                loser: UserId(1),
            })
        );
        assert!(battle.step(&mut a, &mut b).unwrap().is_empty());
    }

    #[test]
    fn test_first_disconnect_loses_when_both_leave() {
        let (mut battle, _, _) = setup();
        assert!(battle.disconnect_happened(UserId(2)));
        assert!(!battle.disconnect_happened(UserId(1)));
        assert_eq!(battle.outcome().unwrap().loser, UserId(2));
    }

    #[test]
    fn test_disconnect_of_stranger_is_ignored() {
        let (mut battle, _, _) = setup();
        assert!(!battle.disconnect_happened(UserId(99)));
        assert!(!battle.is_done());
    }

    #[test]
    fn test_step_with_wrong_fighter_is_an_error() {
        let (mut battle, mut a, _) = setup();
        let mut stranger = Dummy::new(7, "C");
        let result = battle.step(&mut a, &mut stranger);
        assert!(matches!(result, Err(BattleError::NotAFighter(UserId(7)))));
    }

    #[test]
    fn test_step_with_swapped_seats_is_an_error() {
        let (mut battle, mut a, mut b) = setup();
        assert!(battle.step(&mut b, &mut a).is_err());
    }
}
