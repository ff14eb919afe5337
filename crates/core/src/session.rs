//! Per-game session state machine shared by the three mini-games.
//!
//! The session never sleeps. Whenever it wants time to pass (countdown ticks,
//! the pause after an answer) it exposes a [`TimerRequest`] through
//! [`Session::pending_timer`]. The caller waits and hands the request's token
//! back to [`Session::fire`]. Tokens carry the [`Epoch`] they were issued
//! under, and every state change bumps the epoch, so a late timer from a reset
//! or superseded phase is reported as [`TimerOutcome::Stale`] and changes
//! nothing.

use std::time::Duration;

use rand::Rng;

use crate::evaluator::{AnswerError, evaluate};
use crate::generator;
use crate::model::{Answer, GameKind, Level, Round};

/// Incorrect answers that end a session.
pub const WRONG_LIMIT: u32 = 3;
/// Countdown ticks before the first round.
pub const COUNTDOWN_TICKS: u8 = 3;
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
/// Pause after an answer so the player can see whether it was right.
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1000);

//
// ─── TIMERS ────────────────────────────────────────────────────────────────────
//

/// Generation counter; bumped on every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Epoch(u64);

impl Epoch {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    CountdownTick,
    NextRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    epoch: Epoch,
    kind: TimerKind,
}

impl TimerToken {
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

/// A wait the session needs before it can move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub token: TimerToken,
    pub delay: Duration,
}

//
// ─── PHASES & OUTCOMES ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Countdown { remaining: u8 },
    Playing,
    /// Answer judged; the next round follows after `FEEDBACK_DELAY`.
    Feedback { correct: bool },
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The token belongs to an earlier epoch or another phase.
    Stale,
    CountdownTick { remaining: u8 },
    /// A new round is on screen.
    RoundStarted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoredAnswer {
    /// No round is waiting for input.
    NotPlaying,
    Malformed(AnswerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Ignored(IgnoredAnswer),
    Continue { correct: bool },
    GameOver { correct: bool, final_score: u32 },
}

/// Read-only view handed to presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub game: GameKind,
    pub level: Level,
    pub score: u32,
    pub wrong_count: u32,
    pub wrong_limit: u32,
    pub questions_answered: u32,
    pub phase: SessionPhase,
    pub round: Option<Round>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of a mini-game, from countdown to game over.
#[derive(Debug, Clone)]
pub struct Session {
    game: GameKind,
    level: Level,
    highest_level: Level,
    score: u32,
    wrong_count: u32,
    questions_answered: u32,
    phase: SessionPhase,
    round: Option<Round>,
    epoch: Epoch,
}

impl Session {
    /// Create a session in its countdown phase.
    #[must_use]
    pub fn new(game: GameKind) -> Self {
        Self {
            game,
            level: Level::ONE,
            highest_level: Level::ONE,
            score: 0,
            wrong_count: 0,
            questions_answered: 0,
            phase: SessionPhase::Countdown {
                remaining: COUNTDOWN_TICKS,
            },
            round: None,
            epoch: Epoch::default(),
        }
    }

    #[must_use]
    pub fn game(&self) -> GameKind {
        self.game
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Highest level a round was actually played at.
    ///
    /// Lags `level` after the answer that crosses a threshold until the next
    /// round starts.
    #[must_use]
    pub fn highest_level(&self) -> Level {
        self.highest_level
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            game: self.game,
            level: self.level,
            score: self.score,
            wrong_count: self.wrong_count,
            wrong_limit: WRONG_LIMIT,
            questions_answered: self.questions_answered,
            phase: self.phase,
            round: self.round.clone(),
        }
    }

    /// The wait the current phase is blocked on, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerRequest> {
        let (kind, delay) = match self.phase {
            SessionPhase::Countdown { .. } => (TimerKind::CountdownTick, COUNTDOWN_TICK),
            SessionPhase::Feedback { .. } => (TimerKind::NextRound, FEEDBACK_DELAY),
            SessionPhase::Playing | SessionPhase::GameOver => return None,
        };
        Some(TimerRequest {
            token: TimerToken {
                epoch: self.epoch,
                kind,
            },
            delay,
        })
    }

    /// Apply an elapsed timer.
    pub fn fire<R: Rng + ?Sized>(&mut self, token: TimerToken, rng: &mut R) -> TimerOutcome {
        if token.epoch != self.epoch {
            return TimerOutcome::Stale;
        }

        match (self.phase, token.kind) {
            (SessionPhase::Countdown { remaining }, TimerKind::CountdownTick) => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.start_round(rng);
                    TimerOutcome::RoundStarted
                } else {
                    self.enter(SessionPhase::Countdown { remaining });
                    TimerOutcome::CountdownTick { remaining }
                }
            }
            (SessionPhase::Feedback { .. }, TimerKind::NextRound) => {
                self.start_round(rng);
                TimerOutcome::RoundStarted
            }
            _ => TimerOutcome::Stale,
        }
    }

    /// Judge an answer for the round on screen and update the tallies.
    pub fn submit_answer(&mut self, answer: &Answer) -> AnswerOutcome {
        if self.phase != SessionPhase::Playing {
            return AnswerOutcome::Ignored(IgnoredAnswer::NotPlaying);
        }
        let Some(round) = self.round.as_ref() else {
            return AnswerOutcome::Ignored(IgnoredAnswer::NotPlaying);
        };
        let correct = match evaluate(round, answer) {
            Ok(correct) => correct,
            Err(err) => return AnswerOutcome::Ignored(IgnoredAnswer::Malformed(err)),
        };

        self.questions_answered = self.questions_answered.saturating_add(1);
        if correct {
            self.score = self.score.saturating_add(1);
        } else {
            self.wrong_count = self.wrong_count.saturating_add(1);
        }
        self.level = Level::for_questions_answered(self.questions_answered);

        if self.wrong_count >= WRONG_LIMIT {
            self.enter(SessionPhase::GameOver);
            AnswerOutcome::GameOver {
                correct,
                final_score: self.score,
            }
        } else {
            self.enter(SessionPhase::Feedback { correct });
            AnswerOutcome::Continue { correct }
        }
    }

    /// Clear all tallies and go back to the countdown.
    pub fn reset(&mut self) {
        self.level = Level::ONE;
        self.highest_level = Level::ONE;
        self.score = 0;
        self.wrong_count = 0;
        self.questions_answered = 0;
        self.round = None;
        self.enter(SessionPhase::Countdown {
            remaining: COUNTDOWN_TICKS,
        });
    }

    /// Invalidate every outstanding timer token without changing the phase.
    pub fn invalidate_timers(&mut self) {
        self.epoch = self.epoch.next();
    }

    fn start_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.round = Some(generator::generate(self.game, self.level, rng));
        self.highest_level = self.highest_level.max(self.level);
        self.enter(SessionPhase::Playing);
    }

    fn enter(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.epoch = self.epoch.next();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ComparisonRound, CompositionOption, CompositionRound, LEVEL_TWO_THRESHOLD, Relation, Side,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    fn run_countdown(session: &mut Session, rng: &mut StdRng) {
        while let SessionPhase::Countdown { .. } = session.phase() {
            let timer = session.pending_timer().unwrap();
            session.fire(timer.token, rng);
        }
    }

    fn advance_feedback(session: &mut Session, rng: &mut StdRng) {
        let timer = session.pending_timer().unwrap();
        assert_eq!(timer.token.kind(), TimerKind::NextRound);
        assert_eq!(session.fire(timer.token, rng), TimerOutcome::RoundStarted);
    }

    fn wrong_answer(session: &Session) -> Answer {
        match session.round().unwrap() {
            Round::Comparison(round) => Answer::Side(match round.winning_side() {
                Side::Left => Side::Right,
                Side::Right => Side::Left,
            }),
            Round::Composition(round) => {
                let correct = round.correct_index().unwrap();
                Answer::Choice(1 - correct)
            }
            Round::Ordering(round) => {
                let mut order = round.solution();
                order.reverse();
                Answer::Order(order)
            }
        }
    }

    fn right_answer(session: &Session) -> Answer {
        match session.round().unwrap() {
            Round::Comparison(round) => Answer::Side(round.winning_side()),
            Round::Composition(round) => Answer::Choice(round.correct_index().unwrap()),
            Round::Ordering(round) => Answer::Order(round.solution()),
        }
    }

    #[test]
    fn countdown_takes_three_ticks() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Comparison);
        assert_eq!(session.phase(), SessionPhase::Countdown { remaining: 3 });

        let t1 = session.pending_timer().unwrap();
        assert_eq!(t1.delay, COUNTDOWN_TICK);
        assert_eq!(
            session.fire(t1.token, &mut rng),
            TimerOutcome::CountdownTick { remaining: 2 }
        );
        let t2 = session.pending_timer().unwrap();
        assert_eq!(
            session.fire(t2.token, &mut rng),
            TimerOutcome::CountdownTick { remaining: 1 }
        );
        assert!(session.round().is_none());
        let t3 = session.pending_timer().unwrap();
        assert_eq!(session.fire(t3.token, &mut rng), TimerOutcome::RoundStarted);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert!(session.round().is_some());
        assert!(session.pending_timer().is_none());
    }

    #[test]
    fn consumed_token_cannot_fire_twice() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Ordering);
        let timer = session.pending_timer().unwrap();
        session.fire(timer.token, &mut rng);
        assert_eq!(session.fire(timer.token, &mut rng), TimerOutcome::Stale);
        assert_eq!(session.phase(), SessionPhase::Countdown { remaining: 2 });
    }

    #[test]
    fn correct_comparison_answer_scores() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Comparison);
        run_countdown(&mut session, &mut rng);
        session.round = Some(Round::Comparison(ComparisonRound {
            left: 4,
            right: 7,
            relation: Relation::Greater,
        }));

        let outcome = session.submit_answer(&Answer::Side(Side::Right));
        assert_eq!(outcome, AnswerOutcome::Continue { correct: true });
        assert_eq!(session.score(), 1);
        assert_eq!(session.questions_answered(), 1);
        assert_eq!(session.wrong_count(), 0);
        assert_eq!(session.phase(), SessionPhase::Feedback { correct: true });
    }

    #[test]
    fn wrong_composition_answer_counts_against_player() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Composition);
        run_countdown(&mut session, &mut rng);
        session.round = Some(Round::Composition(CompositionRound {
            target: 8,
            options: vec![
                CompositionOption {
                    first: 3,
                    second: 5,
                    is_correct: true,
                },
                CompositionOption {
                    first: 2,
                    second: 9,
                    is_correct: false,
                },
            ],
        }));

        let outcome = session.submit_answer(&Answer::Choice(1));
        assert_eq!(outcome, AnswerOutcome::Continue { correct: false });
        assert_eq!(session.wrong_count(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.questions_answered(), 1);
    }

    #[test]
    fn three_wrong_answers_end_the_session() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Ordering);
        run_countdown(&mut session, &mut rng);

        for attempt in 1..=WRONG_LIMIT {
            let answer = wrong_answer(&session);
            let outcome = session.submit_answer(&answer);
            if attempt < WRONG_LIMIT {
                assert_eq!(outcome, AnswerOutcome::Continue { correct: false });
                advance_feedback(&mut session, &mut rng);
            } else {
                assert_eq!(
                    outcome,
                    AnswerOutcome::GameOver {
                        correct: false,
                        final_score: 0
                    }
                );
            }
        }
        assert!(session.is_over());
        assert_eq!(session.wrong_count(), WRONG_LIMIT);
        assert!(session.pending_timer().is_none());
    }

    #[test]
    fn answers_outside_playing_are_ignored() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Comparison);
        assert_eq!(
            session.submit_answer(&Answer::Side(Side::Left)),
            AnswerOutcome::Ignored(IgnoredAnswer::NotPlaying)
        );

        run_countdown(&mut session, &mut rng);
        let answer = right_answer(&session);
        session.submit_answer(&answer);
        // still showing feedback
        assert_eq!(
            session.submit_answer(&answer),
            AnswerOutcome::Ignored(IgnoredAnswer::NotPlaying)
        );
        assert_eq!(session.questions_answered(), 1);
    }

    #[test]
    fn malformed_answer_is_a_no_op() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Composition);
        run_countdown(&mut session, &mut rng);
        let epoch = session.epoch();

        let outcome = session.submit_answer(&Answer::Choice(42));
        assert!(matches!(
            outcome,
            AnswerOutcome::Ignored(IgnoredAnswer::Malformed(AnswerError::NoSuchOption { .. }))
        ));
        assert_eq!(session.questions_answered(), 0);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.epoch(), epoch);
    }

    #[test]
    fn level_follows_answer_count() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Comparison);
        run_countdown(&mut session, &mut rng);

        for answered in 1..=25 {
            let answer = right_answer(&session);
            session.submit_answer(&answer);
            assert_eq!(session.level(), Level::for_questions_answered(answered));
            advance_feedback(&mut session, &mut rng);
        }
        assert_eq!(session.level(), Level::THREE);
        assert_eq!(session.score(), 25);
    }

    #[test]
    fn highest_level_only_counts_rounds_played() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Comparison);
        run_countdown(&mut session, &mut rng);

        for _ in 0..7 {
            let answer = right_answer(&session);
            session.submit_answer(&answer);
            advance_feedback(&mut session, &mut rng);
        }
        for attempt in 1..=WRONG_LIMIT {
            let answer = wrong_answer(&session);
            let outcome = session.submit_answer(&answer);
            if attempt < WRONG_LIMIT {
                advance_feedback(&mut session, &mut rng);
            } else {
                assert!(matches!(outcome, AnswerOutcome::GameOver { .. }));
            }
        }

        // The tenth answer crosses into level 2, but no round follows it.
        assert_eq!(session.questions_answered(), LEVEL_TWO_THRESHOLD);
        assert_eq!(session.level(), Level::TWO);
        assert_eq!(session.highest_level(), Level::ONE);
    }

    #[test]
    fn highest_level_rises_with_the_next_round() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Ordering);
        run_countdown(&mut session, &mut rng);

        for _ in 0..LEVEL_TWO_THRESHOLD {
            let answer = right_answer(&session);
            session.submit_answer(&answer);
            assert_eq!(session.highest_level(), Level::ONE);
            advance_feedback(&mut session, &mut rng);
        }
        assert_eq!(session.highest_level(), Level::TWO);

        session.reset();
        assert_eq!(session.highest_level(), Level::ONE);
    }

    #[test]
    fn questions_answered_counts_every_accepted_answer() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Composition);
        run_countdown(&mut session, &mut rng);

        let plan = [true, false, true, true, false];
        for (index, correct) in plan.iter().enumerate() {
            let answer = if *correct {
                right_answer(&session)
            } else {
                wrong_answer(&session)
            };
            session.submit_answer(&answer);
            assert_eq!(session.questions_answered(), index as u32 + 1);
            advance_feedback(&mut session, &mut rng);
        }
        assert_eq!(session.score(), 3);
        assert_eq!(session.wrong_count(), 2);
    }

    #[test]
    fn reset_invalidates_pending_timers() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Comparison);
        run_countdown(&mut session, &mut rng);
        let answer = wrong_answer(&session);
        session.submit_answer(&answer);
        let stale = session.pending_timer().unwrap();

        session.reset();
        assert_eq!(session.fire(stale.token, &mut rng), TimerOutcome::Stale);
        assert_eq!(session.phase(), SessionPhase::Countdown { remaining: 3 });
        assert_eq!(session.wrong_count(), 0);
        assert_eq!(session.questions_answered(), 0);
        assert!(session.round().is_none());
    }

    #[test]
    fn invalidate_timers_keeps_phase() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Ordering);
        let timer = session.pending_timer().unwrap();
        session.invalidate_timers();
        assert_eq!(session.fire(timer.token, &mut rng), TimerOutcome::Stale);
        assert_eq!(session.phase(), SessionPhase::Countdown { remaining: 3 });
    }

    #[test]
    fn game_over_can_be_reset() {
        let mut rng = rng();
        let mut session = Session::new(GameKind::Comparison);
        run_countdown(&mut session, &mut rng);
        for _ in 0..WRONG_LIMIT {
            let answer = wrong_answer(&session);
            if let AnswerOutcome::Continue { .. } = session.submit_answer(&answer) {
                advance_feedback(&mut session, &mut rng);
            }
        }
        assert!(session.is_over());

        session.reset();
        assert!(!session.is_over());
        assert!(session.pending_timer().is_some());
    }
}
