use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use explorers_core::model::{Answer, GameKind, Level};
use explorers_core::session::{
    AnswerOutcome, COUNTDOWN_TICKS, IgnoredAnswer, Session, SessionSnapshot, TimerOutcome,
    TimerToken,
};
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::events::{GameEvent, GameOverReport};
use crate::Clock;
use crate::history_service::HistoryService;
use crate::progress_service::ProgressService;

/// Receiving half of a runner's event stream.
pub type GameEvents = mpsc::UnboundedReceiver<GameEvent>;

/// Drives one [`Session`] in real time.
///
/// The runner owns the only pending timer task. Resetting, exiting or
/// dropping the runner aborts that task and bumps the session epoch, so a
/// timer that already woke up finds its token stale and changes nothing.
pub struct GameRunner {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<RunnerState>,
    events: mpsc::UnboundedSender<GameEvent>,
    progress: Arc<ProgressService>,
    history: Arc<HistoryService>,
    clock: Clock,
}

struct RunnerState {
    session: Session,
    rng: StdRng,
    started_at: DateTime<Utc>,
    timer: Option<JoinHandle<()>>,
    closed: bool,
}

/// Tallies captured at game over, persisted once the state lock is released.
struct FinishedGame {
    game: GameKind,
    final_score: u32,
    wrong_count: u32,
    highest_level: Level,
    started_at: DateTime<Utc>,
    epoch: u64,
}

impl GameRunner {
    /// Start a session in its countdown and arm the first tick.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        game: GameKind,
        rng: StdRng,
        clock: Clock,
        progress: Arc<ProgressService>,
        history: Arc<HistoryService>,
    ) -> (Self, GameEvents) {
        let (events, receiver) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            state: Mutex::new(RunnerState {
                session: Session::new(game),
                rng,
                started_at: clock.now(),
                timer: None,
                closed: false,
            }),
            events,
            progress,
            history,
            clock,
        });

        {
            let mut state = inner.lock_state();
            inner.emit(GameEvent::Countdown {
                remaining: COUNTDOWN_TICKS,
            });
            arm(&inner, &mut state);
        }
        info!(%game, "game started");

        (Self { inner }, receiver)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock_state().session.snapshot()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock_state().closed
    }

    /// Judge an answer for the round on screen.
    ///
    /// On the final wrong answer the best score and a game summary are saved
    /// before [`GameEvent::GameOver`] is sent. Storage failures are logged and
    /// do not change the returned outcome.
    pub async fn answer(&self, answer: &Answer) -> AnswerOutcome {
        // Read before locking; the preference can change between answers.
        let sound = self.inner.progress.current().await.sound_enabled();
        let (outcome, finished) = {
            let mut guard = self.inner.lock_state();
            if guard.closed {
                return AnswerOutcome::Ignored(IgnoredAnswer::NotPlaying);
            }
            let state = &mut *guard;
            let outcome = state.session.submit_answer(answer);
            let finished = match outcome {
                AnswerOutcome::Ignored(_) => {
                    debug!(?outcome, "answer ignored");
                    return outcome;
                }
                AnswerOutcome::Continue { correct } => {
                    cancel_timer(state);
                    self.inner.emit_judged(correct, sound, &state.session);
                    arm(&self.inner, state);
                    None
                }
                AnswerOutcome::GameOver {
                    correct,
                    final_score,
                } => {
                    cancel_timer(state);
                    self.inner.emit_judged(correct, sound, &state.session);
                    Some(FinishedGame {
                        game: state.session.game(),
                        final_score,
                        wrong_count: state.session.wrong_count(),
                        highest_level: state.session.highest_level(),
                        started_at: state.started_at,
                        epoch: state.session.epoch().value(),
                    })
                }
            };
            (outcome, finished)
        };

        if let Some(finished) = finished {
            self.inner.finish(finished).await;
        }
        outcome
    }

    /// Throw the current play-through away and restart the countdown.
    pub fn reset(&self) {
        let mut guard = self.inner.lock_state();
        if guard.closed {
            return;
        }
        let state = &mut *guard;
        cancel_timer(state);
        state.session.reset();
        state.started_at = self.inner.clock.now();
        debug!(game = %state.session.game(), "game reset");
        self.inner.emit(GameEvent::Countdown {
            remaining: COUNTDOWN_TICKS,
        });
        arm(&self.inner, state);
    }

    /// Stop the runner. Pending timers are cancelled and later calls are
    /// ignored. Nothing is saved for an unfinished game.
    pub fn exit(&self) {
        let mut guard = self.inner.lock_state();
        if guard.closed {
            return;
        }
        let state = &mut *guard;
        cancel_timer(state);
        state.session.invalidate_timers();
        state.closed = true;
        debug!(game = %state.session.game(), "game exited");
    }
}

impl Drop for GameRunner {
    fn drop(&mut self) {
        self.exit();
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, RunnerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: GameEvent) {
        if self.events.send(event).is_err() {
            debug!("game event receiver dropped");
        }
    }

    fn emit_judged(&self, correct: bool, sound: bool, session: &Session) {
        self.emit(GameEvent::AnswerJudged {
            correct,
            sound,
            snapshot: session.snapshot(),
        });
    }

    async fn finish(&self, finished: FinishedGame) {
        let FinishedGame {
            game,
            final_score,
            wrong_count,
            highest_level,
            started_at,
            epoch,
        } = finished;

        let (best_score, is_new_best) =
            match self.progress.record_best_score(game, final_score).await {
                Ok(update) => (update.best, update.is_new_best),
                Err(err) => {
                    warn!(%game, error = %err, "failed to save best score");
                    (self.progress.current().await.best_score(game), false)
                }
            };

        let summary_id = match self
            .history
            .record(game, final_score, wrong_count, highest_level, started_at)
            .await
        {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%game, error = %err, "failed to record game summary");
                None
            }
        };

        info!(%game, final_score, best_score, is_new_best, "game over");

        let state = self.lock_state();
        if state.closed || state.session.epoch().value() != epoch {
            debug!(%game, "session moved on before game over was reported");
            return;
        }
        self.emit(GameEvent::GameOver(GameOverReport {
            game,
            final_score,
            best_score,
            is_new_best,
            summary_id,
        }));
    }
}

fn cancel_timer(state: &mut RunnerState) {
    if let Some(handle) = state.timer.take() {
        handle.abort();
    }
}

/// Spawn the wait the session is blocked on, if any.
///
/// Replaces the stored handle without aborting it: when called from the
/// timer task itself that handle is the running task.
fn arm(inner: &Arc<Inner>, state: &mut RunnerState) {
    state.timer = state.session.pending_timer().map(|request| {
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            tokio::time::sleep(request.delay).await;
            fire_timer(&inner, request.token);
        })
    });
}

fn fire_timer(inner: &Arc<Inner>, token: TimerToken) {
    let mut guard = inner.lock_state();
    if guard.closed {
        return;
    }
    let state = &mut *guard;
    match state.session.fire(token, &mut state.rng) {
        TimerOutcome::Stale => {
            debug!(epoch = token.epoch().value(), "stale timer suppressed");
            return;
        }
        TimerOutcome::CountdownTick { remaining } => {
            inner.emit(GameEvent::Countdown { remaining });
        }
        TimerOutcome::RoundStarted => {
            inner.emit(GameEvent::RoundStarted(state.session.snapshot()));
        }
    }
    arm(inner, state);
}
