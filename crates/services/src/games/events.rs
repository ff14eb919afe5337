use explorers_core::model::GameKind;
use explorers_core::session::SessionSnapshot;

use crate::history_service::GameSummaryId;

/// Everything a front-end needs to redraw after the runner moves on.
///
/// Events arrive in the order the session produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// One countdown tick elapsed; `remaining` ticks are left before play.
    Countdown { remaining: u8 },
    /// A fresh round is waiting for an answer.
    RoundStarted(SessionSnapshot),
    /// An answer was judged. `sound` mirrors the player's sound preference.
    AnswerJudged {
        correct: bool,
        sound: bool,
        snapshot: SessionSnapshot,
    },
    /// The wrong-answer limit was reached and the result has been saved.
    GameOver(GameOverReport),
}

/// Final tallies of a session plus what was persisted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverReport {
    pub game: GameKind,
    pub final_score: u32,
    /// Best score after this game, or the previous best if saving failed.
    pub best_score: u32,
    pub is_new_best: bool,
    /// `None` when the summary could not be written.
    pub summary_id: Option<GameSummaryId>,
}
