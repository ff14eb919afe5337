use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{GameKind, Level};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("questions answered ({answered}) does not match score + wrong ({sum})")]
    CountMismatch { answered: u32, sum: u32 },
}

/// Record of one finished play-through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    game: GameKind,
    score: u32,
    wrong_count: u32,
    questions_answered: u32,
    highest_level: Level,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl GameSummary {
    /// Build or rehydrate a summary.
    ///
    /// # Errors
    ///
    /// Returns `GameSummaryError::InvalidTimeRange` if `completed_at` precedes
    /// `started_at`, or `GameSummaryError::CountMismatch` if the tallies disagree.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        game: GameKind,
        score: u32,
        wrong_count: u32,
        questions_answered: u32,
        highest_level: Level,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, GameSummaryError> {
        if completed_at < started_at {
            return Err(GameSummaryError::InvalidTimeRange);
        }
        let sum = score.saturating_add(wrong_count);
        if sum != questions_answered {
            return Err(GameSummaryError::CountMismatch {
                answered: questions_answered,
                sum,
            });
        }

        Ok(Self {
            game,
            score,
            wrong_count,
            questions_answered,
            highest_level,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn game(&self) -> GameKind {
        self.game
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
    pub fn highest_level(&self) -> Level {
        self.highest_level
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn summary_requires_consistent_tallies() {
        let now = fixed_now();
        let ok = GameSummary::new(GameKind::Comparison, 5, 3, 8, Level::ONE, now, now).unwrap();
        assert_eq!(ok.questions_answered(), 8);

        let err =
            GameSummary::new(GameKind::Comparison, 5, 3, 9, Level::ONE, now, now).unwrap_err();
        assert_eq!(err, GameSummaryError::CountMismatch { answered: 9, sum: 8 });
    }

    #[test]
    fn summary_rejects_reversed_times() {
        let now = fixed_now();
        let earlier = now - chrono::Duration::seconds(1);
        let err =
            GameSummary::new(GameKind::Ordering, 0, 3, 3, Level::ONE, now, earlier).unwrap_err();
        assert_eq!(err, GameSummaryError::InvalidTimeRange);
    }
}
