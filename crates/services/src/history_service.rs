use chrono::{DateTime, Utc};
use std::sync::Arc;

use explorers_core::model::{GameKind, GameSummary, Level};
use storage::repository::{GameSummaryRepository, GameSummaryRow, InMemoryRepository};
use tracing::debug;

use crate::Clock;
use crate::error::HistoryError;

/// Storage identifier for a recorded game.
pub type GameSummaryId = i64;

/// Presentation-agnostic list item for a finished game.
///
/// Timestamps stay raw; formatting is left to the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHistoryItem {
    pub id: GameSummaryId,
    pub game: GameKind,
    pub score: u32,
    pub wrong_count: u32,
    pub questions_answered: u32,
    pub highest_level: Level,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl GameHistoryItem {
    #[must_use]
    pub fn from_row(row: &GameSummaryRow) -> Self {
        let summary = &row.summary;
        Self {
            id: row.id,
            game: summary.game(),
            score: summary.score(),
            wrong_count: summary.wrong_count(),
            questions_answered: summary.questions_answered(),
            highest_level: summary.highest_level(),
            started_at: summary.started_at(),
            completed_at: summary.completed_at(),
        }
    }
}

/// Records finished games and lists them back, newest first.
///
/// Owns the time source so callers never stamp summaries themselves.
#[derive(Clone)]
pub struct HistoryService {
    clock: Clock,
    summaries: Arc<dyn GameSummaryRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(clock: Clock, summaries: Arc<dyn GameSummaryRepository>) -> Self {
        Self { clock, summaries }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(InMemoryRepository::new()))
    }

    /// Store a game that has just ended, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Summary` if the tallies are inconsistent, or
    /// `HistoryError::Storage` if the summary cannot be written.
    pub async fn record(
        &self,
        game: GameKind,
        score: u32,
        wrong_count: u32,
        highest_level: Level,
        started_at: DateTime<Utc>,
    ) -> Result<GameSummaryId, HistoryError> {
        let completed_at = self.clock.now().max(started_at);
        let summary = GameSummary::new(
            game,
            score,
            wrong_count,
            score.saturating_add(wrong_count),
            highest_level,
            started_at,
            completed_at,
        )?;
        let id = self.summaries.append_summary(&summary).await?;
        debug!(id, %game, score, "game summary recorded");
        Ok(id)
    }

    /// Most recent games first, optionally for a single game.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn recent(
        &self,
        game: Option<GameKind>,
        limit: u32,
    ) -> Result<Vec<GameHistoryItem>, HistoryError> {
        let rows = self.summaries.list_summaries(game, limit).await?;
        Ok(rows.iter().map(GameHistoryItem::from_row).collect())
    }

    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the summary is missing or unreadable.
    pub async fn get(&self, id: GameSummaryId) -> Result<GameSummary, HistoryError> {
        Ok(self.summaries.get_summary(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use explorers_core::time::{fixed_clock, fixed_now};
    use storage::repository::StorageError;

    #[tokio::test]
    async fn record_stamps_completion_with_clock() {
        let service = HistoryService::in_memory(fixed_clock());
        let started = fixed_now() - Duration::minutes(2);

        let id = service
            .record(GameKind::Composition, 7, 3, Level::ONE, started)
            .await
            .unwrap();

        let summary = service.get(id).await.unwrap();
        assert_eq!(summary.questions_answered(), 10);
        assert_eq!(summary.started_at(), started);
        assert_eq!(summary.completed_at(), fixed_now());
    }

    #[tokio::test]
    async fn recent_filters_by_game() {
        let service = HistoryService::in_memory(fixed_clock());
        let started = fixed_now();
        service
            .record(GameKind::Comparison, 1, 3, Level::ONE, started)
            .await
            .unwrap();
        service
            .record(GameKind::Ordering, 2, 3, Level::ONE, started)
            .await
            .unwrap();

        let all = service.recent(None, 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].game, GameKind::Ordering);

        let ordering = service.recent(Some(GameKind::Ordering), 10).await.unwrap();
        assert_eq!(ordering.len(), 1);
        assert_eq!(ordering[0].score, 2);
    }

    #[tokio::test]
    async fn missing_summary_is_a_storage_error() {
        let service = HistoryService::in_memory(fixed_clock());
        let err = service.get(99).await.unwrap_err();
        assert!(matches!(err, HistoryError::Storage(StorageError::NotFound)));
    }
}
