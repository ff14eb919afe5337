use explorers_core::model::{GameKind, GameSummary};

use super::SqliteRepository;
use super::mapping::{map_summary_row, map_summary_row_with_id};
use crate::repository::{GameSummaryRepository, GameSummaryRow, StorageError};

#[async_trait::async_trait]
impl GameSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &GameSummary) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO game_summaries (
                    game, score, wrong_count, questions_answered,
                    highest_level, started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(summary.game().as_str())
        .bind(i64::from(summary.score()))
        .bind(i64::from(summary.wrong_count()))
        .bind(i64::from(summary.questions_answered()))
        .bind(i64::from(summary.highest_level().value()))
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_summary(&self, id: i64) -> Result<GameSummary, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    game, score, wrong_count, questions_answered,
                    highest_level, started_at, completed_at
                FROM game_summaries
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summaries(
        &self,
        game: Option<GameKind>,
        limit: u32,
    ) -> Result<Vec<GameSummaryRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, game, score, wrong_count, questions_answered,
                    highest_level, started_at, completed_at
                FROM game_summaries
                WHERE (?1 IS NULL OR game = ?1)
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(game.map(GameKind::as_str))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_summary_row_with_id).collect()
    }
}
