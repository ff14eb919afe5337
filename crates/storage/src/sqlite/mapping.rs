use explorers_core::model::{GameKind, GameSummary, Level};
use sqlx::Row;

use crate::repository::{GameSummaryRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn parse_game(s: &str) -> Result<GameKind, StorageError> {
    s.parse::<GameKind>().map_err(ser)
}

pub(crate) fn level_from_i64(v: i64) -> Result<Level, StorageError> {
    let raw = u8::try_from(v)
        .map_err(|_| StorageError::Serialization(format!("invalid level: {v}")))?;
    Level::new(raw).map_err(ser)
}

pub(crate) fn map_summary_row(row: &sqlx::sqlite::SqliteRow) -> Result<GameSummary, StorageError> {
    let game_str: String = row.try_get("game").map_err(ser)?;
    let game = parse_game(game_str.as_str())?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let wrong_count = u32_from_i64(
        "wrong_count",
        row.try_get::<i64, _>("wrong_count").map_err(ser)?,
    )?;
    let questions_answered = u32_from_i64(
        "questions_answered",
        row.try_get::<i64, _>("questions_answered").map_err(ser)?,
    )?;
    let highest_level = level_from_i64(row.try_get::<i64, _>("highest_level").map_err(ser)?)?;

    GameSummary::new(
        game,
        score,
        wrong_count,
        questions_answered,
        highest_level,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_summary_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<GameSummaryRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let summary = map_summary_row(row)?;
    Ok(GameSummaryRow::new(id, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_mapping_rejects_out_of_range() {
        assert_eq!(level_from_i64(2).unwrap(), Level::TWO);
        assert!(level_from_i64(0).is_err());
        assert!(level_from_i64(300).is_err());
    }

    #[test]
    fn game_mapping_uses_stable_keys() {
        for game in GameKind::ALL {
            assert_eq!(parse_game(game.as_str()).unwrap(), game);
        }
        assert!(parse_game("story").is_err());
    }
}
