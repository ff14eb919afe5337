use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::GameKind;

pub const MAX_PLAYER_NAME_CHARS: usize = 40;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerNameError {
    #[error("player name is too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },
}

/// Best score per game module, as persisted under the `progressScore` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBoard {
    pub comparison: u32,
    pub ordering: u32,
    pub composition: u32,
}

impl ScoreBoard {
    #[must_use]
    pub fn get(&self, game: GameKind) -> u32 {
        match game {
            GameKind::Comparison => self.comparison,
            GameKind::Ordering => self.ordering,
            GameKind::Composition => self.composition,
        }
    }

    pub fn set(&mut self, game: GameKind, value: u32) {
        match game {
            GameKind::Comparison => self.comparison = value,
            GameKind::Ordering => self.ordering = value,
            GameKind::Composition => self.composition = value,
        }
    }

    /// Keep the larger of the stored and the new score. Returns true if it changed.
    pub fn record_best(&mut self, game: GameKind, score: u32) -> bool {
        let current = self.get(game);
        if score > current {
            self.set(game, score);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.comparison
            .saturating_add(self.ordering)
            .saturating_add(self.composition)
    }
}

/// Everything the app remembers about the player between launches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProgress {
    player_name: String,
    scores: ScoreBoard,
    sound_enabled: bool,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            scores: ScoreBoard::default(),
            sound_enabled: true,
        }
    }
}

impl PlayerProgress {
    #[must_use]
    pub fn new(player_name: String, scores: ScoreBoard, sound_enabled: bool) -> Self {
        Self {
            player_name,
            scores,
            sound_enabled,
        }
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn scores(&self) -> ScoreBoard {
        self.scores
    }

    #[must_use]
    pub fn best_score(&self, game: GameKind) -> u32 {
        self.scores.get(game)
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn greeting(&self) -> String {
        if self.player_name.is_empty() {
            "Hello, Explorer!".to_string()
        } else {
            format!("Hello, {}!", self.player_name)
        }
    }

    /// # Errors
    ///
    /// Returns `PlayerNameError::TooLong` if the trimmed name exceeds the limit.
    pub fn set_player_name(&mut self, name: &str) -> Result<(), PlayerNameError> {
        self.player_name = normalize_player_name(name)?;
        Ok(())
    }

    pub fn set_score(&mut self, game: GameKind, value: u32) {
        self.scores.set(game, value);
    }

    pub fn record_best(&mut self, game: GameKind, score: u32) -> bool {
        self.scores.record_best(game, score)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }
}

/// Trim surrounding whitespace and enforce the length limit.
///
/// # Errors
///
/// Returns `PlayerNameError::TooLong` if the trimmed name exceeds the limit.
pub fn normalize_player_name(raw: &str) -> Result<String, PlayerNameError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len > MAX_PLAYER_NAME_CHARS {
        return Err(PlayerNameError::TooLong {
            len,
            max: MAX_PLAYER_NAME_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
