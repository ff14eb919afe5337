use std::sync::Arc;

use explorers_core::model::{GameKind, PlayerProgress, ScoreBoard, normalize_player_name};
use storage::repository::KeyValueRepository;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ProgressServiceError;

pub const PLAYER_NAME_KEY: &str = "playerName";
pub const PROGRESS_SCORE_KEY: &str = "progressScore";
pub const SOUND_ENABLED_KEY: &str = "soundEnabled";

/// Result of offering a finished game's score to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestScoreUpdate {
    pub game: GameKind,
    pub score: u32,
    pub best: u32,
    pub is_new_best: bool,
}

/// Process-wide player progress, loaded once and saved on every change.
///
/// Shared by reference (`Arc<ProgressService>`) with every consumer.
pub struct ProgressService {
    repo: Arc<dyn KeyValueRepository>,
    current: Mutex<PlayerProgress>,
}

impl ProgressService {
    #[must_use]
    pub fn new(repo: Arc<dyn KeyValueRepository>) -> Self {
        Self {
            repo,
            current: Mutex::new(PlayerProgress::default()),
        }
    }

    /// Read persisted progress into memory.
    ///
    /// Missing, unreadable or malformed values fall back to defaults.
    pub async fn load(&self) -> PlayerProgress {
        let player_name = self
            .read(PLAYER_NAME_KEY)
            .await
            .and_then(|raw| match normalize_player_name(&raw) {
                Ok(name) => Some(name),
                Err(err) => {
                    warn!(key = PLAYER_NAME_KEY, error = %err, "ignoring stored player name");
                    None
                }
            })
            .unwrap_or_default();

        let scores = self
            .read(PROGRESS_SCORE_KEY)
            .await
            .and_then(|raw| decode_scores(&raw))
            .unwrap_or_default();

        let sound_enabled = self
            .read(SOUND_ENABLED_KEY)
            .await
            .and_then(|raw| decode_flag(&raw))
            .unwrap_or(true);

        let progress = PlayerProgress::new(player_name, scores, sound_enabled);
        debug!(total = scores.total(), "loaded player progress");
        *self.current.lock().await = progress.clone();
        progress
    }

    /// In-memory view of the current progress.
    pub async fn current(&self) -> PlayerProgress {
        self.current.lock().await.clone()
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the name is invalid or cannot be stored.
    pub async fn set_player_name(
        &self,
        name: &str,
    ) -> Result<PlayerProgress, ProgressServiceError> {
        let mut current = self.current.lock().await;
        let mut next = current.clone();
        next.set_player_name(name)?;
        self.repo
            .set_value(PLAYER_NAME_KEY, next.player_name())
            .await?;
        *current = next.clone();
        Ok(next)
    }

    /// Overwrite one module's best score, usually with 0.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the scores cannot be stored.
    pub async fn reset_progress_score(
        &self,
        game: GameKind,
        value: u32,
    ) -> Result<PlayerProgress, ProgressServiceError> {
        let mut current = self.current.lock().await;
        let mut next = current.clone();
        next.set_score(game, value);
        self.write_scores(next.scores()).await?;
        info!(%game, value, "progress score reset");
        *current = next.clone();
        Ok(next)
    }

    /// Zero every module's best score.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the scores cannot be stored.
    pub async fn reset_all_progress(&self) -> Result<PlayerProgress, ProgressServiceError> {
        let mut current = self.current.lock().await;
        let mut next = current.clone();
        for game in GameKind::ALL {
            next.set_score(game, 0);
        }
        self.write_scores(next.scores()).await?;
        info!("all progress reset");
        *current = next.clone();
        Ok(next)
    }

    /// Keep the larger of the stored best and `score`; writes only on change.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if a new best cannot be stored.
    pub async fn record_best_score(
        &self,
        game: GameKind,
        score: u32,
    ) -> Result<BestScoreUpdate, ProgressServiceError> {
        let mut current = self.current.lock().await;
        let mut next = current.clone();
        let is_new_best = next.record_best(game, score);
        if is_new_best {
            self.write_scores(next.scores()).await?;
            info!(%game, score, "new best score");
        }
        let best = next.best_score(game);
        *current = next;
        Ok(BestScoreUpdate {
            game,
            score,
            best,
            is_new_best,
        })
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the flag cannot be stored.
    pub async fn set_sound_enabled(
        &self,
        enabled: bool,
    ) -> Result<PlayerProgress, ProgressServiceError> {
        let mut current = self.current.lock().await;
        let mut next = current.clone();
        next.set_sound_enabled(enabled);
        self.repo
            .set_value(SOUND_ENABLED_KEY, if enabled { "true" } else { "false" })
            .await?;
        *current = next.clone();
        Ok(next)
    }

    async fn write_scores(&self, scores: ScoreBoard) -> Result<(), ProgressServiceError> {
        let encoded = serde_json::to_string(&scores)?;
        self.repo.set_value(PROGRESS_SCORE_KEY, &encoded).await?;
        Ok(())
    }

    async fn read(&self, key: &'static str) -> Option<String> {
        match self.repo.get_value(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to read stored value, using default");
                None
            }
        }
    }
}

fn decode_scores(raw: &str) -> Option<ScoreBoard> {
    match serde_json::from_str::<ScoreBoard>(raw) {
        Ok(scores) => Some(scores),
        Err(err) => {
            warn!(key = PROGRESS_SCORE_KEY, error = %err, "malformed stored scores, using default");
            None
        }
    }
}

fn decode_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            warn!(key = SOUND_ENABLED_KEY, value = other, "malformed stored flag, using default");
            None
        }
    }
}
