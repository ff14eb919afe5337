use std::sync::Arc;

use async_trait::async_trait;
use explorers_core::model::{GameKind, ScoreBoard};
use services::progress_service::{PLAYER_NAME_KEY, PROGRESS_SCORE_KEY, SOUND_ENABLED_KEY};
use services::{ProgressService, ProgressServiceError};
use storage::repository::{InMemoryRepository, KeyValueRepository, StorageError};

/// Reads succeed with nothing stored; every write fails.
struct ReadOnlyRepository;

#[async_trait]
impl KeyValueRepository for ReadOnlyRepository {
    async fn get_value(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn set_value(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }

    async fn remove_value(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }
}

/// Every read fails.
struct BrokenRepository;

#[async_trait]
impl KeyValueRepository for BrokenRepository {
    async fn get_value(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("disk gone".into()))
    }

    async fn set_value(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    async fn remove_value(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test]
async fn empty_store_loads_defaults() {
    let service = ProgressService::new(Arc::new(InMemoryRepository::new()));
    let progress = service.load().await;

    assert_eq!(progress.player_name(), "");
    assert_eq!(progress.scores(), ScoreBoard::default());
    assert!(progress.sound_enabled());
    assert_eq!(progress.greeting(), "Hello, Explorer!");
}

#[tokio::test]
async fn changes_survive_a_reload() {
    let repo = Arc::new(InMemoryRepository::new());
    let service = ProgressService::new(repo.clone());
    service.load().await;

    service.set_player_name("  Mia ").await.unwrap();
    service.record_best_score(GameKind::Comparison, 8).await.unwrap();
    service.set_sound_enabled(false).await.unwrap();

    let reloaded = ProgressService::new(repo.clone());
    let progress = reloaded.load().await;
    assert_eq!(progress.player_name(), "Mia");
    assert_eq!(progress.best_score(GameKind::Comparison), 8);
    assert!(!progress.sound_enabled());

    let raw = repo.get_value(PROGRESS_SCORE_KEY).await.unwrap().unwrap();
    let stored: ScoreBoard = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.comparison, 8);
}

#[tokio::test]
async fn best_score_only_grows_and_writes_on_change() {
    let repo = Arc::new(InMemoryRepository::new());
    let service = ProgressService::new(repo.clone());
    service.load().await;

    let first = service.record_best_score(GameKind::Ordering, 6).await.unwrap();
    assert!(first.is_new_best);
    assert_eq!(first.best, 6);

    repo.remove_value(PROGRESS_SCORE_KEY).await.unwrap();
    let lower = service.record_best_score(GameKind::Ordering, 2).await.unwrap();
    assert!(!lower.is_new_best);
    assert_eq!(lower.best, 6);
    assert_eq!(repo.get_value(PROGRESS_SCORE_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn resets_zero_scores() {
    let service = ProgressService::new(Arc::new(InMemoryRepository::new()));
    service.load().await;
    service.record_best_score(GameKind::Comparison, 4).await.unwrap();
    service.record_best_score(GameKind::Composition, 9).await.unwrap();

    let progress = service
        .reset_progress_score(GameKind::Comparison, 0)
        .await
        .unwrap();
    assert_eq!(progress.best_score(GameKind::Comparison), 0);
    assert_eq!(progress.best_score(GameKind::Composition), 9);

    let progress = service.reset_all_progress().await.unwrap();
    assert_eq!(progress.scores().total(), 0);
}

#[tokio::test]
async fn malformed_values_fall_back_to_defaults() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.set_value(PLAYER_NAME_KEY, "Leo").await.unwrap();
    repo.set_value(PROGRESS_SCORE_KEY, "{not json").await.unwrap();
    repo.set_value(SOUND_ENABLED_KEY, "maybe").await.unwrap();

    let progress = ProgressService::new(repo).load().await;
    assert_eq!(progress.player_name(), "Leo");
    assert_eq!(progress.scores(), ScoreBoard::default());
    assert!(progress.sound_enabled());
}

#[tokio::test]
async fn unreadable_store_loads_defaults() {
    let progress = ProgressService::new(Arc::new(BrokenRepository)).load().await;
    assert_eq!(progress.player_name(), "");
    assert_eq!(progress.scores().total(), 0);
}

#[tokio::test]
async fn failed_write_leaves_memory_untouched() {
    let service = ProgressService::new(Arc::new(ReadOnlyRepository));
    service.load().await;

    let err = service
        .record_best_score(GameKind::Composition, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressServiceError::Storage(_)));
    assert_eq!(service.current().await.best_score(GameKind::Composition), 0);

    let err = service.set_player_name("Ada").await.unwrap_err();
    assert!(matches!(err, ProgressServiceError::Storage(_)));
    assert_eq!(service.current().await.player_name(), "");
}

#[tokio::test]
async fn invalid_names_are_rejected_before_writing() {
    let service = ProgressService::new(Arc::new(ReadOnlyRepository));
    let err = service.set_player_name(&"x".repeat(41)).await.unwrap_err();
    assert!(matches!(err, ProgressServiceError::PlayerName(_)));
}
