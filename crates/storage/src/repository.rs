use async_trait::async_trait;
use explorers_core::model::{GameKind, GameSummary};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted game summary together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummaryRow {
    pub id: i64,
    pub summary: GameSummary,
}

impl GameSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: GameSummary) -> Self {
        Self { id, summary }
    }
}

/// String-keyed value store, the on-device persistence the app reads at
/// startup and writes on every change.
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove_value(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait GameSummaryRepository: Send + Sync {
    /// Append a finished game and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &GameSummary) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_summary(&self, id: i64) -> Result<GameSummary, StorageError>;

    /// Most recent summaries first, optionally limited to one game.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summaries cannot be read.
    async fn list_summaries(
        &self,
        game: Option<GameKind>,
        limit: u32,
    ) -> Result<Vec<GameSummaryRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
    summaries: Arc<Mutex<BTreeMap<i64, GameSummary>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueRepository for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl GameSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &GameSummary) -> Result<i64, StorageError> {
        let mut guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard.keys().next_back().map_or(1, |last| last + 1);
        guard.insert(id, summary.clone());
        Ok(id)
    }

    async fn get_summary(&self, id: i64) -> Result<GameSummary, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_summaries(
        &self,
        game: Option<GameKind>,
        limit: u32,
    ) -> Result<Vec<GameSummaryRow>, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut rows: Vec<GameSummaryRow> = guard
            .iter()
            .filter(|(_, summary)| game.is_none_or(|game| summary.game() == game))
            .map(|(id, summary)| GameSummaryRow::new(*id, summary.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then_with(|| b.id.cmp(&a.id))
        });
        rows.truncate(limit);
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub values: Arc<dyn KeyValueRepository>,
    pub summaries: Arc<dyn GameSummaryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let values: Arc<dyn KeyValueRepository> = Arc::new(repo.clone());
        let summaries: Arc<dyn GameSummaryRepository> = Arc::new(repo);
        Self { values, summaries }
    }
}
