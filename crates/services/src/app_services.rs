use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use explorers_core::model::GameKind;
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::Storage;
use tracing::debug;

use crate::Clock;
use crate::error::AppServicesError;
use crate::games::{GameEvents, GameRunner};
use crate::history_service::HistoryService;
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one storage backend.
///
/// Progress is loaded once here; every consumer shares the same
/// `ProgressService`.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    seed: Option<u64>,
    games_started: Arc<AtomicU64>,
    progress: Arc<ProgressService>,
    history: Arc<HistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// With `seed` set, every game draws its rounds from a deterministic
    /// generator derived from the seed and the number of games started.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        seed: Option<u64>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, seed).await)
    }

    pub async fn in_memory(clock: Clock, seed: Option<u64>) -> Self {
        Self::from_storage(Storage::in_memory(), clock, seed).await
    }

    pub async fn from_storage(storage: Storage, clock: Clock, seed: Option<u64>) -> Self {
        let progress = Arc::new(ProgressService::new(Arc::clone(&storage.values)));
        progress.load().await;
        let history = Arc::new(HistoryService::new(clock, Arc::clone(&storage.summaries)));

        Self {
            clock,
            seed,
            games_started: Arc::new(AtomicU64::new(0)),
            progress,
            history,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    /// Start a game and return its runner with the event stream.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_game(&self, game: GameKind) -> (GameRunner, GameEvents) {
        GameRunner::start(
            game,
            self.next_rng(),
            self.clock,
            Arc::clone(&self.progress),
            Arc::clone(&self.history),
        )
    }

    fn next_rng(&self) -> StdRng {
        let index = self.games_started.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => {
                debug!(seed, index, "seeded round generator");
                StdRng::seed_from_u64(seed.wrapping_add(index))
            }
            None => StdRng::from_os_rng(),
        }
    }
}
