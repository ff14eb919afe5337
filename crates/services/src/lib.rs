#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod games;
pub mod history_service;
pub mod progress_service;

pub use explorers_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, HistoryError, ProgressServiceError};
pub use games::{GameEvent, GameEvents, GameOverReport, GameRunner};
pub use history_service::{GameHistoryItem, GameSummaryId, HistoryService};
pub use progress_service::{BestScoreUpdate, ProgressService};
