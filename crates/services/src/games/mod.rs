mod events;
mod runner;

pub use events::{GameEvent, GameOverReport};
pub use runner::{GameEvents, GameRunner};
