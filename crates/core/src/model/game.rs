use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameKindError {
    #[error("unknown game: {0}")]
    Unknown(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level must be between 1 and {max}, got {provided}")]
    OutOfRange { provided: u8, max: u8 },
}

//
// ─── GAME KIND ─────────────────────────────────────────────────────────────────
//

/// The three arithmetic mini-games. Each one is also a progress module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Comparison,
    Ordering,
    Composition,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [
        GameKind::Comparison,
        GameKind::Ordering,
        GameKind::Composition,
    ];

    /// Stable key used in persisted maps and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Comparison => "comparison",
            GameKind::Ordering => "ordering",
            GameKind::Composition => "composition",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            GameKind::Comparison => "Compare Numbers",
            GameKind::Ordering => "Order Numbers",
            GameKind::Composition => "Make Numbers",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = GameKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comparison" | "compare" => Ok(GameKind::Comparison),
            "ordering" | "order" => Ok(GameKind::Ordering),
            "composition" | "compose" => Ok(GameKind::Composition),
            _ => Err(GameKindError::Unknown(s.to_string())),
        }
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Answers needed before the session escalates to level 2.
pub const LEVEL_TWO_THRESHOLD: u32 = 10;
/// Answers needed before the session escalates to level 3.
pub const LEVEL_THREE_THRESHOLD: u32 = 20;

/// Difficulty tier, always within `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MAX: u8 = 3;
    pub const ONE: Level = Level(1);
    pub const TWO: Level = Level(2);
    pub const THREE: Level = Level(3);

    /// # Errors
    ///
    /// Returns `LevelError::OutOfRange` for values outside `1..=3`.
    pub fn new(value: u8) -> Result<Self, LevelError> {
        if (1..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LevelError::OutOfRange {
                provided: value,
                max: Self::MAX,
            })
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Level derived from the number of answers given so far in a session.
    ///
    /// Recomputed after every answer, so the result never depends on the
    /// previous level.
    #[must_use]
    pub fn for_questions_answered(answered: u32) -> Self {
        if answered >= LEVEL_THREE_THRESHOLD {
            Level::THREE
        } else if answered >= LEVEL_TWO_THRESHOLD {
            Level::TWO
        } else {
            Level::ONE
        }
    }

    #[must_use]
    pub fn info(self, game: GameKind) -> LevelInfo {
        let (title, description) = match (game, self.0) {
            (GameKind::Comparison, 1) => ("Basic Comparison", "Compare single-digit numbers"),
            (GameKind::Comparison, 2) => ("Medium Comparison", "Compare two-digit numbers"),
            (GameKind::Comparison, _) => (
                "Advanced Comparison",
                "Compare numbers with different place values",
            ),
            (GameKind::Ordering, 1) => ("Simple Sequences", "Order 3-5 single-digit numbers"),
            (GameKind::Ordering, 2) => (
                "Mixed Sequences",
                "Order single and double-digit numbers",
            ),
            (GameKind::Ordering, _) => (
                "Reverse Order",
                "Practice ascending and descending ordering",
            ),
            (GameKind::Composition, 1) => (
                "Basic Addition Pairs",
                "Find the pair that makes a number up to 9",
            ),
            (GameKind::Composition, 2) => (
                "Bigger Sums",
                "Find the pair that makes a number up to 25",
            ),
            (GameKind::Composition, _) => (
                "Missing Addend",
                "Find the pair that makes a number up to 35",
            ),
        };
        LevelInfo {
            level: self,
            title,
            description,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::ONE
    }
}

impl TryFrom<u8> for Level {
    type Error = LevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display metadata for a level of a given game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: Level,
    pub title: &'static str,
    pub description: &'static str,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
