mod game;
mod progress;
mod round;
mod summary;

pub use game::{
    GameKind, GameKindError, LEVEL_THREE_THRESHOLD, LEVEL_TWO_THRESHOLD, Level, LevelError,
    LevelInfo,
};
pub use progress::{
    MAX_PLAYER_NAME_CHARS, PlayerNameError, PlayerProgress, ScoreBoard, normalize_player_name,
};
pub use round::{
    Answer, ComparisonRound, CompositionOption, CompositionRound, OrderDirection, OrderingRound,
    Relation, Round, Side,
};
pub use summary::{GameSummary, GameSummaryError};
