//! Error types for the rules engine.
//!
//! Every error is fatal to the game it happens in. The two kinds exist so a
//! driver can tell a bad setup (`Configuration`) from a broken invariant
//! discovered mid-turn (`Consistency`).

/// Problems with how a game or pipeline was put together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown pipeline stage '{0}'")]
    UnknownStage(String),

    #[error("pipeline has no stages")]
    EmptyPipeline,

    #[error("unknown game type '{0}'")]
    UnknownGameType(String),

    #[error("unknown map '{0}'")]
    UnknownMap(String),

    #[error("invalid value '{value}' for setting '{name}': {reason}")]
    InvalidSetting {
        name: String,
        value: String,
        reason: String,
    },

    #[error("board {width}x{height} has room for at most {max} snakes, got {requested}")]
    TooManySnakes {
        width: i32,
        height: i32,
        max: usize,
        requested: usize,
    },
}

/// An invariant the pipeline relies on was found broken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyFault {
    #[error("snake '{snake_id}' has a zero-length body")]
    ZeroLengthSnake { snake_id: String },

    #[error("snake '{snake_id}' was eliminated by collision but eliminated_by is not set")]
    MissingCulprit { snake_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("consistency fault: {0}")]
    Consistency(#[from] ConsistencyFault),
}

impl RulesError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, RulesError::Configuration(_))
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self, RulesError::Consistency(_))
    }
}

pub type RulesResult<T> = Result<T, RulesError>;
