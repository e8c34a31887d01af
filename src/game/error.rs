use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Configuration error: {detail}")]
    Configuration { detail: String },
    #[error("Invalid transition: {detail}")]
    InvalidTransition { detail: String },
    #[error("Listener error: {detail}")]
    Listener { detail: String },
    #[error("Card {index} is out of range for a deck of {len}")]
    CardOutOfRange { index: usize, len: usize },
}

impl GameError {
    pub fn config(detail: impl Into<String>) -> Self {
        GameError::Configuration {
            detail: detail.into(),
        }
    }

    pub fn transition(detail: impl Into<String>) -> Self {
        GameError::InvalidTransition {
            detail: detail.into(),
        }
    }

    pub fn listener(detail: impl Into<String>) -> Self {
        GameError::Listener {
            detail: detail.into(),
        }
    }

    /// Errors the orchestrator recovers from by resetting the round.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GameError::InvalidTransition { .. })
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
