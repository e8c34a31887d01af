pub mod autoplay;
pub mod game;

pub use game::{
    Activation, Difficulty, DifficultyConfig, EngineConfig, GameError, GameEvent, GameManager,
    Phase, Theme,
};
