//! Rules engine of the memory-matching game: deck, match rules, special
//! cards and the round state machine.

pub mod card;
pub mod config;
pub mod deck;
pub mod difficulty;
#[cfg(feature = "glib-driver")]
pub mod driver;
pub mod error;
pub mod events;
pub mod layout;
pub mod manager;
pub mod penalties;
pub mod rules;
pub mod state;
pub mod timers;

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests_props;
#[cfg(test)]
mod tests_rules;

pub use card::{Card, CardFace, CardKind, Position, Theme};
pub use config::{EngineConfig, Scoring, Timings};
pub use difficulty::{Difficulty, DifficultyConfig, SpecialCards};
pub use error::{GameError, Result};
pub use events::{BusStats, EventBus, GameEvent, ListenerId, ListenerResult};
pub use layout::BoardLayout;
pub use manager::{Activation, GameManager};
pub use penalties::BombOutcome;
pub use state::{EndReason, GameSnapshot, GameState, Phase, Rank, ResultStats, ScoreBreakdown};
