use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{GameError, Result};
use super::layout::BoardLayout;

/// Fixed delays of the round, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timings {
    pub match_delay_ms: u64,
    pub mismatch_reveal_ms: u64,
    pub bomb_pause_ms: u64,
    pub preview_tick_ms: u64,
    pub clock_tick_ms: u64,
    pub bonus_reveal_delay_ms: u64,
    pub bonus_reveal_duration_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            match_delay_ms: 500,
            mismatch_reveal_ms: 1000,
            bomb_pause_ms: 800,
            preview_tick_ms: 1000,
            clock_tick_ms: 1000,
            bonus_reveal_delay_ms: 3000,
            bonus_reveal_duration_ms: 2000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scoring {
    pub combo_step: u32,
    pub bonus_set_points: u32,
    pub time_bonus_per_second: u32,
    pub heart_bonus: u32,
    pub bomb_penalty_factor: f64,
}

impl Default for Scoring {
    fn default() -> Self {
        Scoring {
            combo_step: 5,
            bonus_set_points: 50,
            time_bonus_per_second: 2,
            heart_bonus: 10,
            bomb_penalty_factor: 1.5,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub layout: BoardLayout,
    pub timings: Timings,
    pub scoring: Scoring,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(raw)
            .map_err(|e| GameError::config(format!("engine config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| GameError::config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timings.clock_tick_ms == 0 || self.timings.preview_tick_ms == 0 {
            return Err(GameError::config("tick intervals must be positive"));
        }
        if !(self.scoring.bomb_penalty_factor.is_finite() && self.scoring.bomb_penalty_factor >= 0.0)
        {
            return Err(GameError::config(format!(
                "bomb penalty factor must be a non-negative number, got {}",
                self.scoring.bomb_penalty_factor
            )));
        }
        let layout = &self.layout;
        if layout.canvas_width <= 0.0
            || layout.canvas_height <= 0.0
            || layout.card_width <= 0.0
            || layout.card_height <= 0.0
        {
            return Err(GameError::config("canvas and card sizes must be positive"));
        }
        Ok(())
    }
}
