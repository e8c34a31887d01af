use serde::{Deserialize, Serialize};

use super::error::{GameError, Result};

pub const DEFAULT_HEARTS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Hell,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Hell,
    ];

    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                name: self.name().to_string(),
                sets: 4,
                arity: 2,
                grid_cols: 4,
                grid_rows: 2,
                time_limit_secs: 180,
                points_per_match: 10,
                time_penalty_secs: 5,
                preview_ms: 5000,
                hearts: Some(5),
                special: SpecialCards {
                    hidden_set: true,
                    ..SpecialCards::default()
                },
            },
            Difficulty::Medium => DifficultyConfig {
                name: self.name().to_string(),
                sets: 8,
                arity: 2,
                grid_cols: 6,
                grid_rows: 3,
                time_limit_secs: 120,
                points_per_match: 15,
                time_penalty_secs: 10,
                preview_ms: 7000,
                hearts: Some(10),
                special: SpecialCards {
                    bonus_pairs: 1,
                    hidden_set: true,
                    ..SpecialCards::default()
                },
            },
            Difficulty::Hard => DifficultyConfig {
                name: self.name().to_string(),
                sets: 15,
                arity: 2,
                grid_cols: 8,
                grid_rows: 4,
                time_limit_secs: 90,
                points_per_match: 20,
                time_penalty_secs: 15,
                preview_ms: 0,
                hearts: Some(20),
                special: SpecialCards {
                    bombs: 2,
                    hidden_set: true,
                    shuffle: true,
                    shuffle_chance: 0.5,
                    ..SpecialCards::default()
                },
            },
            Difficulty::Hell => DifficultyConfig {
                name: self.name().to_string(),
                sets: 19,
                arity: 3,
                grid_cols: 11,
                grid_rows: 6,
                time_limit_secs: 60,
                points_per_match: 30,
                time_penalty_secs: 20,
                preview_ms: 5000,
                hearts: Some(25),
                special: SpecialCards {
                    bonus_pairs: 0,
                    bombs: 6,
                    hidden_set: true,
                    shuffle: true,
                    shuffle_chance: 0.3,
                    instant_death: true,
                    instant_death_chance: 0.01,
                },
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Hell => "Hell",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialCards {
    pub bonus_pairs: u32,
    pub bombs: u32,
    pub hidden_set: bool,
    pub shuffle: bool,
    pub shuffle_chance: f64,
    pub instant_death: bool,
    pub instant_death_chance: f64,
}

impl Default for SpecialCards {
    fn default() -> Self {
        SpecialCards {
            bonus_pairs: 0,
            bombs: 0,
            hidden_set: false,
            shuffle: false,
            shuffle_chance: 1.0,
            instant_death: false,
            instant_death_chance: 1.0,
        }
    }
}

/// Rules of one round. Read-only to the engine once a round starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyConfig {
    pub name: String,
    #[serde(alias = "pairs")]
    pub sets: u32,
    #[serde(alias = "matchingRule", default = "default_arity")]
    pub arity: u8,
    pub grid_cols: u32,
    pub grid_rows: u32,
    #[serde(alias = "timeLimit")]
    pub time_limit_secs: u32,
    pub points_per_match: u32,
    #[serde(alias = "timePenalty", default)]
    pub time_penalty_secs: u32,
    #[serde(alias = "previewTime", default)]
    pub preview_ms: u64,
    #[serde(default)]
    pub hearts: Option<u32>,
    #[serde(alias = "specialCards", default)]
    pub special: SpecialCards,
}

fn default_arity() -> u8 {
    2
}

impl DifficultyConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: DifficultyConfig = serde_json::from_str(raw)
            .map_err(|e| GameError::config(format!("difficulty json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn arity(&self) -> usize {
        self.arity as usize
    }

    /// Matchable sets, bonus pairs included.
    pub fn total_sets(&self) -> u32 {
        self.sets + self.special.bonus_pairs
    }

    pub fn total_cards(&self) -> usize {
        self.sets as usize * self.arity()
            + self.special.bonus_pairs as usize * 2
            + self.special.bombs as usize
    }

    pub fn grid_slots(&self) -> usize {
        self.grid_cols as usize * self.grid_rows as usize
    }

    pub fn max_hearts(&self) -> u32 {
        self.hearts.unwrap_or(DEFAULT_HEARTS)
    }

    pub fn bomb_penalty_secs(&self, factor: f64) -> u32 {
        (self.time_penalty_secs as f64 * factor).round() as u32
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GameError::config("difficulty name is empty"));
        }
        if self.sets == 0 {
            return Err(GameError::config(format!(
                "{}: set count must be positive",
                self.name
            )));
        }
        if !matches!(self.arity, 2 | 3) {
            return Err(GameError::config(format!(
                "{}: matching arity must be 2 or 3, got {}",
                self.name, self.arity
            )));
        }
        if self.grid_cols == 0 || self.grid_rows == 0 {
            return Err(GameError::config(format!(
                "{}: grid dimensions must be positive, got {}x{}",
                self.name, self.grid_cols, self.grid_rows
            )));
        }
        if self.time_limit_secs == 0 {
            return Err(GameError::config(format!(
                "{}: time limit must be positive",
                self.name
            )));
        }
        if self.hearts == Some(0) {
            return Err(GameError::config(format!(
                "{}: hearts budget must be positive",
                self.name
            )));
        }
        for (label, chance) in [
            ("shuffle chance", self.special.shuffle_chance),
            ("instant death chance", self.special.instant_death_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(GameError::config(format!(
                    "{}: {label} must lie in [0, 1], got {chance}",
                    self.name
                )));
            }
        }
        if self.special.bonus_pairs > 0 && self.arity != 2 {
            return Err(GameError::config(format!(
                "{}: bonus pairs need 2-card matching",
                self.name
            )));
        }
        if self.total_cards() > self.grid_slots() {
            return Err(GameError::config(format!(
                "{}: {} cards do not fit a {}x{} grid",
                self.name,
                self.total_cards(),
                self.grid_cols,
                self.grid_rows
            )));
        }
        Ok(())
    }
}
