use rand::Rng;
use serde::Serialize;

use super::config::Scoring;
use super::difficulty::DifficultyConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BombOutcome {
    InstantDeath,
    Shuffled { time_penalty_secs: u32 },
    TimePenalty { time_penalty_secs: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BombPlan {
    pub instant_death: bool,
    pub reshuffle: bool,
    pub time_penalty_secs: u32,
}

impl BombPlan {
    pub fn outcome(&self) -> BombOutcome {
        if self.instant_death {
            BombOutcome::InstantDeath
        } else if self.reshuffle {
            BombOutcome::Shuffled {
                time_penalty_secs: self.time_penalty_secs,
            }
        } else {
            BombOutcome::TimePenalty {
                time_penalty_secs: self.time_penalty_secs,
            }
        }
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    rng.random::<f64>() < chance
}

/// Rolls what a bomb does this time. Instant death is drawn first and
/// skips every other effect when it hits.
pub fn plan_bomb<R: Rng + ?Sized>(
    difficulty: &DifficultyConfig,
    scoring: &Scoring,
    rng: &mut R,
) -> BombPlan {
    let special = &difficulty.special;
    if special.instant_death && draw(rng, special.instant_death_chance) {
        return BombPlan {
            instant_death: true,
            reshuffle: false,
            time_penalty_secs: 0,
        };
    }

    let reshuffle = special.shuffle && draw(rng, special.shuffle_chance);
    BombPlan {
        instant_death: false,
        reshuffle,
        time_penalty_secs: difficulty.bomb_penalty_secs(scoring.bomb_penalty_factor),
    }
}
