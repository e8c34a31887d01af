use std::collections::HashSet;

use serde::Serialize;

use super::card::{Card, CardKind};
use super::config::Scoring;
use super::difficulty::DifficultyConfig;
use super::error::{GameError, Result};

/// State change produced by one evaluation. Applied by `GameState::apply_effect`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum Effect {
    Matched {
        set_id: i32,
        indices: Vec<usize>,
        points: u32,
        combo_bonus: u32,
    },
    BonusPoints {
        points: u32,
    },
    HiddenMatch {
        set_id: i32,
    },
    Mismatch {
        indices: Vec<usize>,
    },
    TimePenalty {
        secs: u32,
    },
    HeartLost,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub is_match: bool,
    pub kind: CardKind,
    pub effects: Vec<Effect>,
}

impl Evaluation {
    /// Score gained by this evaluation, all components included.
    pub fn points(&self) -> u32 {
        self.effects
            .iter()
            .map(|effect| match effect {
                Effect::Matched {
                    points,
                    combo_bonus,
                    ..
                } => points + combo_bonus,
                Effect::BonusPoints { points } => *points,
                _ => 0,
            })
            .sum()
    }

    pub fn time_penalty(&self) -> u32 {
        self.effects
            .iter()
            .map(|effect| match effect {
                Effect::TimePenalty { secs } => *secs,
                _ => 0,
            })
            .sum()
    }

    pub fn is_hidden_match(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, Effect::HiddenMatch { .. }))
    }

    pub fn is_bonus_match(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, Effect::BonusPoints { .. }))
    }
}

fn check_selection(cards: &[Card], selection: &[usize], arity: usize) -> Result<()> {
    if selection.len() != arity {
        return Err(GameError::transition(format!(
            "selection holds {} cards, {} required",
            selection.len(),
            arity
        )));
    }
    let mut seen = HashSet::with_capacity(selection.len());
    for &index in selection {
        let Some(card) = cards.get(index) else {
            return Err(GameError::transition(format!(
                "selected card {index} is not on the board"
            )));
        };
        if !seen.insert(index) {
            return Err(GameError::transition(format!(
                "card {index} selected twice"
            )));
        }
        if card.is_bomb() {
            return Err(GameError::transition(format!(
                "bomb card {index} reached the comparison"
            )));
        }
        if card.is_matched() {
            return Err(GameError::transition(format!(
                "card {index} is already matched"
            )));
        }
    }
    Ok(())
}

/// Compares a full selection. On a match every selected card becomes
/// matched; on a mismatch the cards are left face up for the caller to
/// turn back after the reveal delay. A selection where only some cards
/// agree is a mismatch.
pub fn evaluate(
    cards: &mut [Card],
    selection: &[usize],
    difficulty: &DifficultyConfig,
    combo: u32,
    scoring: &Scoring,
) -> Result<Evaluation> {
    check_selection(cards, selection, difficulty.arity())?;

    let first = &cards[selection[0]];
    let set_id = first.id;
    let kind = first.kind;
    let is_match = selection.iter().all(|&i| cards[i].is_match_with(first));

    let mut effects = Vec::new();
    if is_match {
        for &index in selection {
            cards[index].set_matched();
        }
        effects.push(Effect::Matched {
            set_id,
            indices: selection.to_vec(),
            points: difficulty.points_per_match,
            combo_bonus: combo * scoring.combo_step,
        });
        match kind {
            CardKind::Bonus => effects.push(Effect::BonusPoints {
                points: scoring.bonus_set_points,
            }),
            CardKind::Hidden => effects.push(Effect::HiddenMatch { set_id }),
            CardKind::Normal | CardKind::Bomb => {}
        }
    } else {
        effects.push(Effect::Mismatch {
            indices: selection.to_vec(),
        });
        effects.push(Effect::TimePenalty {
            secs: difficulty.time_penalty_secs,
        });
        effects.push(Effect::HeartLost);
    }

    Ok(Evaluation {
        is_match,
        kind,
        effects,
    })
}
