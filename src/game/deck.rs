use rand::Rng;
use rand::seq::SliceRandom;

use super::card::{Card, CardKind};
use super::difficulty::DifficultyConfig;
use super::error::Result;
use super::layout::BoardLayout;

pub const BONUS_ID_OFFSET: i32 = 1000;

pub fn bonus_id(config: &DifficultyConfig, index: u32) -> i32 {
    config.sets as i32 + BONUS_ID_OFFSET + index as i32
}

pub fn bomb_id(index: u32) -> i32 {
    -(index as i32 + 1)
}

/// Unshuffled cards for a round: normal sets, bonus pairs, then bombs.
pub fn generate_cards(config: &DifficultyConfig) -> Vec<Card> {
    let mut cards = Vec::with_capacity(config.total_cards());

    for id in 0..config.sets {
        let kind = if config.special.hidden_set && id + 1 == config.sets {
            CardKind::Hidden
        } else {
            CardKind::Normal
        };
        for _ in 0..config.arity() {
            cards.push(Card::new(id as i32, kind));
        }
    }

    for i in 0..config.special.bonus_pairs {
        let id = bonus_id(config, i);
        cards.push(Card::new(id, CardKind::Bonus));
        cards.push(Card::new(id, CardKind::Bonus));
    }

    for i in 0..config.special.bombs {
        cards.push(Card::new(bomb_id(i), CardKind::Bomb));
    }

    cards
}

pub fn build_deck<R: Rng + ?Sized>(
    config: &DifficultyConfig,
    layout: &BoardLayout,
    rng: &mut R,
) -> Result<Vec<Card>> {
    config.validate()?;

    let mut cards = generate_cards(config);
    cards.shuffle(rng);

    let placement = layout.place(config.grid_cols, config.grid_rows, cards.len());
    for (card, slot) in cards.iter_mut().zip(placement.slots) {
        card.position = slot;
    }

    Ok(cards)
}

/// Shuffles the board slots of every unmatched, non-bomb card in place.
/// Card identities and deck order are untouched. Returns how many cards
/// took part.
pub fn reshuffle_positions<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) -> usize {
    let mut movable_indices = Vec::new();
    let mut movable_positions = Vec::new();

    for (idx, card) in cards.iter().enumerate() {
        if !card.is_matched() && !card.is_bomb() {
            movable_indices.push(idx);
            movable_positions.push(card.position);
        }
    }

    if movable_indices.len() < 2 {
        return 0;
    }

    movable_positions.shuffle(rng);

    let moved = movable_indices.len();
    for (idx, position) in movable_indices.into_iter().zip(movable_positions) {
        cards[idx].position = position;
    }
    moved
}
