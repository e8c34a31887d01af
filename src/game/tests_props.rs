//! Property tests for the deck, the rule engine and whole sessions.
//!
//! Properties tested:
//! - Dealing conserves every set and keeps bombs single
//! - Every full selection is exactly one of match or mismatch
//! - Score never decreases and always equals the sum of its parts
//! - Combo grows by one per match and drops to zero on mismatch or bomb
//! - Any session reaches `Result` once the clock has run down

use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::card::Theme;
use super::config::{EngineConfig, Scoring};
use super::deck::build_deck;
use super::difficulty::Difficulty;
use super::events::GameEvent;
use super::layout::BoardLayout;
use super::manager::GameManager;
use super::rules::{Effect, evaluate};
use super::state::Phase;
use super::test_helpers::{init_logging, record};

fn difficulty_strategy() -> impl Strategy<Value = Difficulty> {
    prop::sample::select(Difficulty::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_dealing_conserves_sets(seed in any::<u64>(), difficulty in difficulty_strategy()) {
        let config = difficulty.config();
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = build_deck(&config, &BoardLayout::default(), &mut rng).unwrap();

        let mut counts: HashMap<i32, usize> = HashMap::new();
        for card in &deck {
            *counts.entry(card.id).or_insert(0) += 1;
        }
        prop_assert_eq!(deck.len(), config.total_cards());
        for (id, count) in counts {
            if id < 0 {
                prop_assert_eq!(count, 1);
            } else if (id as u32) < config.sets {
                prop_assert_eq!(count, config.arity());
            } else {
                prop_assert_eq!(count, 2);
            }
        }
    }

    #[test]
    fn prop_selection_has_exactly_one_verdict(
        seed in any::<u64>(),
        picks in prop::sample::subsequence((0..57usize).collect::<Vec<_>>(), 3),
    ) {
        let config = Difficulty::Hell.config();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = build_deck(&config, &BoardLayout::default(), &mut rng).unwrap();
        let playable: Vec<usize> = (0..deck.len()).filter(|&i| !deck[i].is_bomb()).collect();
        let selection: Vec<usize> = picks.iter().map(|&p| playable[p]).collect();
        let same_id = selection.iter().all(|&i| deck[i].id == deck[selection[0]].id);

        let evaluation = evaluate(&mut deck, &selection, &config, 0, &Scoring::default()).unwrap();

        let matched = evaluation.effects.iter().filter(|e| matches!(e, Effect::Matched { .. })).count();
        let missed = evaluation.effects.iter().filter(|e| matches!(e, Effect::Mismatch { .. })).count();
        prop_assert_eq!(matched + missed, 1);
        prop_assert_eq!(evaluation.is_match, same_id);
        prop_assert_eq!(matched == 1, same_id);
    }

    #[test]
    fn prop_sessions_keep_score_and_combo_laws(
        seed in any::<u64>(),
        difficulty in difficulty_strategy(),
        clicks in prop::collection::vec((any::<prop::sample::Index>(), 0u64..1_500), 1..60),
    ) {
        init_logging();
        let mut game = GameManager::with_seed(EngineConfig::default(), seed).unwrap();
        let events = record(&mut game);
        let config = difficulty.config();
        let time_limit_ms = u64::from(config.time_limit_secs) * 1_000;
        game.start_round(config, Theme::Fruit).unwrap();

        let mut last_score = 0;
        for (pick, wait_ms) in clicks {
            let index = pick.index(game.state().cards().len());
            game.handle_card_activation(index).unwrap();
            game.advance(Duration::from_millis(wait_ms));

            let state = game.state();
            prop_assert!(state.score() >= last_score);
            prop_assert_eq!(state.score(), state.score_breakdown().total());
            prop_assert!(state.hearts() <= state.max_hearts());
            prop_assert!(state.matched_sets() <= state.total_sets());
            prop_assert!(state.selection().len() <= state.difficulty().map_or(0, |d| d.arity()));
            last_score = state.score();
        }

        game.advance(Duration::from_millis(time_limit_ms + 10_000));
        prop_assert_eq!(game.state().phase(), Phase::Result);
        prop_assert_eq!(game.pending_tasks(), 0);

        let mut combo = 0;
        for event in events.borrow().iter() {
            match event {
                GameEvent::MatchSucceeded { combo: reported, .. } => {
                    prop_assert_eq!(*reported, combo + 1);
                    combo = *reported;
                }
                GameEvent::MatchFailed { .. } | GameEvent::BombTriggered { .. } => combo = 0,
                _ => {}
            }
        }
    }
}

#[test]
fn shuffle_spreads_evenly_over_permutations() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut seen: HashMap<[u8; 3], u32> = HashMap::new();
    for _ in 0..6_000 {
        let mut order = [0u8, 1, 2];
        order.shuffle(&mut rng);
        *seen.entry(order).or_insert(0) += 1;
    }
    assert_eq!(seen.len(), 6);
    for (order, count) in seen {
        assert!((850..=1_150).contains(&count), "{order:?} seen {count} times");
    }
}
