//! Headless player used by the simulator binary and the integration tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::game::{
    Activation, DifficultyConfig, GameError, GameEvent, GameManager, Phase, Result, ResultStats,
    Theme,
};

const THINK_MS: u64 = 250;
const MAX_STEPS: usize = 10_000;

/// Remembers card faces it has seen, each with probability `recall`.
pub struct MemoryBot<B> {
    recall: f64,
    rng: B,
    known: HashMap<usize, i32>,
}

impl<B: Rng> MemoryBot<B> {
    pub fn new(recall: f64, rng: B) -> Self {
        MemoryBot {
            recall: recall.clamp(0.0, 1.0),
            rng,
            known: HashMap::new(),
        }
    }

    pub fn known(&self) -> usize {
        self.known.len()
    }

    fn see(&mut self, index: usize, id: i32) {
        if self.rng.random::<f64>() < self.recall {
            self.known.insert(index, id);
        }
    }

    fn forget(&mut self) {
        self.known.clear();
    }

    fn choose<R: Rng>(&mut self, game: &GameManager<R>) -> Option<usize> {
        let state = game.state();
        let cards = state.cards();
        let arity = state.difficulty().map_or(2, |d| d.arity());
        self.known
            .retain(|&i, _| cards.get(i).is_some_and(|c| !c.is_matched()));

        let target = state
            .selection()
            .first()
            .and_then(|&i| cards.get(i))
            .map(|c| c.id);

        let recalled = match target {
            Some(id) => self
                .known
                .iter()
                .filter(|&(&i, &known_id)| known_id == id && cards[i].can_flip())
                .map(|(&i, _)| i)
                .min(),
            None => {
                let mut by_id: HashMap<i32, Vec<usize>> = HashMap::new();
                for (&i, &id) in &self.known {
                    if cards[i].can_flip() && !cards[i].is_bomb() {
                        by_id.entry(id).or_default().push(i);
                    }
                }
                by_id
                    .into_values()
                    .filter(|set| set.len() >= arity)
                    .filter_map(|set| set.into_iter().min())
                    .min()
            }
        };
        if recalled.is_some() {
            return recalled;
        }
        // The partner is showing (bonus peek); wait for it to turn back.
        if let Some(id) = target
            && self.known.iter().any(|(i, &known_id)| {
                known_id == id && cards[*i].is_face_up() && !state.selection().contains(i)
            })
        {
            return None;
        }

        let unknown: Vec<usize> = (0..cards.len())
            .filter(|&i| cards[i].can_flip() && !self.known.contains_key(&i))
            .collect();
        if unknown.is_empty() {
            return (0..cards.len()).find(|&i| cards[i].can_flip() && !cards[i].is_bomb());
        }
        Some(unknown[self.rng.random_range(0..unknown.len())])
    }
}

/// Plays one round to its end and returns the final statistics.
pub fn play_round<R: Rng, B: Rng>(
    game: &mut GameManager<R>,
    bot: &mut MemoryBot<B>,
    difficulty: DifficultyConfig,
    theme: Theme,
) -> Result<ResultStats> {
    let sightings: Rc<RefCell<Vec<(usize, i32)>>> = Rc::default();
    let sink = sightings.clone();
    let listener = game.subscribe(move |event| {
        if let GameEvent::CardFlipped {
            index,
            id,
            face_up: true,
        } = event
        {
            sink.borrow_mut().push((*index, *id));
        }
        Ok(())
    });

    bot.forget();
    game.start_round(difficulty, theme)?;
    let mut previewed = false;

    for step in 0..MAX_STEPS {
        for (index, id) in sightings.borrow_mut().drain(..) {
            bot.see(index, id);
        }

        match game.state().phase() {
            Phase::Result => {
                game.unsubscribe(listener);
                return Ok(game.state().result_stats());
            }
            Phase::Preview => {
                if !previewed {
                    for (index, card) in game.state().cards().iter().enumerate() {
                        bot.see(index, card.id);
                    }
                    previewed = true;
                }
                game.advance_to_next();
                continue;
            }
            Phase::Playing if game.state().can_act() => {}
            _ => {
                if !game.advance_to_next() {
                    break;
                }
                continue;
            }
        }

        let Some(index) = bot.choose(game) else {
            game.advance(Duration::from_millis(THINK_MS));
            continue;
        };
        let activation = game.handle_card_activation(index)?;
        debug!(step, index, ?activation, known = bot.known(), "Bot move");
        if activation == Activation::Ignored || matches!(activation, Activation::Pending { .. }) {
            game.advance(Duration::from_millis(THINK_MS));
        }
    }

    game.unsubscribe(listener);
    Err(GameError::transition("autoplay did not finish the round"))
}
