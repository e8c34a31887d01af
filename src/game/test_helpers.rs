use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use rand::RngCore;
use tracing_subscriber::{EnvFilter, fmt};

use super::card::CardKind;
use super::config::EngineConfig;
use super::difficulty::{DifficultyConfig, SpecialCards};
use super::events::GameEvent;
use super::manager::GameManager;
use super::state::GameState;

static INIT: Once = Once::new();

/// Test logging, quiet unless `TEST_LOG` or `RUST_LOG` says otherwise.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

/// Every draw yields zero bits, so any probability above 0 succeeds.
pub struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(0);
    }
}

pub type Recorded = Rc<RefCell<Vec<GameEvent>>>;

pub fn record<R: rand::Rng>(manager: &mut GameManager<R>) -> Recorded {
    let events: Recorded = Rc::default();
    let sink = events.clone();
    manager.subscribe(move |event| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });
    events
}

pub fn kinds(events: &Recorded) -> Vec<&'static str> {
    events.borrow().iter().map(GameEvent::kind).collect()
}

pub fn indices_of(state: &GameState, id: i32) -> Vec<usize> {
    state
        .cards()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.id == id && !c.is_bomb())
        .map(|(i, _)| i)
        .collect()
}

pub fn first_of_kind(state: &GameState, kind: CardKind) -> Option<usize> {
    state.cards().iter().position(|c| c.kind == kind)
}

/// Two normal sets with `arity` cards, first card of the second set
/// swapped in last: never a match.
pub fn mismatch_selection(state: &GameState, arity: usize) -> Vec<usize> {
    let mut picks = indices_of(state, 0);
    picks.truncate(arity - 1);
    picks.push(indices_of(state, 1)[0]);
    picks
}

pub fn plain_difficulty(sets: u32, time_limit_secs: u32, hearts: u32) -> DifficultyConfig {
    DifficultyConfig {
        name: "Plain".to_string(),
        sets,
        arity: 2,
        grid_cols: sets.max(1),
        grid_rows: 3,
        time_limit_secs,
        points_per_match: 10,
        time_penalty_secs: 5,
        preview_ms: 0,
        hearts: Some(hearts),
        special: SpecialCards::default(),
    }
}

pub fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.timings.match_delay_ms = 100;
    config.timings.mismatch_reveal_ms = 200;
    config
}
