use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

use super::card::Theme;
use super::error::GameError;
use super::penalties::BombOutcome;
use super::state::{EndReason, ResultStats};

/// Everything the engine tells the outside world.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    RoundInitialized {
        difficulty: String,
        theme: Theme,
        cards: usize,
        total_sets: u32,
    },
    PreviewStarted {
        duration_ms: u64,
    },
    PreviewTick {
        remaining_ms: u64,
    },
    PreviewEnded,
    PlayingStarted {
        time_limit: u32,
    },
    CardFlipped {
        index: usize,
        id: i32,
        face_up: bool,
    },
    MatchSucceeded {
        indices: Vec<usize>,
        points: u32,
        combo: u32,
        matched_sets: u32,
        bonus: bool,
        hidden: bool,
    },
    HiddenMatchRevealed {
        set_id: i32,
    },
    MatchFailed {
        indices: Vec<usize>,
        penalty: u32,
    },
    HeartLost {
        remaining: u32,
        max: u32,
    },
    BonusRevealed {
        indices: Vec<usize>,
    },
    BonusHidden {
        indices: Vec<usize>,
    },
    BombTriggered {
        index: usize,
        outcome: BombOutcome,
    },
    CardsShuffled {
        moved: usize,
    },
    TimerTick {
        remaining: u32,
        elapsed: u32,
    },
    RoundComplete {
        stats: ResultStats,
    },
    RoundOver {
        reason: EndReason,
        stats: ResultStats,
    },
    RoundReset,
    Error {
        method: String,
        cause: String,
    },
}

impl GameEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::RoundInitialized { .. } => "roundInitialized",
            GameEvent::PreviewStarted { .. } => "previewStarted",
            GameEvent::PreviewTick { .. } => "previewTick",
            GameEvent::PreviewEnded => "previewEnded",
            GameEvent::PlayingStarted { .. } => "playingStarted",
            GameEvent::CardFlipped { .. } => "cardFlipped",
            GameEvent::MatchSucceeded { .. } => "matchSucceeded",
            GameEvent::HiddenMatchRevealed { .. } => "hiddenMatchRevealed",
            GameEvent::MatchFailed { .. } => "matchFailed",
            GameEvent::HeartLost { .. } => "heartLost",
            GameEvent::BonusRevealed { .. } => "bonusRevealed",
            GameEvent::BonusHidden { .. } => "bonusHidden",
            GameEvent::BombTriggered { .. } => "bombTriggered",
            GameEvent::CardsShuffled { .. } => "cardsShuffled",
            GameEvent::TimerTick { .. } => "timerTick",
            GameEvent::RoundComplete { .. } => "roundComplete",
            GameEvent::RoundOver { .. } => "roundOver",
            GameEvent::RoundReset => "roundReset",
            GameEvent::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameEvent::RoundComplete { .. } | GameEvent::RoundOver { .. }
        )
    }
}

pub type ListenerResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

type Listener = Box<dyn FnMut(&GameEvent) -> ListenerResult>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    pub published: BTreeMap<&'static str, u64>,
    pub listener_failures: u64,
}

impl BusStats {
    pub fn count(&self, kind: &str) -> u64 {
        self.published.get(kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.published.values().sum()
    }
}

/// Fan-out of game events. A listener that errors or panics is reported
/// and skipped; the rest still receive the event.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
    stats: BusStats,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) -> ListenerResult + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn stats(&self) -> &BusStats {
        &self.stats
    }

    /// Delivers the event to every listener and returns how many failed.
    /// Failures are logged and counted in [`BusStats`].
    pub fn publish(&mut self, event: &GameEvent) -> usize {
        *self.stats.published.entry(event.kind()).or_insert(0) += 1;

        let mut failures = 0;
        for (id, listener) in self.listeners.iter_mut() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(event)));
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => GameError::listener(err.to_string()),
                Err(payload) => GameError::listener(panic_message(payload.as_ref())),
            };
            warn!(listener = id.0, event = event.kind(), error = %failure, "Listener failed");
            self.stats.listener_failures += 1;
            failures += 1;
        }
        failures
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("listener panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("listener panicked: {msg}")
    } else {
        "listener panicked".to_string()
    }
}
