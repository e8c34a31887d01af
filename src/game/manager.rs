use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use super::card::{CardKind, Theme};
use super::config::EngineConfig;
use super::deck;
use super::difficulty::DifficultyConfig;
use super::error::{GameError, Result};
use super::events::{BusStats, EventBus, GameEvent, ListenerId, ListenerResult};
use super::penalties::{self, BombOutcome};
use super::rules::{self, Effect};
use super::state::{EndReason, GameSnapshot, GameState, Phase};
use super::timers::{Scheduler, Task};

/// What a single card activation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Dropped: wrong phase, input locked, or the card cannot flip.
    Ignored,
    /// Card joined the selection, which still waits for more cards.
    Pending { selected: usize },
    /// Selection is full; the comparison is scheduled.
    Comparing,
    Bomb { outcome: BombOutcome },
}

/// Drives one game: owns the state, the virtual clock and the event bus.
pub struct GameManager<R = StdRng> {
    config: EngineConfig,
    state: GameState,
    scheduler: Scheduler,
    bus: EventBus,
    rng: R,
    round_seq: u64,
}

impl GameManager<StdRng> {
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self> {
        GameManager::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameManager<R> {
    pub fn new(config: EngineConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(GameManager {
            config,
            state: GameState::new(),
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            rng,
            round_seq: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) -> ListenerResult + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn bus_stats(&self) -> &BusStats {
        self.bus.stats()
    }

    fn emit(&mut self, event: GameEvent) {
        self.bus.publish(&event);
    }

    /// Validates the difficulty, deals a fresh deck and opens the round.
    /// A rejected config leaves the current state untouched.
    pub fn start_round(&mut self, difficulty: DifficultyConfig, theme: Theme) -> Result<()> {
        if let Err(err) = difficulty.validate() {
            warn!(difficulty = %difficulty.name, error = %err, "Rejected difficulty config");
            return Err(err);
        }
        let cards = deck::build_deck(&difficulty, &self.config.layout, &mut self.rng)?;

        self.scheduler.cancel_all();
        self.round_seq += 1;
        let preview_ms = difficulty.preview_ms;
        let name = difficulty.name.clone();
        let card_count = cards.len();
        self.state.begin_round(difficulty, theme, cards);

        info!(
            round_id = self.round_seq,
            difficulty = %name,
            theme = theme.name(),
            cards = card_count,
            "Round initialized"
        );
        self.emit(GameEvent::RoundInitialized {
            difficulty: name,
            theme,
            cards: card_count,
            total_sets: self.state.total_sets(),
        });

        if preview_ms > 0 {
            self.state.start_preview(preview_ms);
            self.emit(GameEvent::PreviewStarted {
                duration_ms: preview_ms,
            });
            self.schedule_preview_tick();
        } else {
            self.start_playing();
        }
        Ok(())
    }

    /// Starts again with the difficulty and theme of the current round.
    pub fn retry_round(&mut self) -> Result<()> {
        let Some(difficulty) = self.state.difficulty().cloned() else {
            return Err(GameError::transition("no round to retry"));
        };
        let theme = self.state.theme();
        self.start_round(difficulty, theme)
    }

    /// Abandons whatever is running and waits for a difficulty choice.
    pub fn open_difficulty_select(&mut self) {
        self.scheduler.cancel_all();
        self.state.reset();
        self.state.set_phase(Phase::DifficultySelect);
        debug!(round_id = self.round_seq, "Difficulty select opened");
    }

    /// Cancels every pending task and returns to `Start`. Safe to repeat.
    pub fn reset_round(&mut self) {
        let dropped = self.scheduler.cancel_all();
        self.state.reset();
        info!(round_id = self.round_seq, dropped_tasks = dropped, "Round reset");
        self.emit(GameEvent::RoundReset);
    }

    /// The single player input. Hit-testing is the caller's job.
    pub fn handle_card_activation(&mut self, index: usize) -> Result<Activation> {
        let len = self.state.cards().len();
        let Some(card) = self.state.card(index) else {
            return Err(GameError::CardOutOfRange { index, len });
        };

        if !self.state.is_playing() || !self.state.can_act() || !card.can_flip() {
            debug!(
                round_id = self.round_seq,
                index,
                phase = ?self.state.phase(),
                can_act = self.state.can_act(),
                "Activation ignored"
            );
            return Ok(Activation::Ignored);
        }

        if card.is_bomb() {
            return self.resolve_bomb(index);
        }

        let id = card.id;
        self.state.cards_mut()[index].flip_up();
        self.emit(GameEvent::CardFlipped {
            index,
            id,
            face_up: true,
        });

        let selected = self.state.push_selection(index);
        let arity = self.state.difficulty().map_or(2, |d| d.arity());
        debug!(round_id = self.round_seq, index, id, selected, "Card activated");

        if selected < arity {
            return Ok(Activation::Pending { selected });
        }

        self.state.set_can_act(false);
        self.state.record_attempt();
        self.scheduler
            .schedule_in(self.config.timings.match_delay_ms, Task::Evaluate);
        Ok(Activation::Comparing)
    }

    /// Renderer hook: an animating card refuses activation until cleared.
    pub fn set_card_animating(&mut self, index: usize, animating: bool) -> Result<()> {
        let len = self.state.cards().len();
        let Some(card) = self.state.cards_mut().get_mut(index) else {
            return Err(GameError::CardOutOfRange { index, len });
        };
        card.set_animating(animating);
        Ok(())
    }

    /// Runs every task due within `elapsed`, in order, then moves the clock.
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self
            .scheduler
            .now_ms()
            .saturating_add(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        while let Some(task) = self.scheduler.pop_due(target) {
            debug!(round_id = self.round_seq, task = task.name(), at_ms = self.scheduler.now_ms(), "Task fired");
            self.run_task(task);
        }
        self.scheduler.settle(target);
    }

    /// Advances straight to the next due task, if any.
    pub fn advance_to_next(&mut self) -> bool {
        match self.scheduler.next_deadline() {
            Some(wait) => {
                self.advance(wait);
                true
            }
            None => false,
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Evaluate => self.evaluate_selection(),
            Task::HideMismatch { indices } => self.hide_mismatch(&indices),
            Task::RestoreAfterBomb => self.restore_after_bomb(),
            Task::PreviewTick => self.preview_tick(),
            Task::ClockTick => self.clock_tick(),
            Task::BonusReveal => self.reveal_bonus(),
            Task::BonusHide { indices } => self.hide_bonus(&indices),
        }
    }

    fn schedule_preview_tick(&mut self) {
        let step = self
            .config
            .timings
            .preview_tick_ms
            .min(self.state.preview_remaining_ms());
        self.scheduler.schedule_in(step, Task::PreviewTick);
    }

    fn preview_tick(&mut self) {
        if self.state.phase() != Phase::Preview {
            return;
        }
        let remaining = self.state.preview_remaining_ms();
        let step = self.config.timings.preview_tick_ms.min(remaining);
        let remaining = remaining - step;
        self.state.set_preview_remaining(remaining);

        if remaining > 0 {
            self.emit(GameEvent::PreviewTick {
                remaining_ms: remaining,
            });
            self.schedule_preview_tick();
            return;
        }

        let turned = self.state.end_preview();
        debug!(round_id = self.round_seq, turned, "Preview ended");
        self.emit(GameEvent::PreviewEnded);
        self.start_playing();
    }

    fn start_playing(&mut self) {
        let now = self.scheduler.now_ms();
        self.state.start_playing(now);
        info!(
            round_id = self.round_seq,
            time_limit = self.state.time_limit(),
            "Playing started"
        );
        self.emit(GameEvent::PlayingStarted {
            time_limit: self.state.time_limit(),
        });

        let timings = &self.config.timings;
        let (clock_tick_ms, bonus_delay_ms) = (timings.clock_tick_ms, timings.bonus_reveal_delay_ms);
        self.scheduler.schedule_in(clock_tick_ms, Task::ClockTick);
        if self
            .state
            .cards()
            .iter()
            .any(|c| c.kind == CardKind::Bonus)
        {
            self.scheduler.schedule_in(bonus_delay_ms, Task::BonusReveal);
        }
    }

    fn clock_tick(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        let now = self.scheduler.now_ms();
        let remaining = self.state.update_clock(now);
        let elapsed = self.state.elapsed_secs_at(now);
        self.emit(GameEvent::TimerTick { remaining, elapsed });

        if remaining == 0 {
            self.finish_lose(EndReason::Time);
            return;
        }
        self.scheduler
            .schedule_in(self.config.timings.clock_tick_ms, Task::ClockTick);
    }

    fn evaluate_selection(&mut self) {
        let selection = self.state.take_selection();
        let Some(difficulty) = self.state.difficulty().cloned() else {
            self.recover(
                "evaluate_selection",
                GameError::transition("no difficulty for the running round"),
            );
            return;
        };
        let combo = self.state.combo();
        let evaluation = match rules::evaluate(
            self.state.cards_mut(),
            &selection,
            &difficulty,
            combo,
            &self.config.scoring,
        ) {
            Ok(evaluation) => evaluation,
            Err(err) => {
                self.recover("evaluate_selection", err);
                return;
            }
        };

        for effect in &evaluation.effects {
            self.state.apply_effect(effect);
        }
        debug!(
            round_id = self.round_seq,
            ?selection,
            is_match = evaluation.is_match,
            points = evaluation.points(),
            "Selection evaluated"
        );

        if evaluation.is_match {
            self.emit(GameEvent::MatchSucceeded {
                indices: selection.clone(),
                points: evaluation.points(),
                combo: self.state.combo(),
                matched_sets: self.state.matched_sets(),
                bonus: evaluation.is_bonus_match(),
                hidden: evaluation.is_hidden_match(),
            });
            for effect in &evaluation.effects {
                if let Effect::HiddenMatch { set_id } = effect {
                    self.emit(GameEvent::HiddenMatchRevealed { set_id: *set_id });
                }
            }
            if self.state.is_all_matched() {
                self.finish_win();
            } else {
                self.state.set_can_act(true);
            }
            return;
        }

        self.emit(GameEvent::MatchFailed {
            indices: selection.clone(),
            penalty: evaluation.time_penalty(),
        });
        self.emit(GameEvent::HeartLost {
            remaining: self.state.hearts(),
            max: self.state.max_hearts(),
        });
        self.scheduler.schedule_in(
            self.config.timings.mismatch_reveal_ms,
            Task::HideMismatch { indices: selection },
        );
    }

    fn hide_mismatch(&mut self, indices: &[usize]) {
        if !self.state.is_playing() {
            return;
        }
        self.turn_down(indices);

        if self.state.hearts() == 0 {
            self.finish_lose(EndReason::Hearts);
        } else if self.state.time_remaining() == 0 {
            self.finish_lose(EndReason::Time);
        } else {
            self.state.set_can_act(true);
        }
    }

    fn turn_down(&mut self, indices: &[usize]) {
        for &index in indices {
            let Some(card) = self.state.cards_mut().get_mut(index) else {
                continue;
            };
            if card.flip_down() {
                let id = card.id;
                self.emit(GameEvent::CardFlipped {
                    index,
                    id,
                    face_up: false,
                });
            }
        }
    }

    fn resolve_bomb(&mut self, index: usize) -> Result<Activation> {
        let Some(difficulty) = self.state.difficulty().cloned() else {
            return Err(GameError::transition("bomb activated without a round"));
        };

        let card = &mut self.state.cards_mut()[index];
        card.flip_up();
        let id = card.id;
        self.emit(GameEvent::CardFlipped {
            index,
            id,
            face_up: true,
        });
        self.state.reset_combo();

        let plan = penalties::plan_bomb(&difficulty, &self.config.scoring, &mut self.rng);
        let outcome = plan.outcome();
        info!(round_id = self.round_seq, index, ?outcome, "Bomb triggered");
        self.emit(GameEvent::BombTriggered { index, outcome });

        if plan.instant_death {
            self.finish_lose(EndReason::Bomb);
            return Ok(Activation::Bomb { outcome });
        }

        if plan.reshuffle {
            let moved = deck::reshuffle_positions(self.state.cards_mut(), &mut self.rng);
            self.emit(GameEvent::CardsShuffled { moved });
        }

        self.state.apply_time_penalty(plan.time_penalty_secs);
        if self.state.time_remaining() == 0 {
            self.finish_lose(EndReason::Time);
            return Ok(Activation::Bomb { outcome });
        }

        self.state.set_can_act(false);
        self.scheduler
            .schedule_in(self.config.timings.bomb_pause_ms, Task::RestoreAfterBomb);
        Ok(Activation::Bomb { outcome })
    }

    fn restore_after_bomb(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        let pending = self.state.take_selection();
        self.turn_down(&pending);
        self.state.set_can_act(true);
    }

    fn reveal_bonus(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        let indices: Vec<usize> = self
            .state
            .cards()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == CardKind::Bonus && c.can_flip())
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            return;
        }
        for &index in &indices {
            self.state.cards_mut()[index].flip_up();
        }
        self.emit(GameEvent::BonusRevealed {
            indices: indices.clone(),
        });
        self.scheduler.schedule_in(
            self.config.timings.bonus_reveal_duration_ms,
            Task::BonusHide { indices },
        );
    }

    fn hide_bonus(&mut self, indices: &[usize]) {
        if !self.state.is_playing() {
            return;
        }
        let selection = self.state.selection().to_vec();
        let mut hidden = Vec::new();
        for &index in indices {
            if selection.contains(&index) {
                continue;
            }
            if let Some(card) = self.state.cards_mut().get_mut(index)
                && card.flip_down()
            {
                hidden.push(index);
            }
        }
        if !hidden.is_empty() {
            self.emit(GameEvent::BonusHidden { indices: hidden });
        }
    }

    fn finish_win(&mut self) {
        let now = self.scheduler.now_ms();
        self.state.update_clock(now);
        self.state.end_win(now, &self.config.scoring);
        self.scheduler.cancel_all();

        let stats = self.state.result_stats();
        info!(
            round_id = self.round_seq,
            score = stats.score,
            time_remaining = stats.time_remaining,
            hearts = stats.hearts,
            rank = stats.rank.as_str(),
            "Round complete"
        );
        self.emit(GameEvent::RoundComplete { stats });
    }

    fn finish_lose(&mut self, reason: EndReason) {
        let now = self.scheduler.now_ms();
        self.state.update_clock(now);
        self.state.end_lose(reason, now);
        self.scheduler.cancel_all();

        let stats = self.state.result_stats();
        info!(
            round_id = self.round_seq,
            reason = reason.as_str(),
            score = stats.score,
            "Round over"
        );
        self.emit(GameEvent::RoundOver { reason, stats });
    }

    fn recover(&mut self, method: &str, err: GameError) {
        error!(round_id = self.round_seq, method, error = %err, "Invalid transition, resetting round");
        self.emit(GameEvent::Error {
            method: method.to_string(),
            cause: err.to_string(),
        });
        if err.is_recoverable() {
            self.reset_round();
        }
    }
}
