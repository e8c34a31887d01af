use std::fmt;

use serde::{Deserialize, Serialize};

use super::card::{Card, Theme};
use super::config::Scoring;
use super::difficulty::DifficultyConfig;
use super::rules::Effect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Start,
    DifficultySelect,
    Preview,
    Playing,
    Result,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Complete,
    Hearts,
    Time,
    Bomb,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::Complete => "complete",
            EndReason::Hearts => "hearts",
            EndReason::Time => "time",
            EndReason::Bomb => "bomb",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Rank {
    #[default]
    C,
    B,
    A,
    S,
}

impl Rank {
    pub fn as_str(self) -> &'static str {
        match self {
            Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
        }
    }

    pub fn for_result(is_win: bool, accuracy_pct: u32) -> Self {
        if !is_win {
            return Rank::C;
        }
        if accuracy_pct >= 100 {
            Rank::S
        } else if accuracy_pct >= 85 {
            Rank::A
        } else if accuracy_pct >= 70 {
            Rank::B
        } else {
            Rank::C
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base: u32,
    pub combo: u32,
    pub time: u32,
    pub hearts: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.base + self.combo + self.time + self.hearts
    }
}

/// Read-only projection for HUDs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub phase: Phase,
    pub difficulty: Option<String>,
    pub score: u32,
    pub hearts: u32,
    pub max_hearts: u32,
    pub time_remaining: u32,
    pub preview_remaining_ms: u64,
    pub matched_sets: u32,
    pub total_sets: u32,
    pub remaining_sets: u32,
    pub attempts: u32,
    pub accuracy: u32,
    pub combo: u32,
}

impl fmt::Display for GameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode_label = self.difficulty.as_deref().unwrap_or("Memory");
        if self.phase == Phase::Preview {
            let remain = self.preview_remaining_ms as f64 / 1000.0;
            return write!(f, "{} | Memorize {:.1}s", mode_label, remain);
        }
        let mins = self.time_remaining / 60;
        let secs = self.time_remaining % 60;
        write!(
            f,
            "{} | {:02}:{:02} | score {} | hearts {}/{}",
            mode_label, mins, secs, self.score, self.hearts, self.max_hearts
        )
    }
}

/// Final numbers of a round, shaped for an external high-score store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultStats {
    pub difficulty: String,
    pub is_win: bool,
    pub end_reason: Option<EndReason>,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    pub time_remaining: u32,
    pub elapsed_secs: u32,
    pub attempts: u32,
    pub success_count: u32,
    pub fail_count: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    pub hearts: u32,
    pub max_hearts: u32,
    pub matched_sets: u32,
    pub total_sets: u32,
    pub rank: Rank,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct GameState {
    phase: Phase,
    difficulty: Option<DifficultyConfig>,
    theme: Theme,

    cards: Vec<Card>,
    selection: Vec<usize>,
    can_act: bool,
    matched_sets: u32,

    hearts: u32,
    max_hearts: u32,

    score: ScoreBreakdown,

    time_remaining_secs: u32,
    time_limit_secs: u32,
    penalty_secs: u32,
    started_at_ms: Option<u64>,
    ended_at_ms: Option<u64>,
    preview_remaining_ms: u64,

    attempts: u32,
    success_count: u32,
    fail_count: u32,
    combo: u32,
    max_combo: u32,

    is_win: bool,
    end_reason: Option<EndReason>,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            can_act: true,
            ..GameState::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Result
    }

    pub fn difficulty(&self) -> Option<&DifficultyConfig> {
        self.difficulty.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn can_act(&self) -> bool {
        self.can_act
    }

    pub fn matched_sets(&self) -> u32 {
        self.matched_sets
    }

    pub fn total_sets(&self) -> u32 {
        self.difficulty.as_ref().map_or(0, |d| d.total_sets())
    }

    pub fn remaining_sets(&self) -> u32 {
        self.total_sets().saturating_sub(self.matched_sets)
    }

    pub fn is_all_matched(&self) -> bool {
        self.difficulty.is_some() && self.matched_sets >= self.total_sets()
    }

    pub fn hearts(&self) -> u32 {
        self.hearts
    }

    pub fn max_hearts(&self) -> u32 {
        self.max_hearts
    }

    pub fn score(&self) -> u32 {
        self.score.total()
    }

    pub fn score_breakdown(&self) -> ScoreBreakdown {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining_secs
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit_secs
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn preview_remaining_ms(&self) -> u64 {
        self.preview_remaining_ms
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn success_count(&self) -> u32 {
        self.success_count
    }

    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn is_win(&self) -> bool {
        self.is_win
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Successful share of attempts, 0-100, rounded.
    pub fn accuracy(&self) -> u32 {
        if self.attempts == 0 {
            return 0;
        }
        (self.success_count as f64 / self.attempts as f64 * 100.0).round() as u32
    }

    pub fn elapsed_secs_at(&self, now_ms: u64) -> u32 {
        let Some(started) = self.started_at_ms else {
            return 0;
        };
        let end = self.ended_at_ms.unwrap_or(now_ms);
        (end.saturating_sub(started) / 1000) as u32
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            difficulty: self.difficulty.as_ref().map(|d| d.name.clone()),
            score: self.score(),
            hearts: self.hearts,
            max_hearts: self.max_hearts,
            time_remaining: self.time_remaining_secs,
            preview_remaining_ms: self.preview_remaining_ms,
            matched_sets: self.matched_sets,
            total_sets: self.total_sets(),
            remaining_sets: self.remaining_sets(),
            attempts: self.attempts,
            accuracy: self.accuracy(),
            combo: self.combo,
        }
    }

    pub fn result_stats(&self) -> ResultStats {
        let elapsed_secs = match (self.started_at_ms, self.ended_at_ms) {
            (Some(start), Some(end)) => (end.saturating_sub(start) / 1000) as u32,
            _ => 0,
        };
        ResultStats {
            difficulty: self
                .difficulty
                .as_ref()
                .map(|d| d.name.clone())
                .unwrap_or_default(),
            is_win: self.is_win,
            end_reason: self.end_reason,
            score: self.score(),
            breakdown: self.score,
            time_remaining: self.time_remaining_secs,
            elapsed_secs,
            attempts: self.attempts,
            success_count: self.success_count,
            fail_count: self.fail_count,
            accuracy: self.accuracy(),
            max_combo: self.max_combo,
            hearts: self.hearts,
            max_hearts: self.max_hearts,
            matched_sets: self.matched_sets,
            total_sets: self.total_sets(),
            rank: Rank::for_result(self.is_win, self.accuracy()),
        }
    }

    // Mutations below are driven by the round orchestrator.

    pub(crate) fn reset(&mut self) {
        *self = GameState::new();
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Installs a fresh round. Leaves the phase for the caller to choose.
    pub(crate) fn begin_round(&mut self, difficulty: DifficultyConfig, theme: Theme, cards: Vec<Card>) {
        self.reset();
        self.time_limit_secs = difficulty.time_limit_secs;
        self.time_remaining_secs = difficulty.time_limit_secs;
        self.max_hearts = difficulty.max_hearts();
        self.hearts = self.max_hearts;
        self.difficulty = Some(difficulty);
        self.theme = theme;
        self.cards = cards;
    }

    pub(crate) fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }

    pub(crate) fn start_preview(&mut self, duration_ms: u64) {
        self.phase = Phase::Preview;
        self.preview_remaining_ms = duration_ms;
        self.can_act = false;
        for card in &mut self.cards {
            card.flip_up();
        }
    }

    pub(crate) fn set_preview_remaining(&mut self, remaining_ms: u64) {
        self.preview_remaining_ms = remaining_ms;
    }

    /// Turns every unmatched card back down and returns how many moved.
    pub(crate) fn end_preview(&mut self) -> usize {
        self.preview_remaining_ms = 0;
        let mut turned = 0;
        for card in &mut self.cards {
            if card.flip_down() {
                turned += 1;
            }
        }
        turned
    }

    pub(crate) fn start_playing(&mut self, now_ms: u64) {
        self.phase = Phase::Playing;
        self.started_at_ms = Some(now_ms);
        self.can_act = true;
    }

    pub(crate) fn set_can_act(&mut self, can_act: bool) {
        self.can_act = can_act;
    }

    pub(crate) fn push_selection(&mut self, index: usize) -> usize {
        self.selection.push(index);
        self.selection.len()
    }

    pub(crate) fn take_selection(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.selection)
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    pub(crate) fn apply_effect(&mut self, effect: &Effect) {
        match effect {
            Effect::Matched {
                points,
                combo_bonus,
                ..
            } => {
                self.matched_sets += 1;
                self.success_count += 1;
                self.combo += 1;
                self.max_combo = self.max_combo.max(self.combo);
                self.score.base += points;
                self.score.combo += combo_bonus;
            }
            Effect::BonusPoints { points } => {
                self.score.base += points;
            }
            Effect::HiddenMatch { .. } => {}
            Effect::Mismatch { .. } => {
                self.fail_count += 1;
                self.combo = 0;
            }
            Effect::TimePenalty { secs } => self.apply_time_penalty(*secs),
            Effect::HeartLost => {
                self.hearts = self.hearts.saturating_sub(1);
            }
        }
    }

    pub(crate) fn reset_combo(&mut self) {
        self.combo = 0;
    }

    pub(crate) fn apply_time_penalty(&mut self, secs: u32) {
        self.penalty_secs = self.penalty_secs.saturating_add(secs);
        self.time_remaining_secs = self.time_remaining_secs.saturating_sub(secs);
    }

    /// Recomputes the countdown from the clock. Penalties stay charged.
    pub(crate) fn update_clock(&mut self, now_ms: u64) -> u32 {
        let elapsed = self.elapsed_secs_at(now_ms);
        self.time_remaining_secs = self
            .time_limit_secs
            .saturating_sub(elapsed)
            .saturating_sub(self.penalty_secs);
        self.time_remaining_secs
    }

    pub(crate) fn end_win(&mut self, now_ms: u64, scoring: &Scoring) {
        self.phase = Phase::Result;
        self.can_act = false;
        self.is_win = true;
        self.ended_at_ms = Some(now_ms);
        self.end_reason = Some(EndReason::Complete);
        self.score.time = self.time_remaining_secs * scoring.time_bonus_per_second;
        self.score.hearts = self.hearts * scoring.heart_bonus;
    }

    pub(crate) fn end_lose(&mut self, reason: EndReason, now_ms: u64) {
        self.phase = Phase::Result;
        self.can_act = false;
        self.is_win = false;
        self.ended_at_ms = Some(now_ms);
        self.end_reason = Some(reason);
    }
}
