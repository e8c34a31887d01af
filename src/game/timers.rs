use std::collections::BTreeMap;
use std::time::Duration;

/// Deferred work of a round. Closed set so nothing captures stale state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    Evaluate,
    HideMismatch { indices: Vec<usize> },
    RestoreAfterBomb,
    PreviewTick,
    ClockTick,
    BonusReveal,
    BonusHide { indices: Vec<usize> },
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Evaluate => "evaluate",
            Task::HideMismatch { .. } => "hide_mismatch",
            Task::RestoreAfterBomb => "restore_after_bomb",
            Task::PreviewTick => "preview_tick",
            Task::ClockTick => "clock_tick",
            Task::BonusReveal => "bonus_reveal",
            Task::BonusHide { .. } => "bonus_hide",
        }
    }
}

#[derive(Clone, Debug)]
struct Scheduled {
    generation: u64,
    task: Task,
}

/// Virtual millisecond clock plus the pending tasks keyed to it.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    seq: u64,
    generation: u64,
    pending: BTreeMap<(u64, u64), Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule_in(&mut self, delay_ms: u64, task: Task) {
        let due = self.now_ms.saturating_add(delay_ms);
        let key = (due, self.seq);
        self.seq += 1;
        self.pending.insert(
            key,
            Scheduled {
                generation: self.generation,
                task,
            },
        );
    }

    /// Drops every pending task. Anything stamped before this call can no
    /// longer fire.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.generation += 1;
        dropped
    }

    /// Pops the earliest task due at or before `until_ms`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Task> {
        loop {
            let (&(due, seq), _) = self.pending.first_key_value()?;
            if due > until_ms {
                return None;
            }
            let scheduled = self.pending.remove(&(due, seq))?;
            self.now_ms = self.now_ms.max(due);
            if scheduled.generation == self.generation {
                return Some(scheduled.task);
            }
        }
    }

    /// Moves the clock forward without firing anything.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending
            .keys()
            .next()
            .map(|&(due, _)| Duration::from_millis(due.saturating_sub(self.now_ms)))
    }
}
