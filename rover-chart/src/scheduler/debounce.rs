use super::{Scheduler, TaskId};
use crate::config::DebounceMode;
use std::time::{Duration, Instant};

/// Result of a debounce request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceOutcome {
    /// A trailing timer is armed; `replaced` is the slot it superseded
    Scheduled {
        task: TaskId,
        replaced: Option<TaskId>,
    },
    /// Leading edge: the caller should run the work now
    FireNow,
    /// Leading edge inside the quiet window: nothing to run
    Suppressed,
}

/// What a fired debounce timer means for its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Current trailing slot: run the work
    Fire,
    /// Current leading slot: quiet window over, nothing to run
    Released,
    /// Timer of a replaced or cancelled slot
    Stale,
}

/// Single-slot debouncer
///
/// Holds at most one pending task. A new request cancels and replaces the
/// pending one, so only the timer of the latest request can settle as
/// `Fire`. The debounced work itself is never captured here; the owner runs
/// it against live state when the slot fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    mode: DebounceMode,
    pending: Option<TaskId>,
}

impl Debouncer {
    pub fn new(delay: Duration, mode: DebounceMode) -> Self {
        Self {
            delay,
            mode,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn mode(&self) -> DebounceMode {
        self.mode
    }

    pub fn pending(&self) -> Option<TaskId> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Request the debounced work, arming `payload` as the slot's timer
    pub fn request<T>(
        &mut self,
        scheduler: &mut Scheduler<T>,
        payload: T,
        now: Instant,
    ) -> DebounceOutcome {
        let replaced = self.pending.take();
        if let Some(old) = replaced {
            scheduler.cancel(old);
        }
        let task = scheduler.schedule_delay(payload, self.delay, now);
        self.pending = Some(task);

        match self.mode {
            DebounceMode::Trailing => DebounceOutcome::Scheduled { task, replaced },
            DebounceMode::Leading if replaced.is_some() => DebounceOutcome::Suppressed,
            DebounceMode::Leading => DebounceOutcome::FireNow,
        }
    }

    /// Classify a fired timer and clear the slot if it was the current one
    pub fn settle(&mut self, task: TaskId) -> SettleOutcome {
        if self.pending != Some(task) {
            return SettleOutcome::Stale;
        }
        self.pending = None;
        match self.mode {
            DebounceMode::Trailing => SettleOutcome::Fire,
            DebounceMode::Leading => SettleOutcome::Released,
        }
    }

    /// Drop the pending slot, cancelling its timer
    pub fn cancel<T>(&mut self, scheduler: &mut Scheduler<T>) -> bool {
        match self.pending.take() {
            Some(task) => {
                scheduler.cancel(task);
                true
            }
            None => false,
        }
    }
}
