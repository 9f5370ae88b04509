mod debounce;
mod timer;

use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub use debounce::{DebounceOutcome, Debouncer, SettleOutcome};
pub use timer::{TaskId, Timer, TimerQueue};

/// Scheduler shared between the host loop and the components that arm timers
pub type SharedScheduler<T> = Rc<RefCell<Scheduler<T>>>;

/// Single-threaded timer scheduler
///
/// Payloads are parked by task ID until their timer comes due. Cancelling a
/// task drops its payload; correctness of callers never depends on a cancel
/// having happened, only on them re-checking their own state when a task
/// fires.
#[derive(Debug)]
pub struct Scheduler<T> {
    timers: TimerQueue,
    pending: HashMap<TaskId, T>,
    next_id: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            timers: TimerQueue::new(),
            pending: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn shared() -> SharedScheduler<T> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Schedule a payload to come due `delay` after `now`
    pub fn schedule_delay(&mut self, payload: T, delay: Duration, now: Instant) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        self.timers.schedule(id, now + delay);
        self.pending.insert(id, payload);
        id
    }

    /// Cancel a task, returning its payload if it had not fired yet
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let payload = self.pending.remove(&id)?;
        self.timers.remove(id);
        Some(payload)
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Pop every task due at `now`, in wake order
    pub fn tick(&mut self, now: Instant) -> SmallVec<[(TaskId, T); 4]> {
        self.timers
            .pop_ready(now)
            .into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|payload| (id, payload)))
            .collect()
    }

    pub fn next_wake_time(&self) -> Option<Instant> {
        self.timers.peek_wake_time()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_schedule_and_tick() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();

        let id1 = scheduler.schedule_delay("slow", Duration::from_millis(100), now);
        let id2 = scheduler.schedule_delay("fast", Duration::from_millis(50), now);
        assert_eq!(scheduler.pending_count(), 2);

        assert!(scheduler.tick(now).is_empty());

        let ready = scheduler.tick(now + Duration::from_millis(60));
        assert_eq!(ready.as_slice(), &[(id2, "fast")]);

        let ready = scheduler.tick(now + Duration::from_millis(110));
        assert_eq!(ready.as_slice(), &[(id1, "slow")]);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();

        let id = scheduler.schedule_delay(1u8, Duration::from_millis(10), now);
        assert_eq!(scheduler.cancel(id), Some(1));
        assert_eq!(scheduler.cancel(id), None);
        assert!(!scheduler.is_scheduled(id));

        assert!(scheduler.tick(now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_next_wake_time() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.next_wake_time().is_none());

        let now = Instant::now();
        scheduler.schedule_delay((), Duration::from_millis(100), now);
        scheduler.schedule_delay((), Duration::ZERO, now);

        assert_eq!(scheduler.next_wake_time(), Some(now));
    }

    #[test]
    fn test_zero_delay_fires_on_same_tick() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();
        let id = scheduler.schedule_delay("ready", Duration::ZERO, now);

        assert_eq!(scheduler.tick(now).as_slice(), &[(id, "ready")]);
    }
}
