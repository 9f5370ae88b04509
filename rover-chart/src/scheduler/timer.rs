use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Identifier of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Timer entry with wake time and the task it wakes
#[derive(Debug, Clone)]
pub struct Timer {
    pub wake_time: Instant,
    pub task: TaskId,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.wake_time == other.wake_time && self.task == other.task
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties fire in scheduling order
        other
            .wake_time
            .cmp(&self.wake_time)
            .then_with(|| other.task.cmp(&self.task))
    }
}

/// Min-heap of timers keyed by wake time
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn schedule(&mut self, task: TaskId, wake_time: Instant) {
        self.heap.push(Timer { wake_time, task });
    }

    pub fn peek_wake_time(&self) -> Option<Instant> {
        self.heap.peek().map(|timer| timer.wake_time)
    }

    /// Pop all timers that are ready (wake_time <= now)
    pub fn pop_ready(&mut self, now: Instant) -> SmallVec<[TaskId; 4]> {
        let mut ready = SmallVec::new();

        while let Some(timer) = self.heap.peek() {
            if timer.wake_time > now {
                break;
            }
            if let Some(timer) = self.heap.pop() {
                ready.push(timer.task);
            }
        }

        ready
    }

    /// Drop the timer entry for a task, if still queued
    pub fn remove(&mut self, task: TaskId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|timer| timer.task != task);
        self.heap.len() != before
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
