//! Structural change detection for watched state.
//!
//! Equality is the value's own `PartialEq`, which for owned data (vectors,
//! maps, `serde_json::Value`, derived structs) is a recursive structural
//! comparison: sequences compare in order, maps compare key sets and values.
//! The stored snapshot is an owned clone, so callers mutating their copy in
//! place can never make it compare equal by accident.

/// The (data, settings) pair a chart re-renders from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WatchedState<D, S> {
    pub data: D,
    pub settings: Option<S>,
}

impl<D, S> WatchedState<D, S> {
    pub fn new(data: D, settings: Option<S>) -> Self {
        Self { data, settings }
    }
}

/// Holds the previous value of one binding and reports when it changes
#[derive(Debug, Clone)]
pub struct ChangeWatcher<T> {
    previous: T,
}

impl<T: PartialEq + Clone> ChangeWatcher<T> {
    /// Start watching with `initial` as the first snapshot
    pub fn new(initial: &T) -> Self {
        Self {
            previous: initial.clone(),
        }
    }

    pub fn previous(&self) -> &T {
        &self.previous
    }

    /// Compare `current` against the snapshot
    ///
    /// On a difference `on_change(current, previous)` runs before the
    /// snapshot is replaced by a copy of `current`. Returns whether a change
    /// was seen.
    pub fn evaluate<F>(&mut self, current: &T, on_change: F) -> bool
    where
        F: FnOnce(&T, &T),
    {
        if *current == self.previous {
            return false;
        }
        on_change(current, &self.previous);
        self.previous = current.clone();
        true
    }

    /// Like `evaluate` without a callback
    pub fn changed(&mut self, current: &T) -> bool {
        self.evaluate(current, |_, _| {})
    }
}
