use super::{ResizeCallback, ResizeSource};
use std::rc::Rc;

/// Resize source driven by explicit `notify` calls
///
/// Serves hosts without a native observer (drive it from a polling loop or
/// a window-resize hook) and doubles as the test source.
pub struct ManualResizeSource<E> {
    subscriptions: Vec<(E, ResizeCallback)>,
}

impl<E: PartialEq> ManualResizeSource<E> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Invoke every callback registered for `element`; returns how many ran
    pub fn notify(&self, element: &E) -> usize {
        let callbacks: Vec<ResizeCallback> = self
            .subscriptions
            .iter()
            .filter(|(el, _)| el == element)
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    /// Invoke every registered callback
    pub fn notify_all(&self) -> usize {
        let callbacks: Vec<ResizeCallback> =
            self.subscriptions.iter().map(|(_, cb)| Rc::clone(cb)).collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn subscriptions_for(&self, element: &E) -> usize {
        self.subscriptions.iter().filter(|(el, _)| el == element).count()
    }
}

impl<E: PartialEq> Default for ManualResizeSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PartialEq + Clone> ResizeSource<E> for ManualResizeSource<E> {
    fn subscribe(&mut self, element: &E, callback: ResizeCallback) {
        let exists = self
            .subscriptions
            .iter()
            .any(|(el, cb)| el == element && Rc::ptr_eq(cb, &callback));
        if !exists {
            self.subscriptions.push((element.clone(), callback));
        }
    }

    fn unsubscribe(&mut self, element: &E, callback: &ResizeCallback) {
        self.subscriptions
            .retain(|(el, cb)| !(el == element && Rc::ptr_eq(cb, callback)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut source = ManualResizeSource::new();
        let cb: ResizeCallback = Rc::new(|| {});

        source.subscribe(&1u32, Rc::clone(&cb));
        source.subscribe(&1u32, Rc::clone(&cb));
        assert_eq!(source.subscription_count(), 1);

        source.unsubscribe(&1u32, &cb);
        source.unsubscribe(&1u32, &cb);
        assert_eq!(source.subscription_count(), 0);
    }

    #[test]
    fn test_notify_targets_element() {
        let mut source = ManualResizeSource::new();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        source.subscribe(&1u32, Rc::new(move || counter.set(counter.get() + 1)));
        source.subscribe(&2u32, Rc::new(|| {}));

        assert_eq!(source.notify(&1), 1);
        assert_eq!(source.notify(&3), 0);
        assert_eq!(source.notify_all(), 2);
        assert_eq!(hits.get(), 2);
    }
}
