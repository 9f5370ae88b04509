mod manual;

pub use manual::ManualResizeSource;

use crate::element::HostElement;
use crate::events::{ChartEvent, SharedEventQueue};
use crate::geometry::{Rect, SizeSnapshot};
use std::cell::RefCell;
use std::rc::Rc;

/// Payload-free notification that an observed element may have resized
pub type ResizeCallback = Rc<dyn Fn()>;

/// External source of resize notifications (native observer, polling loop,
/// test double)
///
/// Delivery is at-least-once with no ordering guarantee across sources.
pub trait ResizeSource<E> {
    fn subscribe(&mut self, element: &E, callback: ResizeCallback);
    fn unsubscribe(&mut self, element: &E, callback: &ResizeCallback);
}

struct Subscription<E> {
    element: E,
    callback: ResizeCallback,
}

/// Turns native notifications and post-render measurements into resize events
///
/// Both channels share one size snapshot and only emit
/// `ChartEvent::Resize` when the measured (width, height) differs from it.
/// The render-time channel catches layout that settles without the observed
/// element firing its own notification, such as the end of a drag.
pub struct ResizeObserverBridge<E> {
    snapshot: Rc<RefCell<SizeSnapshot>>,
    events: SharedEventQueue,
    subscription: Option<Subscription<E>>,
}

impl<E: HostElement> ResizeObserverBridge<E> {
    pub fn new(events: SharedEventQueue) -> Self {
        Self {
            snapshot: Rc::new(RefCell::new(SizeSnapshot::new())),
            events,
            subscription: None,
        }
    }

    /// Subscribe `element` on `source`
    ///
    /// Attaching the element that is already attached is a no-op; attaching a
    /// different one first detaches the old subscription.
    pub fn attach<S>(&mut self, source: &mut S, element: &E)
    where
        S: ResizeSource<E> + ?Sized,
    {
        if let Some(sub) = &self.subscription {
            if sub.element == *element {
                return;
            }
            self.detach(source);
        }

        let observed = element.clone();
        let snapshot = Rc::clone(&self.snapshot);
        let events = Rc::clone(&self.events);
        let callback: ResizeCallback = Rc::new(move || {
            let rect = observed.bounding_rect();
            emit_if_changed(&snapshot, &events, rect);
        });

        source.subscribe(element, Rc::clone(&callback));
        tracing::debug!("resize bridge attached");
        self.subscription = Some(Subscription {
            element: element.clone(),
            callback,
        });
    }

    /// Remove the subscription; returns false when nothing was attached
    pub fn detach<S>(&mut self, source: &mut S) -> bool
    where
        S: ResizeSource<E> + ?Sized,
    {
        let Some(sub) = self.subscription.take() else {
            return false;
        };
        source.unsubscribe(&sub.element, &sub.callback);
        tracing::debug!("resize bridge detached");
        true
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Render-time diff channel: re-measure after a commit
    pub fn measure(&self, element: &E) -> Option<Rect> {
        self.observe(element.bounding_rect())
    }

    /// Feed a measurement through the shared snapshot
    pub fn observe(&self, rect: Rect) -> Option<Rect> {
        emit_if_changed(&self.snapshot, &self.events, rect)
    }

    pub fn last_size(&self) -> Option<Rect> {
        self.snapshot.borrow().last()
    }

    /// Forget the recorded size so the next measurement seeds it again
    pub fn reset(&self) {
        self.snapshot.borrow_mut().reset();
    }
}

impl<E> Drop for ResizeObserverBridge<E> {
    fn drop(&mut self) {
        if self.subscription.is_some() {
            tracing::warn!("resize bridge dropped while still subscribed");
        }
    }
}

fn emit_if_changed(
    snapshot: &RefCell<SizeSnapshot>,
    events: &SharedEventQueue,
    rect: Rect,
) -> Option<Rect> {
    let changed = snapshot.borrow_mut().record(rect)?;
    tracing::trace!(width = changed.width, height = changed.height, "element resized");
    events.borrow_mut().push(ChartEvent::Resize(changed));
    Some(changed)
}
