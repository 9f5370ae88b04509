use crate::geometry::Rect;
use std::cell::RefCell;
use std::rc::Rc;

/// A hosted UI element a chart is drawn into
///
/// Implementations are cheap handles (an ID or a shared reference into the
/// host's view tree). Equality is element identity.
pub trait HostElement: Clone + PartialEq + 'static {
    /// Current on-screen bounding box
    fn bounding_rect(&self) -> Rect;
}

/// Slot holding the element while it is mounted
///
/// Shared between the container, which fills and clears it across mount and
/// unmount, and the controller, which reads it when initializing the chart.
#[derive(Debug)]
pub struct ElementRef<E> {
    slot: Rc<RefCell<Option<E>>>,
}

impl<E> Clone for ElementRef<E> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<E> Default for ElementRef<E> {
    fn default() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }
}

impl<E: Clone> ElementRef<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<E> {
        self.slot.borrow().clone()
    }

    pub fn set(&self, element: E) {
        *self.slot.borrow_mut() = Some(element);
    }

    pub fn take(&self) -> Option<E> {
        self.slot.borrow_mut().take()
    }

    pub fn is_available(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ref_shares_slot() {
        let a: ElementRef<u32> = ElementRef::new();
        let b = a.clone();

        assert!(!b.is_available());
        a.set(7);
        assert_eq!(b.get(), Some(7));

        assert_eq!(b.take(), Some(7));
        assert!(!a.is_available());
    }
}
