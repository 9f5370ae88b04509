use super::ChartEvent;
use std::cell::RefCell;
use std::rc::Rc;

/// Event queue shared with resize callbacks registered on external sources
pub type SharedEventQueue = Rc<RefCell<EventQueue>>;

/// FIFO queue of chart events
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<ChartEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn shared() -> SharedEventQueue {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn push(&mut self, event: ChartEvent) {
        self.events.push(event);
    }

    /// Take every queued event in FIFO order
    pub fn take_all(&mut self) -> Vec<ChartEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
