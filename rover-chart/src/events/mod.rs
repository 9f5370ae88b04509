mod queue;

pub use queue::{EventQueue, SharedEventQueue};

use crate::geometry::Rect;

/// Lifecycle notifications emitted by a container toward its host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartEvent {
    /// Element measured after mount; emitted once per mount
    Ready(Rect),
    /// Element dimensions changed
    Resize(Rect),
    /// Element unmounted
    Destroy,
}

impl ChartEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChartEvent::Ready(_) => "ready",
            ChartEvent::Resize(_) => "resize",
            ChartEvent::Destroy => "destroy",
        }
    }

    pub fn rect(&self) -> Option<Rect> {
        match self {
            ChartEvent::Ready(rect) | ChartEvent::Resize(rect) => Some(*rect),
            ChartEvent::Destroy => None,
        }
    }
}
