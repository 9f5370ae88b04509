//! Lifecycle coordination for imperative chart engines hosted in a UI tree
//!
//! A `ChartHost` mounts an element, waits for layout to settle, creates the
//! chart through a `ChartAdapter`, debounces data-driven updates, forwards
//! size changes and tears everything down exactly once.

pub mod adapter;
pub mod config;
pub mod container;
pub mod controller;
pub mod element;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod lua;
pub mod resize;
pub mod scheduler;
pub mod watch;

// Re-export key types
pub use adapter::ChartAdapter;
pub use config::{ChartConfig, DebounceMode, InitialUpdate};
pub use container::{ContainerFrame, ContainerProps, ContainerView};
pub use controller::{LifecycleController, LifecycleState};
pub use element::{ElementRef, HostElement};
pub use error::{AdapterOp, ChartError, Result};
pub use events::ChartEvent;
pub use geometry::{Rect, SizeSnapshot};
pub use host::{ChartHost, HostCallbacks, HostTask};
pub use lua::{LuaChartAdapter, LuaChartHandle};
pub use resize::{ManualResizeSource, ResizeCallback, ResizeObserverBridge, ResizeSource};
pub use scheduler::{Debouncer, Scheduler, SharedScheduler, TaskId};
pub use watch::{ChangeWatcher, WatchedState};
