use crate::adapter::ChartAdapter;
use crate::config::{ChartConfig, InitialUpdate};
use crate::element::ElementRef;
use crate::error::{AdapterOp, ChartError, Result};
use crate::geometry::Rect;
use crate::host::HostTask;
use crate::scheduler::{DebounceOutcome, Debouncer, SettleOutcome, SharedScheduler, TaskId};
use crate::watch::{ChangeWatcher, WatchedState};
use std::time::Instant;

/// Where a controller is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No handle yet; waiting for the element to become ready
    Uninitialized,
    /// Handle is live
    Initialized,
    /// Terminal; no adapter call will ever be made again
    Destroyed,
}

/// Owns a chart handle and drives the adapter through init, update, resize
/// and destroy.
///
/// Every entry point checks the destroyed flag before anything else, so a
/// timer or notification that was queued before teardown and fires after it
/// is a no-op. Updates go through a single-slot debouncer and read the data
/// current at fire time; resizes bypass it.
pub struct LifecycleController<A: ChartAdapter> {
    adapter: A,
    element: ElementRef<A::Element>,
    handle: Option<A::Handle>,
    destroyed: bool,
    state: WatchedState<A::Data, A::Settings>,
    watcher: ChangeWatcher<WatchedState<A::Data, A::Settings>>,
    debouncer: Debouncer,
    initial_update: InitialUpdate,
    scheduler: SharedScheduler<HostTask>,
}

impl<A> LifecycleController<A>
where
    A: ChartAdapter,
    A::Element: Clone,
    A::Data: PartialEq + Clone,
    A::Settings: PartialEq + Clone,
{
    pub fn new(
        adapter: A,
        element: ElementRef<A::Element>,
        data: A::Data,
        settings: Option<A::Settings>,
        config: &ChartConfig,
        scheduler: SharedScheduler<HostTask>,
    ) -> Self {
        let state = WatchedState::new(data, settings);
        let watcher = ChangeWatcher::new(&state);
        Self {
            adapter,
            element,
            handle: None,
            destroyed: false,
            state,
            watcher,
            debouncer: Debouncer::new(config.debounce_delay(), config.debounce_mode),
            initial_update: config.initial_update,
            scheduler,
        }
    }

    pub fn lifecycle(&self) -> LifecycleState {
        if self.destroyed {
            LifecycleState::Destroyed
        } else if self.handle.is_some() {
            LifecycleState::Initialized
        } else {
            LifecycleState::Uninitialized
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn handle(&self) -> Option<&A::Handle> {
        self.handle.as_ref()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn data(&self) -> &A::Data {
        &self.state.data
    }

    pub fn settings(&self) -> Option<&A::Settings> {
        self.state.settings.as_ref()
    }

    /// Task ID of the armed debounce timer, if any
    pub fn pending_update(&self) -> Option<TaskId> {
        self.debouncer.pending()
    }

    /// Replace the live data; takes effect for change detection on the next
    /// `on_render`
    pub fn set_data(&mut self, data: A::Data) {
        self.state.data = data;
    }

    pub fn set_settings(&mut self, settings: Option<A::Settings>) {
        self.state.settings = settings;
    }

    /// Element is available: create the chart and kick off its first update
    ///
    /// Returns whether init ran. A no-op when a handle exists, after destroy,
    /// or when the element slot is empty.
    pub fn on_ready(&mut self, now: Instant) -> Result<bool> {
        if self.destroyed {
            tracing::debug!("ready after destroy ignored");
            return Ok(false);
        }
        if self.handle.is_some() {
            return Ok(false);
        }
        let Some(element) = self.element.get() else {
            tracing::debug!("ready without a mounted element ignored");
            return Ok(false);
        };

        let handle = self
            .adapter
            .init(&element, &self.state.data, self.state.settings.as_ref())
            .map_err(|e| ChartError::adapter(AdapterOp::Init, e))?;
        self.handle = Some(handle);
        tracing::debug!("chart initialized");

        match self.initial_update {
            InitialUpdate::Debounced => self.request_update(now)?,
            InitialUpdate::Immediate => {
                self.on_update()?;
            }
        }
        Ok(true)
    }

    /// Host re-rendered: compare watched state and schedule an update if it
    /// changed while a handle exists
    pub fn on_render(&mut self, now: Instant) -> Result<bool> {
        if self.destroyed {
            return Ok(false);
        }
        let changed = self.watcher.evaluate(&self.state, |_, _| {
            tracing::trace!("watched chart state changed");
        });
        if changed && self.handle.is_some() {
            self.request_update(now)?;
        }
        Ok(changed)
    }

    /// Ask for an update through the debouncer
    pub fn request_update(&mut self, now: Instant) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        let outcome = {
            let mut scheduler = self.scheduler.borrow_mut();
            self.debouncer.request(&mut *scheduler, HostTask::Debounce, now)
        };
        match outcome {
            DebounceOutcome::Scheduled { replaced, .. } => {
                if replaced.is_some() {
                    tracing::trace!("pending chart update replaced");
                }
            }
            DebounceOutcome::FireNow => {
                self.on_update()?;
            }
            DebounceOutcome::Suppressed => {
                tracing::trace!("chart update suppressed inside quiet window");
            }
        }
        Ok(())
    }

    /// A debounce timer owned by this controller fired
    pub fn on_timer(&mut self, task: TaskId) -> Result<bool> {
        if self.destroyed {
            tracing::debug!(task = task.as_u64(), "timer after destroy ignored");
            return Ok(false);
        }
        match self.debouncer.settle(task) {
            SettleOutcome::Fire => self.on_update(),
            SettleOutcome::Released => Ok(false),
            SettleOutcome::Stale => {
                tracing::trace!(task = task.as_u64(), "stale debounce timer");
                Ok(false)
            }
        }
    }

    /// Push the current data and settings into the chart
    pub fn on_update(&mut self) -> Result<bool> {
        if self.destroyed {
            tracing::debug!("update after destroy ignored");
            return Ok(false);
        }
        let Some(handle) = self.handle.as_mut() else {
            return Ok(false);
        };
        self.adapter
            .update(handle, &self.state.data, self.state.settings.as_ref())
            .map_err(|e| ChartError::adapter(AdapterOp::Update, e))?;
        tracing::trace!("chart updated");
        Ok(true)
    }

    /// Element size changed; forwarded to the adapter immediately
    pub fn on_resize(&mut self, size: Option<Rect>) -> Result<bool> {
        if self.destroyed {
            tracing::debug!("resize after destroy ignored");
            return Ok(false);
        }
        let Some(handle) = self.handle.as_mut() else {
            return Ok(false);
        };
        self.adapter
            .resize(handle, &self.state.data, size)
            .map_err(|e| ChartError::adapter(AdapterOp::Resize, e))?;
        tracing::trace!(?size, "chart resized");
        Ok(true)
    }

    /// Tear down; runs at most once per controller
    ///
    /// The flag flips before the adapter is touched so anything firing during
    /// or after teardown short-circuits. The handle is consumed even when the
    /// adapter's destroy fails.
    pub fn on_destroy(&mut self) -> Result<bool> {
        if self.destroyed {
            return Ok(false);
        }
        self.destroyed = true;
        {
            let mut scheduler = self.scheduler.borrow_mut();
            self.debouncer.cancel(&mut *scheduler);
        }

        if let Some(handle) = self.handle.take() {
            self.adapter
                .destroy(handle)
                .map_err(|e| ChartError::adapter(AdapterOp::Destroy, e))?;
            tracing::debug!("chart destroyed");
        }
        Ok(true)
    }
}
