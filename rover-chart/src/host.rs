use crate::adapter::ChartAdapter;
use crate::config::ChartConfig;
use crate::container::{ContainerFrame, ContainerProps, ContainerView};
use crate::controller::LifecycleController;
use crate::element::{ElementRef, HostElement};
use crate::error::{ChartError, Result};
use crate::events::{ChartEvent, EventQueue, SharedEventQueue};
use crate::geometry::Rect;
use crate::resize::ResizeSource;
use crate::scheduler::{Scheduler, SharedScheduler};
use std::time::Instant;

/// Work items on the host scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostTask {
    /// Deferred readiness measurement after mount
    Ready,
    /// Debounced chart update
    Debounce,
}

type RectCallback = Box<dyn FnMut(Rect)>;
type UnitCallback = Box<dyn FnMut()>;

/// Optional observers of container notifications
///
/// They run before the controller sees Ready and Resize, and after it has
/// torn down on Destroy.
#[derive(Default)]
pub struct HostCallbacks {
    on_ready: Option<RectCallback>,
    on_resize: Option<RectCallback>,
    on_destroy: Option<UnitCallback>,
}

impl HostCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_ready(mut self, f: impl FnMut(Rect) + 'static) -> Self {
        self.on_ready = Some(Box::new(f));
        self
    }

    pub fn on_resize(mut self, f: impl FnMut(Rect) + 'static) -> Self {
        self.on_resize = Some(Box::new(f));
        self
    }

    pub fn on_destroy(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_destroy = Some(Box::new(f));
        self
    }
}

/// One hosted chart: container, lifecycle controller and the loop state that
/// connects them
///
/// Single-threaded and clock-agnostic: callers pass `now` into every
/// operation and drive timers with `tick`.
pub struct ChartHost<A, S>
where
    A: ChartAdapter,
    A::Element: HostElement,
{
    controller: LifecycleController<A>,
    container: ContainerView<A::Element>,
    scheduler: SharedScheduler<HostTask>,
    events: SharedEventQueue,
    source: S,
    callbacks: HostCallbacks,
}

impl<A, S> ChartHost<A, S>
where
    A: ChartAdapter,
    A::Element: HostElement,
    A::Data: PartialEq + Clone,
    A::Settings: PartialEq + Clone,
    S: ResizeSource<A::Element>,
{
    pub fn new(
        adapter: A,
        data: A::Data,
        settings: Option<A::Settings>,
        config: &ChartConfig,
        props: ContainerProps,
        source: S,
    ) -> Self {
        let scheduler = Scheduler::shared();
        let events = EventQueue::shared();
        let element = ElementRef::new();

        let controller = LifecycleController::new(
            adapter,
            element.clone(),
            data,
            settings,
            config,
            scheduler.clone(),
        );
        let container = ContainerView::new(props, element, events.clone(), scheduler.clone());

        Self {
            controller,
            container,
            scheduler,
            events,
            source,
            callbacks: HostCallbacks::default(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: HostCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn controller(&self) -> &LifecycleController<A> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LifecycleController<A> {
        &mut self.controller
    }

    pub fn container(&self) -> &ContainerView<A::Element> {
        &self.container
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn scheduler(&self) -> SharedScheduler<HostTask> {
        self.scheduler.clone()
    }

    /// When the loop should next call `tick`
    ///
    /// Queued events (a resize reported by the native source between ticks)
    /// make the host due immediately, so this is `now` while any are waiting.
    pub fn next_wake_time(&self, now: Instant) -> Option<Instant> {
        if self.has_pending_events() {
            return Some(now);
        }
        self.scheduler.borrow().next_wake_time()
    }

    pub fn has_pending_timers(&self) -> bool {
        self.scheduler.borrow().has_pending()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.borrow().is_empty()
    }

    /// False once there is nothing left for `tick` to do
    pub fn has_pending_work(&self) -> bool {
        self.has_pending_timers() || self.has_pending_events()
    }

    /// Attach the element; readiness is reported on the first `tick` at or
    /// after `now`
    pub fn mount(&mut self, element: A::Element, now: Instant) {
        self.container.mount(element, &mut self.source, now);
    }

    pub fn set_data(&mut self, data: A::Data) {
        self.controller.set_data(data);
    }

    pub fn set_settings(&mut self, settings: Option<A::Settings>) {
        self.controller.set_settings(settings);
    }

    pub fn set_props(&mut self, props: ContainerProps) {
        self.container.set_props(props);
    }

    /// Render pass: diff watched state, re-measure after commit, deliver any
    /// resulting events and return the frame to draw
    pub fn render(&mut self, now: Instant) -> Result<ContainerFrame> {
        let mut first_err = None;
        let changed = self.controller.on_render(now);
        report(changed.map(|_| ()), &mut first_err);

        self.container.commit();
        self.dispatch_events(now, &mut first_err);

        match first_err {
            Some(err) => Err(err),
            None => Ok(self.container.render()),
        }
    }

    /// Run everything due at `now`, then drain the event queue
    ///
    /// Failures are logged and processing continues; the first one is
    /// returned.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        let mut first_err = None;

        let due = self.scheduler.borrow_mut().tick(now);
        for (task, kind) in due {
            match kind {
                HostTask::Ready => {
                    self.container.fire_ready(task);
                }
                HostTask::Debounce => {
                    let fired = self.controller.on_timer(task);
                    report(fired.map(|_| ()), &mut first_err);
                }
            }
        }

        self.dispatch_events(now, &mut first_err);
        first_err.map_or(Ok(()), Err)
    }

    /// Tick through every timer due up to and including `deadline`
    pub fn advance_to(&mut self, deadline: Instant) -> Result<()> {
        let mut first_err = None;
        loop {
            let Some(wake) = self.scheduler.borrow().next_wake_time() else {
                break;
            };
            if wake > deadline {
                break;
            }
            if let Err(err) = self.tick(wake) {
                first_err.get_or_insert(err);
            }
        }
        if let Err(err) = self.tick(deadline) {
            first_err.get_or_insert(err);
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Detach the element and tear the chart down
    pub fn unmount(&mut self, now: Instant) -> Result<()> {
        let mut first_err = None;
        if self.container.unmount(&mut self.source) {
            self.dispatch_events(now, &mut first_err);
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Deliver queued events in FIFO order, including any pushed while
    /// delivering
    fn dispatch_events(&mut self, now: Instant, first_err: &mut Option<ChartError>) {
        loop {
            let batch = self.events.borrow_mut().take_all();
            if batch.is_empty() {
                break;
            }
            for event in batch {
                tracing::trace!(kind = event.kind(), "dispatching chart event");
                match event {
                    ChartEvent::Ready(rect) => {
                        if let Some(cb) = self.callbacks.on_ready.as_mut() {
                            cb(rect);
                        }
                        report(self.controller.on_ready(now).map(|_| ()), first_err);
                    }
                    ChartEvent::Resize(rect) => {
                        if let Some(cb) = self.callbacks.on_resize.as_mut() {
                            cb(rect);
                        }
                        report(self.controller.on_resize(Some(rect)).map(|_| ()), first_err);
                    }
                    ChartEvent::Destroy => {
                        report(self.controller.on_destroy().map(|_| ()), first_err);
                        if let Some(cb) = self.callbacks.on_destroy.as_mut() {
                            cb();
                        }
                    }
                }
            }
        }
    }
}

impl<A, S> Drop for ChartHost<A, S>
where
    A: ChartAdapter,
    A::Element: HostElement,
{
    fn drop(&mut self) {
        if self.container.is_mounted() {
            tracing::warn!("chart host dropped while mounted; call unmount first");
        }
    }
}

fn report(result: Result<()>, first_err: &mut Option<ChartError>) {
    if let Err(err) = result {
        tracing::error!(error = %err, "chart callback failed");
        if first_err.is_none() {
            *first_err = Some(err);
        }
    }
}
