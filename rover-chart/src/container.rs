use crate::element::{ElementRef, HostElement};
use crate::events::{ChartEvent, SharedEventQueue};
use crate::geometry::Rect;
use crate::host::HostTask;
use crate::resize::{ResizeObserverBridge, ResizeSource};
use crate::scheduler::{SharedScheduler, TaskId};
use smallvec::SmallVec;
use smartstring::alias::String as SmartString;
use std::time::{Duration, Instant};

pub const ROOT_CLASS: &str = "chart-container";
pub const LOADING_CLASS: &str = "chart-container-loading";
pub const SPIN_CLASS: &str = "chart-container-loading-spin";

/// Presentation options for the hosted element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerProps {
    /// Extra class appended to the root element
    pub class_name: Option<SmartString>,
    /// Whether the loading overlay is shown
    pub loading: bool,
    /// Content rendered inside the overlay
    pub spin_icon: Option<SmartString>,
    /// Keys of host nodes rendered inside the container, ahead of the overlay
    pub children: Vec<SmartString>,
}

impl ContainerProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_name(mut self, class_name: impl Into<SmartString>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn spin_icon(mut self, icon: impl Into<SmartString>) -> Self {
        self.spin_icon = Some(icon.into());
        self
    }

    pub fn child(mut self, key: impl Into<SmartString>) -> Self {
        self.children.push(key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub visible: bool,
    pub spin_icon: Option<SmartString>,
}

impl OverlayFrame {
    pub fn class_name(&self) -> &'static str {
        LOADING_CLASS
    }

    pub fn display(&self) -> &'static str {
        if self.visible { "flex" } else { "none" }
    }

    /// Class of the wrapper around the spin icon
    pub fn spin_class(&self) -> &'static str {
        SPIN_CLASS
    }
}

/// What the container renders on a pass
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerFrame {
    pub class_list: SmartString,
    pub children: Vec<SmartString>,
    pub overlay: OverlayFrame,
}

/// Wrapper around the element a chart lives in
///
/// Fills the shared element slot on mount, reports readiness once per mount
/// from that mount's own zero-delay task so layout settles before measuring,
/// keeps the resize bridge subscribed while mounted, and reports destroy on
/// unmount.
/// Notifications go out as `ChartEvent`s on the host queue.
pub struct ContainerView<E: HostElement> {
    props: ContainerProps,
    element: ElementRef<E>,
    bridge: ResizeObserverBridge<E>,
    events: SharedEventQueue,
    scheduler: SharedScheduler<HostTask>,
    ready_tasks: SmallVec<[TaskId; 2]>,
    mounted: bool,
}

impl<E: HostElement> ContainerView<E> {
    pub fn new(
        props: ContainerProps,
        element: ElementRef<E>,
        events: SharedEventQueue,
        scheduler: SharedScheduler<HostTask>,
    ) -> Self {
        let bridge = ResizeObserverBridge::new(events.clone());
        Self {
            props,
            element,
            bridge,
            events,
            scheduler,
            ready_tasks: SmallVec::new(),
            mounted: false,
        }
    }

    pub fn props(&self) -> &ContainerProps {
        &self.props
    }

    pub fn set_props(&mut self, props: ContainerProps) {
        self.props = props;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn element(&self) -> Option<E> {
        self.element.get()
    }

    pub fn bridge(&self) -> &ResizeObserverBridge<E> {
        &self.bridge
    }

    /// Mounts whose readiness has not been reported yet
    pub fn pending_ready(&self) -> usize {
        self.ready_tasks.len()
    }

    pub fn mount<S>(&mut self, element: E, source: &mut S, now: Instant)
    where
        S: ResizeSource<E> + ?Sized,
    {
        if self.mounted {
            tracing::warn!("container mounted twice; ignoring");
            return;
        }
        self.mounted = true;
        self.element.set(element.clone());
        self.bridge.attach(source, &element);
        self.commit();

        let task = self
            .scheduler
            .borrow_mut()
            .schedule_delay(HostTask::Ready, Duration::ZERO, now);
        self.ready_tasks.push(task);
        tracing::debug!("container mounted");
    }

    /// Deferred readiness measurement
    ///
    /// Reports once for each mount's task. If the element is gone by now
    /// the reported rectangle is zero-sized.
    pub fn fire_ready(&mut self, task: TaskId) -> Option<Rect> {
        let pos = self.ready_tasks.iter().position(|t| *t == task)?;
        self.ready_tasks.remove(pos);

        let rect = self
            .element
            .get()
            .map(|el| el.bounding_rect().sanitized())
            .unwrap_or(Rect::ZERO);
        self.events.borrow_mut().push(ChartEvent::Ready(rect));
        Some(rect)
    }

    /// Post-render hook: re-measure and emit a resize if the size moved
    pub fn commit(&mut self) -> Option<Rect> {
        let element = self.element.get()?;
        self.bridge.measure(&element)
    }

    pub fn render(&self) -> ContainerFrame {
        let mut class_list = SmartString::from(ROOT_CLASS);
        if let Some(extra) = self.props.class_name.as_deref().filter(|c| !c.is_empty()) {
            class_list.push(' ');
            class_list.push_str(extra);
        }
        ContainerFrame {
            class_list,
            children: self.props.children.clone(),
            overlay: OverlayFrame {
                visible: self.props.loading,
                spin_icon: self.props.spin_icon.clone(),
            },
        }
    }

    /// Returns false when the container was not mounted
    pub fn unmount<S>(&mut self, source: &mut S) -> bool
    where
        S: ResizeSource<E> + ?Sized,
    {
        if !self.mounted {
            return false;
        }
        self.mounted = false;
        self.bridge.detach(source);
        self.bridge.reset();
        self.element.take();
        self.events.borrow_mut().push(ChartEvent::Destroy);
        tracing::debug!("container unmounted");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;
    use crate::resize::ManualResizeSource;
    use crate::scheduler::Scheduler;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct Panel {
        size: Rc<Cell<Rect>>,
    }

    impl PartialEq for Panel {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.size, &other.size)
        }
    }

    impl HostElement for Panel {
        fn bounding_rect(&self) -> Rect {
            self.size.get()
        }
    }

    fn panel(w: f64, h: f64) -> Panel {
        Panel {
            size: Rc::new(Cell::new(Rect::new(w, h))),
        }
    }

    struct Fixture {
        view: ContainerView<Panel>,
        events: SharedEventQueue,
        scheduler: SharedScheduler<HostTask>,
        source: ManualResizeSource<Panel>,
    }

    fn fixture(props: ContainerProps) -> Fixture {
        let events = EventQueue::shared();
        let scheduler = Scheduler::shared();
        let view = ContainerView::new(props, ElementRef::new(), events.clone(), scheduler.clone());
        Fixture {
            view,
            events,
            scheduler,
            source: ManualResizeSource::new(),
        }
    }

    #[test]
    fn test_ready_is_deferred_and_reported_once() {
        let mut fx = fixture(ContainerProps::new());
        let now = Instant::now();
        fx.view.mount(panel(400.0, 300.0), &mut fx.source, now);
        assert!(fx.events.borrow().is_empty());

        let due = fx.scheduler.borrow_mut().tick(now);
        assert_eq!(due.len(), 1);
        let task = due[0].0;

        assert_eq!(fx.view.fire_ready(task), Some(Rect::new(400.0, 300.0)));
        assert_eq!(fx.view.fire_ready(task), None);
        assert_eq!(
            fx.events.borrow_mut().take_all(),
            vec![ChartEvent::Ready(Rect::new(400.0, 300.0))]
        );
    }

    #[test]
    fn test_ready_after_unmount_reports_zero_rect() {
        let mut fx = fixture(ContainerProps::new());
        let now = Instant::now();
        fx.view.mount(panel(400.0, 300.0), &mut fx.source, now);
        fx.view.unmount(&mut fx.source);

        let due = fx.scheduler.borrow_mut().tick(now);
        assert_eq!(fx.view.fire_ready(due[0].0), Some(Rect::ZERO));
        assert_eq!(
            fx.events.borrow_mut().take_all(),
            vec![ChartEvent::Destroy, ChartEvent::Ready(Rect::ZERO)]
        );
    }

    #[test]
    fn test_remount_before_ready_reports_each_mount() {
        let mut fx = fixture(ContainerProps::new());
        let now = Instant::now();
        fx.view.mount(panel(100.0, 50.0), &mut fx.source, now);
        fx.view.unmount(&mut fx.source);
        fx.view.mount(panel(200.0, 80.0), &mut fx.source, now);
        assert_eq!(fx.view.pending_ready(), 2);

        let due = fx.scheduler.borrow_mut().tick(now);
        let reported: Vec<Rect> = due
            .iter()
            .filter_map(|(task, _)| fx.view.fire_ready(*task))
            .collect();

        // Both measure the element mounted at fire time
        assert_eq!(reported, vec![Rect::new(200.0, 80.0); 2]);
        assert_eq!(fx.view.pending_ready(), 0);
        fx.view.unmount(&mut fx.source);
    }

    #[test]
    fn test_mount_seeds_snapshot_and_commit_diffs() {
        let mut fx = fixture(ContainerProps::new());
        let el = panel(400.0, 300.0);
        fx.view.mount(el.clone(), &mut fx.source, Instant::now());
        assert_eq!(fx.view.bridge().last_size(), Some(Rect::new(400.0, 300.0)));

        assert_eq!(fx.view.commit(), None);
        el.size.set(Rect::new(400.0, 320.0));
        assert_eq!(fx.view.commit(), Some(Rect::new(400.0, 320.0)));
        assert_eq!(fx.view.commit(), None);
    }

    #[test]
    fn test_unmount_detaches_and_emits_destroy_once() {
        let mut fx = fixture(ContainerProps::new());
        fx.view.mount(panel(1.0, 1.0), &mut fx.source, Instant::now());
        assert_eq!(fx.source.subscription_count(), 1);

        assert!(fx.view.unmount(&mut fx.source));
        assert!(!fx.view.unmount(&mut fx.source));
        assert_eq!(fx.source.subscription_count(), 0);
        assert!(fx.view.element().is_none());

        let destroys = fx
            .events
            .borrow_mut()
            .take_all()
            .into_iter()
            .filter(|e| *e == ChartEvent::Destroy)
            .count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn test_render_class_list_and_overlay() {
        let fx = fixture(ContainerProps::new().class_name("sales").spin_icon("..."));
        let frame = fx.view.render();
        assert_eq!(frame.class_list.as_str(), "chart-container sales");
        assert!(!frame.overlay.visible);
        assert_eq!(frame.overlay.display(), "none");
        assert_eq!(frame.overlay.class_name(), LOADING_CLASS);
        assert_eq!(frame.overlay.spin_icon.as_deref(), Some("..."));
        assert!(frame.children.is_empty());
    }

    #[test]
    fn test_children_rendered_in_order() {
        let fx = fixture(ContainerProps::new().child("legend").child("tooltip"));
        let frame = fx.view.render();
        let keys: Vec<&str> = frame.children.iter().map(|c| c.as_str()).collect();
        assert_eq!(keys, vec!["legend", "tooltip"]);
    }

    #[test]
    fn test_loading_flag_toggles_overlay_only() {
        let mut fx = fixture(ContainerProps::new());
        fx.view.set_props(ContainerProps::new().loading(true));

        let frame = fx.view.render();
        assert_eq!(frame.class_list.as_str(), ROOT_CLASS);
        assert_eq!(frame.overlay.display(), "flex");
        assert!(fx.events.borrow().is_empty());
        assert_eq!(fx.scheduler.borrow().pending_count(), 0);
    }
}
