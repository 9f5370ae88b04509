use crate::geometry::Rect;

/// Capability set of a concrete rendering engine
///
/// The lifecycle controller owns the handle returned by `init` and never
/// looks inside it. While the handle is live, `update` and `resize` may be
/// called any number of times with fresh arguments; `destroy` consumes it.
/// Failures are returned as-is and propagated by the caller.
pub trait ChartAdapter {
    /// Element the chart is drawn into
    type Element;
    /// Opaque rendered instance
    type Handle;
    type Data;
    type Settings;

    fn init(
        &mut self,
        element: &Self::Element,
        data: &Self::Data,
        settings: Option<&Self::Settings>,
    ) -> anyhow::Result<Self::Handle>;

    fn update(
        &mut self,
        handle: &mut Self::Handle,
        data: &Self::Data,
        settings: Option<&Self::Settings>,
    ) -> anyhow::Result<()>;

    fn resize(
        &mut self,
        handle: &mut Self::Handle,
        data: &Self::Data,
        size: Option<Rect>,
    ) -> anyhow::Result<()>;

    fn destroy(&mut self, handle: Self::Handle) -> anyhow::Result<()>;
}
