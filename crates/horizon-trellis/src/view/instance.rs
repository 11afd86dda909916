//! The platform side of a view.
//!
//! A view attached to a [`ViewInstance`] delegates invalidation, frame,
//! visibility and focus changes to it, and the instance converts between
//! screen and view coordinates. Instances are shared (`Arc`) and use
//! interior mutability, because platform callbacks may hold them on other
//! threads.
//!
//! [`HeadlessInstance`] and [`HeadlessPlatform`] implement the interface
//! without any windowing system. They record what the engine asked of them,
//! which is what tests and offscreen hosts need.

use std::sync::Arc;

use horizon_trellis_render::{Point, Rect, Transform2D};
use parking_lot::Mutex;

use super::node::ViewId;

/// A platform object backing one view.
pub trait ViewInstance: Send + Sync {
    /// Link this instance to `view`, or unlink it.
    fn set_view(&self, view: Option<ViewId>);

    fn view(&self) -> Option<ViewId>;

    /// Native widgets render and lay out themselves; the engine skips its
    /// own drawing and invalidation for them.
    fn is_native_widget(&self) -> bool {
        false
    }

    fn set_native_widget(&self, _native: bool) {}

    fn invalidate(&self);

    fn invalidate_rect(&self, rect: Rect);

    fn frame(&self) -> Rect;

    fn set_frame(&self, frame: Rect);

    fn set_transform(&self, transform: &Transform2D);

    fn set_visible(&self, visible: bool);

    fn set_enabled(&self, enabled: bool);

    fn set_opaque(&self, opaque: bool);

    fn set_alpha(&self, alpha: f32);

    fn set_focus(&self);

    fn convert_coordinate_from_screen_to_view(&self, point: Point) -> Point;

    fn convert_coordinate_from_view_to_screen(&self, point: Point) -> Point;

    fn add_child_instance(&self, child: &Arc<dyn ViewInstance>);

    fn remove_child_instance(&self, child: &Arc<dyn ViewInstance>);

    fn bring_to_front(&self);
}

/// Creates the generic instances views attach to.
pub trait PlatformFactory: Send + Sync {
    fn create_generic_instance(
        &self,
        view: ViewId,
        parent: Option<&Arc<dyn ViewInstance>>,
    ) -> Option<Arc<dyn ViewInstance>>;
}

/// Compare two instances by identity.
pub fn same_instance(a: &Arc<dyn ViewInstance>, b: &Arc<dyn ViewInstance>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

// =============================================================================
// Headless implementation
// =============================================================================

#[derive(Debug, Default)]
struct HeadlessState {
    view: Option<ViewId>,
    native_widget: bool,
    frame: Rect,
    transform: Option<Transform2D>,
    visible: bool,
    enabled: bool,
    opaque: bool,
    alpha: f32,
    focus_requests: usize,
    invalidate_count: usize,
    invalidated_rects: Vec<Rect>,
    children: usize,
    front_requests: usize,
    screen_origin: Point,
}

/// A [`ViewInstance`] that keeps state in memory and counts requests.
///
/// Its screen origin is configurable, so coordinate conversion through it is
/// a plain offset.
///
/// ```
/// use horizon_trellis::HeadlessInstance;
/// use horizon_trellis::ViewInstance;
/// use horizon_trellis_render::Rect;
///
/// let instance = HeadlessInstance::new();
/// instance.invalidate();
/// instance.invalidate_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
/// assert_eq!(instance.invalidate_count(), 2);
/// assert_eq!(instance.invalidated_rects(), vec![Rect::new(0.0, 0.0, 5.0, 5.0)]);
/// ```
#[derive(Debug)]
pub struct HeadlessInstance {
    state: Mutex<HeadlessState>,
}

impl Default for HeadlessInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessInstance {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HeadlessState {
                visible: true,
                enabled: true,
                alpha: 1.0,
                ..HeadlessState::default()
            }),
        }
    }

    /// A headless instance posing as a native widget.
    pub fn native_widget() -> Self {
        let instance = Self::new();
        instance.state.lock().native_widget = true;
        instance
    }

    /// Shared handle, ready for `attach`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn set_screen_origin(&self, origin: Point) {
        self.state.lock().screen_origin = origin;
    }

    /// Number of `invalidate` and `invalidate_rect` calls.
    pub fn invalidate_count(&self) -> usize {
        self.state.lock().invalidate_count
    }

    /// Rectangles passed to `invalidate_rect`, oldest first.
    pub fn invalidated_rects(&self) -> Vec<Rect> {
        self.state.lock().invalidated_rects.clone()
    }

    pub fn reset_counters(&self) {
        let mut state = self.state.lock();
        state.invalidate_count = 0;
        state.invalidated_rects.clear();
        state.focus_requests = 0;
        state.front_requests = 0;
    }

    pub fn last_transform(&self) -> Option<Transform2D> {
        self.state.lock().transform
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn is_opaque(&self) -> bool {
        self.state.lock().opaque
    }

    pub fn alpha(&self) -> f32 {
        self.state.lock().alpha
    }

    pub fn focus_requests(&self) -> usize {
        self.state.lock().focus_requests
    }

    pub fn child_instance_count(&self) -> usize {
        self.state.lock().children
    }

    pub fn front_requests(&self) -> usize {
        self.state.lock().front_requests
    }
}

impl ViewInstance for HeadlessInstance {
    fn set_view(&self, view: Option<ViewId>) {
        self.state.lock().view = view;
    }

    fn view(&self) -> Option<ViewId> {
        self.state.lock().view
    }

    fn is_native_widget(&self) -> bool {
        self.state.lock().native_widget
    }

    fn set_native_widget(&self, native: bool) {
        self.state.lock().native_widget = native;
    }

    fn invalidate(&self) {
        self.state.lock().invalidate_count += 1;
    }

    fn invalidate_rect(&self, rect: Rect) {
        let mut state = self.state.lock();
        state.invalidate_count += 1;
        state.invalidated_rects.push(rect);
    }

    fn frame(&self) -> Rect {
        self.state.lock().frame
    }

    fn set_frame(&self, frame: Rect) {
        self.state.lock().frame = frame;
    }

    fn set_transform(&self, transform: &Transform2D) {
        self.state.lock().transform = Some(*transform);
    }

    fn set_visible(&self, visible: bool) {
        self.state.lock().visible = visible;
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    fn set_opaque(&self, opaque: bool) {
        self.state.lock().opaque = opaque;
    }

    fn set_alpha(&self, alpha: f32) {
        self.state.lock().alpha = alpha;
    }

    fn set_focus(&self) {
        self.state.lock().focus_requests += 1;
    }

    fn convert_coordinate_from_screen_to_view(&self, point: Point) -> Point {
        let origin = self.state.lock().screen_origin;
        Point::new(point.x - origin.x, point.y - origin.y)
    }

    fn convert_coordinate_from_view_to_screen(&self, point: Point) -> Point {
        let origin = self.state.lock().screen_origin;
        Point::new(point.x + origin.x, point.y + origin.y)
    }

    fn add_child_instance(&self, _child: &Arc<dyn ViewInstance>) {
        self.state.lock().children += 1;
    }

    fn remove_child_instance(&self, _child: &Arc<dyn ViewInstance>) {
        let mut state = self.state.lock();
        state.children = state.children.saturating_sub(1);
    }

    fn bring_to_front(&self) {
        self.state.lock().front_requests += 1;
    }
}

/// A [`PlatformFactory`] producing [`HeadlessInstance`]s.
///
/// Every created instance is kept, so tests can inspect what the engine
/// did with the instance of a given view.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    created: Mutex<Vec<(ViewId, Arc<HeadlessInstance>)>>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last instance created for `view`.
    pub fn instance_of(&self, view: ViewId) -> Option<Arc<HeadlessInstance>> {
        self.created
            .lock()
            .iter()
            .rev()
            .find(|(id, _)| *id == view)
            .map(|(_, instance)| Arc::clone(instance))
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }
}

impl PlatformFactory for HeadlessPlatform {
    fn create_generic_instance(
        &self,
        view: ViewId,
        parent: Option<&Arc<dyn ViewInstance>>,
    ) -> Option<Arc<dyn ViewInstance>> {
        let instance = Arc::new(HeadlessInstance::new());
        self.created.lock().push((view, Arc::clone(&instance)));
        let instance: Arc<dyn ViewInstance> = instance;
        if let Some(parent) = parent {
            parent.add_child_instance(&instance);
        }
        Some(instance)
    }
}

static_assertions::assert_impl_all!(HeadlessInstance: Send, Sync);
static_assertions::assert_impl_all!(HeadlessPlatform: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_records_state() {
        let instance = HeadlessInstance::new();
        instance.set_frame(Rect::new(0.0, 0.0, 10.0, 10.0));
        instance.set_alpha(0.5);
        instance.set_visible(false);
        instance.set_focus();
        assert_eq!(instance.frame(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(instance.alpha(), 0.5);
        assert!(!instance.is_visible());
        assert_eq!(instance.focus_requests(), 1);
    }

    #[test]
    fn test_screen_conversion_is_offset() {
        let instance = HeadlessInstance::new();
        instance.set_screen_origin(Point::new(100.0, 50.0));
        let p = instance.convert_coordinate_from_view_to_screen(Point::new(1.0, 2.0));
        assert_eq!(p, Point::new(101.0, 52.0));
        assert_eq!(instance.convert_coordinate_from_screen_to_view(p), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_platform_links_children() {
        let platform = HeadlessPlatform::new();
        let parent: Arc<dyn ViewInstance> = Arc::new(HeadlessInstance::new());
        let view = ViewId::default();
        let child = platform.create_generic_instance(view, Some(&parent));
        assert!(child.is_some());
        assert_eq!(platform.created_count(), 1);
        assert!(platform.instance_of(view).is_some());
    }

    #[test]
    fn test_same_instance() {
        let a: Arc<dyn ViewInstance> = Arc::new(HeadlessInstance::new());
        let b: Arc<dyn ViewInstance> = Arc::new(HeadlessInstance::new());
        assert!(same_instance(&a, &Arc::clone(&a)));
        assert!(!same_instance(&a, &b));
    }
}
