//! Customization points: per-view handlers and application listeners.
//!
//! A [`ViewHandler`] is what a concrete widget type implements. Every method
//! has a default, so a handler only overrides the hooks it needs. Handlers
//! are owned by their view and receive the tree mutably, so a hook can read
//! and change any view, including its own.
//!
//! A [`ViewListener`] is the application side: it is shared, observes the
//! same events after the handler, and can cancel default processing with
//! [`UiEvent::prevent_default`].
//!
//! ```
//! use horizon_trellis::{UiEvent, ViewHandler, ViewId, ViewTree};
//! use horizon_trellis_render::{Canvas, Color, Rect};
//!
//! struct Swatch(Color);
//!
//! impl ViewHandler for Swatch {
//!     fn on_draw(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {
//!         let size = tree.bounds(id);
//!         canvas.fill_rect(size, self.0);
//!     }
//! }
//!
//! let mut tree = ViewTree::new();
//! let swatch = tree.create_view_with_handler(Box::new(Swatch(Color::RED)));
//! tree.set_frame(swatch, Rect::new(0.0, 0.0, 10.0, 10.0), false);
//! ```

use std::sync::Arc;

use horizon_trellis_render::Canvas;

use super::events::UiEvent;
use super::instance::ViewInstance;
use super::layout::PrepareLayoutParam;
use super::node::{ViewId, Visibility};
use super::tree::ViewTree;

/// Callback fired after a click has been dispatched to a view.
pub type ClickCallback = Arc<dyn Fn(&mut ViewTree, ViewId) + Send + Sync>;

/// Per-view behavior.
///
/// While a hook runs, the handler is taken out of its view; a re-entrant
/// call reaching the same view falls back to the default behavior.
#[allow(unused_variables)]
pub trait ViewHandler: Send {
    // =========================================================================
    // Drawing
    // =========================================================================

    /// Paint the view's content, in local coordinates after the scroll
    /// offset.
    fn on_draw(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {}

    fn on_draw_background(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {
        tree.draw_default_background(id, canvas);
    }

    fn on_draw_border(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {
        tree.draw_default_border(id, canvas);
    }

    fn on_draw_children(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {
        let children = tree.children(id);
        tree.draw_children(id, canvas, &children);
    }

    /// Runs before anything else is drawn, when enabled with
    /// `set_pre_draw_enabled`.
    fn on_pre_draw(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {}

    /// Runs after the border, when enabled with `set_post_draw_enabled`.
    fn on_post_draw(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {}

    // =========================================================================
    // Layout
    // =========================================================================

    /// Measure the content for the wrapping axes by storing the result with
    /// `set_measured_width` / `set_measured_height`.
    fn on_measure_layout(&mut self, tree: &mut ViewTree, id: ViewId, horizontal: bool, vertical: bool) {
        tree.measure_relative_layout(id, horizontal, vertical);
    }

    /// Adjust a child's resolved frame. Only called when enabled.
    fn on_prepare_layout(&mut self, tree: &mut ViewTree, id: ViewId, param: &PrepareLayoutParam) {}

    /// Position children by hand between the two prepare passes. Only called
    /// when enabled.
    fn on_make_layout(&mut self, tree: &mut ViewTree, id: ViewId) {}

    fn on_change_padding(&mut self, tree: &mut ViewTree, id: ViewId) {}

    // =========================================================================
    // Geometry and state notifications
    // =========================================================================

    fn on_resize(&mut self, tree: &mut ViewTree, id: ViewId, width: f32, height: f32) {}

    fn on_resize_child(&mut self, tree: &mut ViewTree, id: ViewId, child: ViewId, width: f32, height: f32) {}

    fn on_change_visibility(&mut self, tree: &mut ViewTree, id: ViewId, old: Visibility, new: Visibility) {}

    fn on_change_visibility_of_child(
        &mut self,
        tree: &mut ViewTree,
        id: ViewId,
        child: ViewId,
        old: Visibility,
        new: Visibility,
    ) {
    }

    fn on_scroll(&mut self, tree: &mut ViewTree, id: ViewId, x: f32, y: f32) {}

    fn on_resize_content(&mut self, tree: &mut ViewTree, id: ViewId, width: f32, height: f32) {}

    /// Only called when enabled with `set_on_add_child_enabled`.
    fn on_add_child(&mut self, tree: &mut ViewTree, id: ViewId, child: ViewId) {}

    /// Only called when enabled with `set_on_remove_child_enabled`.
    fn on_remove_child(&mut self, tree: &mut ViewTree, id: ViewId, child: ViewId) {}

    /// The view has been attached to a platform instance.
    fn on_attach(&mut self, tree: &mut ViewTree, id: ViewId) {}

    // =========================================================================
    // Input
    // =========================================================================

    fn on_click(&mut self, tree: &mut ViewTree, id: ViewId, event: &mut UiEvent) {}

    fn on_key_event(&mut self, tree: &mut ViewTree, id: ViewId, event: &mut UiEvent) {}

    /// Also receives touch events after [`on_touch_event`](Self::on_touch_event).
    fn on_mouse_event(&mut self, tree: &mut ViewTree, id: ViewId, event: &mut UiEvent) {}

    fn on_touch_event(&mut self, tree: &mut ViewTree, id: ViewId, event: &mut UiEvent) {}

    fn on_mouse_wheel_event(&mut self, tree: &mut ViewTree, id: ViewId, event: &mut UiEvent) {}

    fn on_set_cursor(&mut self, tree: &mut ViewTree, id: ViewId, event: &mut UiEvent) {}

    // =========================================================================
    // Platform instances
    // =========================================================================

    /// Create the instance this view attaches to under `parent`.
    fn create_instance(
        &mut self,
        tree: &mut ViewTree,
        id: ViewId,
        parent: Option<&Arc<dyn ViewInstance>>,
    ) -> Option<Arc<dyn ViewInstance>> {
        tree.create_default_instance(id, parent)
    }

    /// Create a native widget for views that ask for one. `None` falls back
    /// to a generic instance.
    fn create_native_widget(
        &mut self,
        tree: &mut ViewTree,
        id: ViewId,
        parent: Option<&Arc<dyn ViewInstance>>,
    ) -> Option<Arc<dyn ViewInstance>> {
        None
    }
}

/// The behavior of a view without a handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHandler;

impl ViewHandler for DefaultHandler {}

/// Application callbacks for one view.
///
/// Listener methods run after the view's own handler hook.
#[allow(unused_variables)]
pub trait ViewListener: Send + Sync {
    fn on_mouse_event(&self, tree: &mut ViewTree, view: ViewId, event: &mut UiEvent) {}

    fn on_touch_event(&self, tree: &mut ViewTree, view: ViewId, event: &mut UiEvent) {}

    fn on_key_event(&self, tree: &mut ViewTree, view: ViewId, event: &mut UiEvent) {}

    fn on_mouse_wheel_event(&self, tree: &mut ViewTree, view: ViewId, event: &mut UiEvent) {}

    fn on_set_cursor(&self, tree: &mut ViewTree, view: ViewId, event: &mut UiEvent) {}

    fn on_click(&self, tree: &mut ViewTree, view: ViewId, event: &mut UiEvent) {}

    fn on_resize(&self, tree: &mut ViewTree, view: ViewId, width: f32, height: f32) {}

    fn on_change_visibility(&self, tree: &mut ViewTree, view: ViewId, old: Visibility, new: Visibility) {}

    fn on_scroll(&self, tree: &mut ViewTree, view: ViewId, x: f32, y: f32) {}
}

impl ViewTree {
    /// Run `f` with the handler of `id`, or the default handler when the
    /// view has none or its handler is already running.
    pub(crate) fn call_handler<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut dyn ViewHandler, &mut ViewTree) -> R,
    ) -> R {
        let taken = self.nodes.get_mut(id).and_then(|node| node.handler.take());
        match taken {
            Some(mut handler) => {
                let result = f(handler.as_mut(), self);
                if let Some(node) = self.nodes.get_mut(id) {
                    if node.handler.is_none() {
                        node.handler = Some(handler);
                    }
                }
                result
            }
            None => f(&mut DefaultHandler, self),
        }
    }

    pub(crate) fn listener(&self, id: ViewId) -> Option<Arc<dyn ViewListener>> {
        self.nodes.get(id).and_then(|node| node.listener.clone())
    }
}
