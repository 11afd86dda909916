//! The view arena and the structural API: creation, parenting, frames,
//! visibility, focus, press/hover state and invalidation.
//!
//! A [`ViewTree`] owns every view. Views are addressed by [`ViewId`] and all
//! operations are methods on the tree taking the id first. Operations on a
//! stale id are no-ops and getters return their documented default; only
//! child management reports [`ViewError`]s.
//!
//! The tree is bound to one thread (the UI thread). Work coming from other
//! threads is posted through [`ViewTree::ui_handle`] and runs when the UI
//! thread calls [`ViewTree::process_pending`].

use std::sync::Arc;

use horizon_trellis_core::logging::targets;
use horizon_trellis_core::{ThreadAffinity, UiHandle, UiQueue, UiTask};
use horizon_trellis_render::{Point, Rect, Size, is_almost_zero};
use slotmap::SlotMap;
use tracing::{debug, trace};

use super::hooks::{ClickCallback, ViewHandler, ViewListener};
use super::instance::PlatformFactory;
use super::node::{BoundShape, Edges, ViewId, ViewNode, Visibility};
use crate::config::ViewTreeConfig;
use crate::error::{ViewError, ViewResult};

/// Owner of a view hierarchy.
///
/// # Example
///
/// ```
/// use horizon_trellis::ViewTree;
/// use horizon_trellis_render::Rect;
///
/// let mut tree = ViewTree::new();
/// let root = tree.create_view();
/// let child = tree.create_view();
/// tree.set_frame(root, Rect::new(0.0, 0.0, 200.0, 100.0), false);
/// tree.set_frame(child, Rect::new(10.0, 10.0, 60.0, 40.0), false);
/// tree.add_child(root, child).unwrap();
///
/// assert_eq!(tree.parent(child), Some(root));
/// assert_eq!(tree.child_at(root, (20.0, 20.0).into()), Some(child));
/// ```
pub struct ViewTree {
    pub(crate) nodes: SlotMap<ViewId, ViewNode>,
    config: ViewTreeConfig,
    affinity: ThreadAffinity,
    queue: UiQueue<ViewTree>,
    platform: Option<Arc<dyn PlatformFactory>>,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewTree")
            .field("views", &self.nodes.len())
            .field("config", &self.config)
            .field("affinity", &self.affinity)
            .field("pending", &self.queue.pending())
            .finish_non_exhaustive()
    }
}

impl ViewTree {
    /// An empty tree with default configuration, bound to the registered UI
    /// thread (or the calling thread when none is registered).
    pub fn new() -> Self {
        Self::with_config(ViewTreeConfig::default())
    }

    pub fn with_config(config: ViewTreeConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            config,
            affinity: ThreadAffinity::ui_thread(),
            queue: UiQueue::new(),
            platform: None,
        }
    }

    pub fn config(&self) -> &ViewTreeConfig {
        &self.config
    }

    /// Set the factory used by [`attach_to_new_instance`](Self::attach_to_new_instance)
    /// and child attachment.
    pub fn set_platform(&mut self, platform: Arc<dyn PlatformFactory>) {
        self.platform = Some(platform);
    }

    pub fn platform(&self) -> Option<Arc<dyn PlatformFactory>> {
        self.platform.clone()
    }

    // =========================================================================
    // UI thread
    // =========================================================================

    /// Whether the calling thread is the thread this tree is bound to.
    pub fn is_ui_thread(&self) -> bool {
        self.affinity.is_same_thread()
    }

    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Panics (while thread checks are on) when `operation` is called off the
    /// tree's thread. Used by the entry points that cannot be re-posted.
    pub(crate) fn check_ui_thread(&self, operation: &str) {
        self.affinity.check_same_thread(operation);
    }

    /// A sendable handle for posting closures that run against this tree.
    pub fn ui_handle(&self) -> UiHandle<ViewTree> {
        self.queue.handle()
    }

    /// Number of posted closures waiting to run.
    pub fn pending_tasks(&self) -> usize {
        self.queue.pending()
    }

    /// Run the closures posted so far. Closures posted while draining run on
    /// the next call. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let tasks = self.queue.take_pending();
        let count = tasks.len();
        for task in tasks {
            trace!(target: targets::DISPATCH, label = task.label(), "running posted task");
            task.run(self);
        }
        count
    }

    pub(crate) fn post_to_ui_thread<F>(&self, label: &'static str, run: F)
    where
        F: FnOnce(&mut ViewTree) + Send + 'static,
    {
        trace!(target: targets::DISPATCH, label, "posting to the ui thread");
        self.queue.post(UiTask::labeled(label, run));
    }

    // =========================================================================
    // Creation and destruction
    // =========================================================================

    /// A plain view: no handler, no attribute blocks, zero frame.
    pub fn create_view(&mut self) -> ViewId {
        self.insert_node(ViewNode::new(None))
    }

    pub fn create_view_with_handler(&mut self, handler: Box<dyn ViewHandler>) -> ViewId {
        self.insert_node(ViewNode::new(Some(handler)))
    }

    /// A container view: it lays out its children and creates instances for
    /// them when attached.
    pub fn create_group(&mut self) -> ViewId {
        let id = self.create_view();
        self.set_creating_child_instances(id, true);
        self.set_making_layout(id, true);
        id
    }

    fn insert_node(&mut self, node: ViewNode) -> ViewId {
        let id = self.nodes.insert(node);
        trace!(target: targets::TREE, ?id, "created view");
        id
    }

    /// Destroy a view and its whole subtree.
    ///
    /// The view is removed from its parent, detached from its instance and
    /// its animations are released. Ids held elsewhere become stale.
    pub fn destroy_view(&mut self, id: ViewId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if let Some(parent) = node.parent {
            if self.is_child_of(parent, id) {
                let _ = self.remove_child(parent, id);
            }
        }
        self.destroy_subtree(id);
    }

    fn destroy_subtree(&mut self, id: ViewId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let mut owned = node.children.clone();
        if let Some(scroll) = node.scroll.as_deref() {
            owned.extend(scroll.horizontal_bar);
            owned.extend(scroll.vertical_bar);
        }
        for child in owned {
            self.destroy_subtree(child);
        }
        self.detach(id);
        self.detach_animations(id);
        self.nodes.remove(id);
        trace!(target: targets::TREE, ?id, "destroyed view");
    }

    /// Whether `id` names a live view.
    pub fn contains(&self, id: ViewId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Replace the view's handler. The old one is returned.
    pub fn set_handler(&mut self, id: ViewId, handler: Box<dyn ViewHandler>) -> Option<Box<dyn ViewHandler>> {
        let node = self.nodes.get_mut(id)?;
        node.handler.replace(handler)
    }

    pub fn set_listener(&mut self, id: ViewId, listener: Option<Arc<dyn ViewListener>>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.listener = listener;
        }
    }

    /// Callback run at the end of [`dispatch_click`](Self::dispatch_click).
    pub fn set_on_click(&mut self, id: ViewId, callback: Option<ClickCallback>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.on_click = callback;
        }
    }

    pub fn name(&self, id: ViewId) -> Option<&str> {
        self.nodes.get(id).and_then(|node| node.name.as_deref())
    }

    pub fn set_name(&mut self, id: ViewId, name: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = Some(name.into());
        }
    }

    /// Depth-first search of the subtree rooted at `id` (itself included).
    pub fn find_view_by_name(&self, id: ViewId, name: &str) -> Option<ViewId> {
        let node = self.nodes.get(id)?;
        if node.name.as_deref() == Some(name) {
            return Some(id);
        }
        node.children
            .iter()
            .find_map(|&child| self.find_view_by_name(child, name))
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Snapshot of the child list, back to front.
    pub fn children(&self, id: ViewId) -> Vec<ViewId> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn child_count(&self, id: ViewId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.children.len())
    }

    pub fn is_root_view(&self, id: ViewId) -> bool {
        self.parent(id).is_none()
    }

    /// The topmost ancestor of `id` (`id` itself for a root).
    pub fn root_view(&self, id: ViewId) -> ViewId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    pub(crate) fn is_child_of(&self, parent: ViewId, child: ViewId) -> bool {
        self.nodes
            .get(parent)
            .is_some_and(|node| node.children.contains(&child))
    }

    fn is_ancestor_of(&self, ancestor: ViewId, id: ViewId) -> bool {
        let mut current = Some(id);
        while let Some(view) = current {
            if view == ancestor {
                return true;
            }
            current = self.parent(view);
        }
        false
    }

    /// Append `child` at the front of `parent`'s children.
    ///
    /// Adding a view that is already a child of `parent` does nothing.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) -> ViewResult<()> {
        let index = self.child_count(parent);
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` (clamped to the child count).
    pub fn insert_child(&mut self, parent: ViewId, index: usize, child: ViewId) -> ViewResult<()> {
        if !self.nodes.contains_key(parent) {
            return Err(ViewError::ViewNotFound(parent));
        }
        let Some(child_node) = self.nodes.get(child) else {
            return Err(ViewError::ViewNotFound(child));
        };
        match child_node.parent {
            Some(current) if current == parent && self.is_child_of(parent, child) => return Ok(()),
            Some(_) => return Err(ViewError::AlreadyHasParent(child)),
            None => {}
        }
        if self.is_ancestor_of(child, parent) {
            return Err(ViewError::WouldCreateCycle { parent, child });
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        self.on_child_added(parent, child);
        Ok(())
    }

    fn on_child_added(&mut self, parent: ViewId, child: ViewId) {
        trace!(target: targets::TREE, ?parent, ?child, "added child");
        self.set_focus(child, false, false);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if self.nodes.get(parent).is_some_and(|node| node.on_add_child_enabled) {
            self.call_handler(parent, |handler, tree| handler.on_add_child(tree, parent, child));
        }
        self.request_layout(parent, false);
        if self.has_instance(parent) {
            self.attach_child_by_mode(parent, child);
        }
        self.update_and_invalidate_bounds_in_parent(child, false);
        self.invalidate(parent);
    }

    /// Remove `child` from `parent`, detaching its instance.
    pub fn remove_child(&mut self, parent: ViewId, child: ViewId) -> ViewResult<()> {
        if !self.nodes.contains_key(parent) {
            return Err(ViewError::ViewNotFound(parent));
        }
        if !self.is_child_of(parent, child) {
            return Err(ViewError::NotAChild { parent, child });
        }
        self.unlink_child(parent, child);
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != child);
            if node.child_mouse_down == Some(child) {
                node.child_mouse_down = None;
            }
            if node.child_mouse_move == Some(child) {
                node.child_mouse_move = None;
            }
            node.children_multi_touch.retain(|&c| c != child);
        }
        if self.nodes.get(parent).is_some_and(|node| node.focused_child == Some(child)) {
            self.set_focused_child(parent, None, false);
        }
        self.request_layout(parent, true);
        Ok(())
    }

    fn unlink_child(&mut self, parent: ViewId, child: ViewId) {
        trace!(target: targets::TREE, ?parent, ?child, "removing child");
        if self.nodes.get(parent).is_some_and(|node| node.on_remove_child_enabled) {
            self.call_handler(parent, |handler, tree| handler.on_remove_child(tree, parent, child));
        }
        let child_instance = self.nodes.get(child).and_then(|node| node.instance.clone());
        if let Some(child_instance) = child_instance {
            if let Some(instance) = self.nodes.get(parent).and_then(|node| node.instance.clone()) {
                instance.remove_child_instance(&child_instance);
            }
            self.detach(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            if node.parent == Some(parent) {
                node.parent = None;
            }
        }
    }

    /// Remove every child of `id`.
    ///
    /// Off the UI thread, a view backed by an instance re-posts the removal
    /// to the UI thread instead.
    pub fn remove_all_children(&mut self, id: ViewId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let children = node.children.clone();
        if node.instance.is_some() {
            if !self.is_ui_thread() {
                debug!(target: targets::TREE, ?id, "remove_all_children off the ui thread, re-posting");
                self.post_to_ui_thread("remove_all_children", move |tree| tree.remove_all_children(id));
                return;
            }
            for &child in &children {
                self.unlink_child(id, child);
            }
        } else {
            for &child in &children {
                if let Some(node) = self.nodes.get_mut(child) {
                    if node.parent == Some(id) {
                        node.parent = None;
                    }
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.child_mouse_down = None;
            node.child_mouse_move = None;
            node.children_multi_touch.clear();
            node.children.clear();
        }
        self.set_focused_child(id, None, false);
        self.request_layout(id, true);
    }

    pub fn remove_from_parent(&mut self, id: ViewId) {
        if let Some(parent) = self.parent(id) {
            let _ = self.remove_child(parent, id);
        }
    }

    /// Move `id` to the front of its siblings (last in the child list).
    pub fn bring_to_front(&mut self, id: ViewId) {
        let instance = self.nodes.get(id).and_then(|node| node.instance.clone());
        if let Some(parent) = self.parent(id) {
            let moved = match self.nodes.get_mut(parent) {
                Some(node) => match node.children.iter().position(|&c| c == id) {
                    Some(index) => {
                        node.children.remove(index);
                        node.children.push(id);
                        true
                    }
                    None => false,
                },
                None => false,
            };
            if moved && instance.is_none() {
                self.invalidate_bounds_in_parent(id);
            }
        }
        if let Some(instance) = instance {
            instance.bring_to_front();
        }
    }

    /// The topmost visible, hit-testable child under `point` (in `id`'s
    /// coordinates).
    pub fn child_at(&self, id: ViewId, point: Point) -> Option<ViewId> {
        let node = self.nodes.get(id)?;
        node.children.iter().rev().copied().find(|&child| {
            self.nodes
                .get(child)
                .is_some_and(|c| c.is_visible() && c.hit_testable)
                && self.hit_test(child, self.convert_coordinate_from_parent(child, point))
        })
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// The frame in parent coordinates.
    pub fn frame(&self, id: ViewId) -> Rect {
        self.nodes.get(id).map_or(Rect::ZERO, |node| node.frame)
    }

    pub fn set_frame(&mut self, id: ViewId, frame: Rect, redraw: bool) {
        self.set_frame_internal(id, frame, redraw, false);
    }

    /// Move and resize. `layouting` is set when the layout solver applies a
    /// resolved frame, which must not re-request layout of the parent.
    pub(crate) fn set_frame_internal(&mut self, id: ViewId, frame: Rect, redraw: bool, layouting: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let old = node.frame;
        let frame = frame.fixed();

        let not_move_x = is_almost_zero(old.left - frame.left);
        let not_move_y = is_almost_zero(old.top - frame.top);
        let not_resize_width = is_almost_zero(old.width() - frame.width());
        let not_resize_height = is_almost_zero(old.height() - frame.height());
        if not_move_x && not_move_y && not_resize_width && not_resize_height {
            return;
        }
        let resized = !(not_resize_width && not_resize_height);

        node.frame = frame;
        if let Some(instance) = node.instance.as_ref() {
            instance.set_frame(frame);
        }

        let has_layout = match node.layout.as_deref_mut() {
            Some(layout) => {
                if !layouting {
                    layout.frame = frame;
                }
                layout.invalid_measure = true;
                if resized {
                    layout.invalid_layout = true;
                }
                true
            }
            None => false,
        };
        let parent = node.parent;
        if has_layout {
            if !layouting {
                match parent {
                    Some(parent) => self.request_layout(parent, false),
                    None => self.request_make_layout(id),
                }
            }
        } else {
            self.request_parent_layout(id, false);
        }

        if resized {
            self.dispatch_resize(id, frame.width(), frame.height());
            if redraw {
                self.invalidate_layer(id);
            }
        }
        self.update_and_invalidate_bounds_in_parent(id, redraw);
    }

    pub fn width(&self, id: ViewId) -> f32 {
        self.nodes.get(id).map_or(0.0, |node| node.width())
    }

    pub fn height(&self, id: ViewId) -> f32 {
        self.nodes.get(id).map_or(0.0, |node| node.height())
    }

    pub fn size(&self, id: ViewId) -> Size {
        Size::new(self.width(id), self.height(id))
    }

    pub fn set_width(&mut self, id: ViewId, width: f32, redraw: bool) {
        let f = self.frame(id);
        self.set_frame(id, Rect::from_xywh(f.left, f.top, width, f.height()), redraw);
    }

    pub fn set_height(&mut self, id: ViewId, height: f32, redraw: bool) {
        let f = self.frame(id);
        self.set_frame(id, Rect::from_xywh(f.left, f.top, f.width(), height), redraw);
    }

    pub fn set_size(&mut self, id: ViewId, width: f32, height: f32, redraw: bool) {
        let f = self.frame(id);
        self.set_frame(id, Rect::from_xywh(f.left, f.top, width, height), redraw);
    }

    pub fn set_left(&mut self, id: ViewId, x: f32, redraw: bool) {
        let f = self.frame(id);
        self.set_frame(id, Rect::from_xywh(x, f.top, f.width(), f.height()), redraw);
    }

    pub fn set_top(&mut self, id: ViewId, y: f32, redraw: bool) {
        let f = self.frame(id);
        self.set_frame(id, Rect::from_xywh(f.left, y, f.width(), f.height()), redraw);
    }

    pub fn set_position(&mut self, id: ViewId, x: f32, y: f32, redraw: bool) {
        let f = self.frame(id);
        self.set_frame(id, Rect::from_xywh(x, y, f.width(), f.height()), redraw);
    }

    /// `(0, 0, width, height)`.
    pub fn bounds(&self, id: ViewId) -> Rect {
        self.nodes.get(id).map_or(Rect::ZERO, |node| node.bounds())
    }

    /// The bounds inset by the padding, normalized.
    pub fn bounds_inner_padding(&self, id: ViewId) -> Rect {
        let Some(node) = self.nodes.get(id) else {
            return Rect::ZERO;
        };
        let p = node.padding;
        Rect::new(p.left, p.top, node.width() - p.right, node.height() - p.bottom).fixed()
    }

    /// The footprint in the parent, transform included, as last updated.
    pub fn bounds_in_parent(&self, id: ViewId) -> Rect {
        self.nodes.get(id).map_or(Rect::ZERO, |node| node.bounds_in_parent)
    }

    pub fn padding(&self, id: ViewId) -> Edges {
        self.nodes.get(id).map_or(Edges::ZERO, |node| node.padding)
    }

    /// Recompute the footprint in the parent, invalidating the old and new
    /// areas there when `invalidate` is set.
    pub(crate) fn update_and_invalidate_bounds_in_parent(&mut self, id: ViewId, invalidate: bool) {
        let Some(parent) = self.parent(id) else {
            if let Some(node) = self.nodes.get_mut(id) {
                node.bounds_in_parent = Rect::ZERO;
            }
            return;
        };
        let bounds_new = self.convert_rect_to_parent(id, self.bounds(id));
        if invalidate && !self.check_self_invalidatable(id) {
            let old = self.bounds_in_parent(id);
            if old.width() > 0.0 && old.height() > 0.0 {
                let bounds_new = bounds_new.inflate(self.config.bounds_invalidate_inflation);
                self.set_bounds_in_parent(id, bounds_new);
                if old.intersects(&bounds_new) {
                    self.invalidate_rect(parent, old.union(&bounds_new));
                } else {
                    self.invalidate_rect(parent, old);
                    self.invalidate_rect(parent, bounds_new);
                }
            } else {
                self.set_bounds_in_parent(id, bounds_new);
                self.invalidate_rect(parent, bounds_new);
            }
        } else {
            self.set_bounds_in_parent(id, bounds_new);
        }
    }

    fn set_bounds_in_parent(&mut self, id: ViewId, bounds: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.bounds_in_parent = bounds;
        }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub(crate) fn dispatch_resize(&mut self, id: ViewId, width: f32, height: f32) {
        self.refresh_scroll(id, false);
        self.call_handler(id, |handler, tree| handler.on_resize(tree, id, width, height));
        if let Some(listener) = self.listener(id) {
            listener.on_resize(self, id, width, height);
        }
        if let Some(parent) = self.parent(id) {
            self.call_handler(parent, |handler, tree| {
                handler.on_resize_child(tree, parent, id, width, height)
            });
        }
    }

    pub(crate) fn dispatch_change_visibility(&mut self, id: ViewId, old: Visibility, new: Visibility) {
        self.call_handler(id, |handler, tree| handler.on_change_visibility(tree, id, old, new));
        if let Some(listener) = self.listener(id) {
            listener.on_change_visibility(self, id, old, new);
        }
        if let Some(parent) = self.parent(id) {
            self.call_handler(parent, |handler, tree| {
                handler.on_change_visibility_of_child(tree, parent, id, old, new)
            });
        }
    }

    // =========================================================================
    // Visibility and interaction state
    // =========================================================================

    pub fn visibility(&self, id: ViewId) -> Visibility {
        self.nodes.get(id).map_or(Visibility::Gone, |node| node.visibility)
    }

    pub fn set_visibility(&mut self, id: ViewId, visibility: Visibility, redraw: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let old = node.visibility;
        node.visibility = visibility;
        let instance = node.instance.clone();
        if let Some(instance) = instance.as_ref() {
            instance.set_visible(visibility == Visibility::Visible);
        }
        if old != visibility {
            match visibility {
                Visibility::Visible | Visibility::Hidden => {
                    if old == Visibility::Gone {
                        self.request_parent_and_self_layout(id, false);
                    }
                }
                Visibility::Gone => self.request_parent_layout(id, false),
            }
            self.dispatch_change_visibility(id, old, visibility);
        }
        if instance.is_none() && redraw {
            self.invalidate_bounds_in_parent(id);
        }
    }

    pub fn is_visible(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.is_visible())
    }

    /// `true` shows the view, `false` makes it [`Visibility::Gone`].
    pub fn set_visible(&mut self, id: ViewId, visible: bool, redraw: bool) {
        let visibility = if visible { Visibility::Visible } else { Visibility::Gone };
        self.set_visibility(id, visibility, redraw);
    }

    pub fn is_enabled(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.enabled)
    }

    pub fn set_enabled(&mut self, id: ViewId, enabled: bool, redraw: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.enabled = enabled;
        match node.instance.clone() {
            Some(instance) => instance.set_enabled(enabled),
            None => {
                if redraw {
                    self.invalidate(id);
                }
            }
        }
    }

    pub fn is_hit_testable(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.hit_testable)
    }

    pub fn set_hit_testable(&mut self, id: ViewId, hit_testable: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.hit_testable = hit_testable;
        }
    }

    /// Whether `point` (local coordinates) lies inside the view's bound
    /// shape. Path shapes test against the bounds.
    pub fn hit_test(&self, id: ViewId, point: Point) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let rc = node.bounds();
        match node.bound_shape() {
            BoundShape::RoundRect => {
                let radius = node
                    .draw
                    .as_ref()
                    .map_or(self.config.default_round_rect_radius, |d| d.round_rect_radius);
                contains_point_in_round_rect(point, &rc, radius)
            }
            BoundShape::Ellipse => contains_point_in_ellipse(point, &rc),
            _ => rc.contains_point(point),
        }
    }

    pub fn is_pressed_state(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.pressed)
    }

    pub fn set_pressed_state(&mut self, id: ViewId, pressed: bool, redraw: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.pressed != pressed {
            node.pressed = pressed;
            if redraw {
                self.invalidate(id);
            }
        }
    }

    pub fn is_hover_state(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.hover)
    }

    /// Hover only repaints when a distinct hover background is set.
    pub fn set_hover_state(&mut self, id: ViewId, hover: bool, redraw: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.hover == hover {
            return;
        }
        node.hover = hover;
        let distinct_hover = node.draw.as_deref().is_some_and(|draw| match &draw.background_hover {
            Some(hover) => !draw
                .background
                .as_ref()
                .is_some_and(|background| Arc::ptr_eq(background, hover)),
            None => false,
        });
        if redraw && distinct_hover {
            self.invalidate(id);
        }
    }

    pub fn is_occurring_click(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.occurring_click)
    }

    /// Views that occur clicks track press state and claim the press, so no
    /// ancestor also starts a click.
    pub fn set_occurring_click(&mut self, id: ViewId, occurring: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.occurring_click = occurring;
        }
    }

    pub fn is_on_add_child_enabled(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.on_add_child_enabled)
    }

    pub fn set_on_add_child_enabled(&mut self, id: ViewId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.on_add_child_enabled = enabled;
        }
    }

    pub fn is_on_remove_child_enabled(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.on_remove_child_enabled)
    }

    pub fn set_on_remove_child_enabled(&mut self, id: ViewId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.on_remove_child_enabled = enabled;
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn is_focusable(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.focusable)
    }

    pub fn set_focusable(&mut self, id: ViewId, focusable: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.focusable = focusable;
        }
    }

    pub fn is_focused(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.focused)
    }

    pub fn focused_child(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(id).and_then(|node| node.focused_child)
    }

    /// Focus or unfocus the view.
    ///
    /// Focusing links the whole ancestor chain through `focused_child`, so
    /// key events reach this view from the root. Unfocusing clears the
    /// focus of the view's own focused descendants.
    pub fn set_focus(&mut self, id: ViewId, focused: bool, redraw: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.focused = focused;
        let parent = node.parent;
        if focused {
            if let Some(instance) = node.instance.clone() {
                instance.set_focus();
            }
        } else {
            self.kill_focus_from_parent(id);
        }
        if let Some(parent) = parent {
            if focused {
                self.set_focused_child(parent, Some(id), redraw);
                return;
            }
            if let Some(node) = self.nodes.get_mut(parent) {
                if node.focused_child == Some(id) {
                    node.focused_child = None;
                }
            }
        }
        if redraw {
            self.invalidate(id);
        }
    }

    fn kill_focus_from_parent(&mut self, id: ViewId) {
        let mut current = Some(id);
        while let Some(view) = current {
            current = match self.nodes.get_mut(view) {
                Some(node) => {
                    node.focused = false;
                    node.focused_child.take()
                }
                None => None,
            };
        }
    }

    pub(crate) fn set_focused_child(&mut self, id: ViewId, child: Option<ViewId>, redraw: bool) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let old = node.focused_child;
        if old != child {
            if let Some(old) = old {
                self.kill_focus_from_parent(old);
            }
            if let Some(node) = self.nodes.get_mut(id) {
                node.focused_child = child;
            }
        }
        if child.is_some() {
            let parent = match self.nodes.get_mut(id) {
                Some(node) => {
                    node.focused = true;
                    node.parent
                }
                None => None,
            };
            if let Some(parent) = parent {
                self.set_focused_child(parent, Some(id), redraw);
                return;
            }
        }
        if redraw {
            self.invalidate(id);
        }
    }

    /// Follow `focused_child` links from `id` down to the deepest focused
    /// view.
    pub fn focused_descendant(&self, id: ViewId) -> Option<ViewId> {
        let mut current = self.focused_child(id)?;
        while let Some(next) = self.focused_child(current) {
            current = next;
        }
        Some(current)
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    pub(crate) fn has_instance(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.instance.is_some())
    }

    /// Views with their own instance repaint through it, not through the
    /// parent.
    fn check_self_invalidatable(&self, id: ViewId) -> bool {
        self.has_instance(id)
    }

    /// Request a repaint of the whole view.
    pub fn invalidate(&mut self, id: ViewId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.is_native_widget() {
            return;
        }
        if !(node.width() > 0.0 && node.height() > 0.0) {
            return;
        }
        if node.current_drawing
            && node.rect_current_drawing.contains_rect(&node.bounds())
            && self.is_ui_thread()
        {
            trace!(target: targets::DRAW, ?id, "invalidate absorbed by the paint in progress");
            return;
        }
        let instance = node.instance.clone();
        let parent = node.parent;
        let bounds_in_parent = node.bounds_in_parent;
        self.invalidate_layer(id);
        match (instance, parent) {
            (Some(instance), _) => instance.invalidate(),
            (None, Some(parent)) => self.invalidate_rect(parent, bounds_in_parent),
            (None, None) => {}
        }
    }

    /// Request a repaint of `rect` (local coordinates), clipped to the
    /// bounds.
    pub fn invalidate_rect(&mut self, id: ViewId, rect: Rect) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.is_native_widget() {
            return;
        }
        let Some(rect) = node.bounds().intersect(&rect) else {
            return;
        };
        if node.current_drawing && node.rect_current_drawing.contains_rect(&rect) && self.is_ui_thread() {
            trace!(target: targets::DRAW, ?id, ?rect, "invalidate absorbed by the paint in progress");
            return;
        }
        let instance = node.instance.clone();
        let parent = node.parent;
        self.invalidate_layer_rect(id, rect);
        match (instance, parent) {
            (Some(instance), _) => instance.invalidate_rect(rect),
            (None, Some(parent)) => {
                let in_parent = self.convert_rect_to_parent(id, rect);
                self.invalidate_rect(parent, in_parent);
            }
            (None, None) => {}
        }
    }

    /// Repaint the area the view last occupied in its parent.
    pub fn invalidate_bounds_in_parent(&mut self, id: ViewId) {
        if self.check_self_invalidatable(id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            let bounds = self.bounds_in_parent(id);
            self.invalidate_rect(parent, bounds);
        }
    }
}

fn contains_point_in_ellipse(point: Point, rc: &Rect) -> bool {
    let rx = rc.width() / 2.0;
    let ry = rc.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let center = rc.center();
    let dx = (point.x - center.x) / rx;
    let dy = (point.y - center.y) / ry;
    dx * dx + dy * dy <= 1.0
}

fn contains_point_in_round_rect(point: Point, rc: &Rect, radius: Size) -> bool {
    if !rc.contains_point(point) {
        return false;
    }
    let rx = radius.width.min(rc.width() / 2.0).max(0.0);
    let ry = radius.height.min(rc.height() / 2.0).max(0.0);
    if rx <= 0.0 || ry <= 0.0 {
        return true;
    }
    let cx = if point.x < rc.left + rx {
        rc.left + rx
    } else if point.x > rc.right - rx {
        rc.right - rx
    } else {
        return true;
    };
    let cy = if point.y < rc.top + ry {
        rc.top + ry
    } else if point.y > rc.bottom - ry {
        rc.bottom - ry
    } else {
        return true;
    };
    let corner = Rect::new(cx - rx, cy - ry, cx + rx, cy + ry);
    contains_point_in_ellipse(point, &corner)
}

static_assertions::assert_impl_all!(ViewTree: Send);
static_assertions::assert_not_impl_any!(ViewTree: Sync);
static_assertions::assert_impl_all!(UiHandle<ViewTree>: Send, Sync);
static_assertions::assert_impl_all!(ViewId: Copy, Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_contains() {
        let rc = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(contains_point_in_ellipse(Point::new(50.0, 25.0), &rc));
        assert!(contains_point_in_ellipse(Point::new(99.0, 25.0), &rc));
        assert!(!contains_point_in_ellipse(Point::new(2.0, 2.0), &rc));
    }

    #[test]
    fn test_round_rect_corners() {
        let rc = Rect::new(0.0, 0.0, 100.0, 100.0);
        let radius = Size::new(20.0, 20.0);
        assert!(contains_point_in_round_rect(Point::new(50.0, 1.0), &rc, radius));
        assert!(contains_point_in_round_rect(Point::new(20.0, 20.0), &rc, radius));
        assert!(!contains_point_in_round_rect(Point::new(1.0, 1.0), &rc, radius));
        assert!(!contains_point_in_round_rect(Point::new(150.0, 50.0), &rc, radius));
    }

    #[test]
    fn test_root_view_and_names() {
        let mut tree = ViewTree::new();
        let a = tree.create_view();
        let b = tree.create_view();
        let c = tree.create_view();
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();
        tree.set_name(c, "leaf");
        assert_eq!(tree.root_view(c), a);
        assert_eq!(tree.find_view_by_name(a, "leaf"), Some(c));
        assert_eq!(tree.find_view_by_name(b, "missing"), None);
    }

    #[test]
    fn test_insert_child_errors() {
        let mut tree = ViewTree::new();
        let a = tree.create_view();
        let b = tree.create_view();
        let c = tree.create_view();
        tree.add_child(a, b).unwrap();
        assert_eq!(tree.add_child(a, b), Ok(()));
        assert_eq!(tree.child_count(a), 1);
        assert_eq!(tree.add_child(c, b), Err(ViewError::AlreadyHasParent(b)));
        assert_eq!(
            tree.add_child(b, a),
            Err(ViewError::WouldCreateCycle { parent: b, child: a })
        );
        assert_eq!(tree.remove_child(c, b), Err(ViewError::NotAChild { parent: c, child: b }));
        tree.destroy_view(c);
        assert_eq!(tree.add_child(a, c), Err(ViewError::ViewNotFound(c)));
    }

    #[test]
    fn test_destroy_view_removes_subtree() {
        let mut tree = ViewTree::new();
        let root = tree.create_view();
        let mid = tree.create_view();
        let leaf = tree.create_view();
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        tree.destroy_view(mid);
        assert!(!tree.contains(mid));
        assert!(!tree.contains(leaf));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_bring_to_front() {
        let mut tree = ViewTree::new();
        let root = tree.create_view();
        let a = tree.create_view();
        let b = tree.create_view();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.bring_to_front(a);
        assert_eq!(tree.children(root), vec![b, a]);
    }

    #[test]
    fn test_bounds_inner_padding_is_normalized() {
        let mut tree = ViewTree::new();
        let v = tree.create_view();
        tree.set_frame(v, Rect::new(0.0, 0.0, 10.0, 10.0), false);
        tree.set_padding(v, Edges::uniform(8.0));
        let inner = tree.bounds_inner_padding(v);
        assert!(inner.right >= inner.left);
        assert!(inner.bottom >= inner.top);
    }
}
