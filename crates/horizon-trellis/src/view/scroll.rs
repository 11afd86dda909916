//! Content scrolling and scroll bars.
//!
//! A view scrolls when its content size exceeds its frame. The offset shifts
//! what `on_draw` paints; children keep their frames. Scroll bars are views
//! owned by the scrolled view: their parent is the owner but they are not in
//! its child list, so layout never sees them, and the draw and event paths
//! visit them after the children.

use horizon_trellis_core::logging::targets;
use horizon_trellis_render::{Canvas, Color, Point, Rect, Size, is_almost_zero};
use tracing::{debug, trace};

use super::events::{Keycode, UiAction, UiEvent};
use super::hooks::ViewHandler;
use super::node::{ScrollAttributes, ScrollBarAttributes, ViewId};
use super::tree::ViewTree;

impl ViewTree {
    fn scroll_attrs(&self, id: ViewId) -> Option<&ScrollAttributes> {
        self.nodes.get(id).and_then(|node| node.scroll.as_deref())
    }

    fn scroll_attrs_mut(&mut self, id: ViewId) -> Option<&mut ScrollAttributes> {
        self.nodes.get_mut(id).and_then(|node| node.scroll.as_deref_mut())
    }

    fn init_scroll_attrs(&mut self, id: ViewId) -> Option<&mut ScrollAttributes> {
        let bar_width = self.config().default_scroll_bar_width;
        let node = self.nodes.get_mut(id)?;
        Some(node.scroll.get_or_insert_with(|| Box::new(ScrollAttributes::new(bar_width))))
    }

    // =========================================================================
    // Offset
    // =========================================================================

    pub fn scroll_x(&self, id: ViewId) -> f32 {
        self.scroll_attrs(id).map_or(0.0, |s| s.x)
    }

    pub fn scroll_y(&self, id: ViewId) -> f32 {
        self.scroll_attrs(id).map_or(0.0, |s| s.y)
    }

    pub fn scroll_position(&self, id: ViewId) -> Point {
        Point::new(self.scroll_x(id), self.scroll_y(id))
    }

    /// Scroll to `(x, y)`, clamped to `[0, content - size]` on each axis.
    ///
    /// A real change fires `on_scroll`, moves the scroll bars and repaints
    /// when `redraw` is set.
    pub fn scroll_to(&mut self, id: ViewId, x: f32, y: f32, redraw: bool) {
        let (width, height) = (self.width(id), self.height(id));
        let Some(attrs) = self.init_scroll_attrs(id) else {
            return;
        };
        let x = x.min(attrs.content_width - width).max(0.0);
        let y = y.min(attrs.content_height - height).max(0.0);
        let unchanged = is_almost_zero(attrs.x - x) && is_almost_zero(attrs.y - y);
        attrs.x = x;
        attrs.y = y;
        if unchanged {
            return;
        }
        let bars = [attrs.horizontal_bar, attrs.vertical_bar];
        trace!(target: targets::SCROLL, ?id, x, y, "scrolled");

        self.dispatch_scroll(id, x, y);
        for (bar, value) in bars.into_iter().zip([x, y]) {
            if let Some(bar) = bar {
                self.set_scroll_bar_value_out_of_range(bar, value);
            }
        }
        if redraw {
            self.invalidate(id);
        }
    }

    pub fn set_scroll_x(&mut self, id: ViewId, x: f32, redraw: bool) {
        let y = self.scroll_y(id);
        self.scroll_to(id, x, y, redraw);
    }

    pub fn set_scroll_y(&mut self, id: ViewId, y: f32, redraw: bool) {
        let x = self.scroll_x(id);
        self.scroll_to(id, x, y, redraw);
    }

    /// How far the view can scroll on each axis; never negative.
    pub fn scroll_range(&self, id: ViewId) -> Size {
        match self.scroll_attrs(id) {
            Some(attrs) => Size::new(
                (attrs.content_width - self.width(id)).max(0.0),
                (attrs.content_height - self.height(id)).max(0.0),
            ),
            None => Size::ZERO,
        }
    }

    fn dispatch_scroll(&mut self, id: ViewId, x: f32, y: f32) {
        self.call_handler(id, |handler, tree| handler.on_scroll(tree, id, x, y));
        if let Some(listener) = self.listener(id) {
            listener.on_scroll(self, id, x, y);
        }
    }

    // =========================================================================
    // Content size
    // =========================================================================

    pub fn content_width(&self, id: ViewId) -> f32 {
        self.scroll_attrs(id).map_or(0.0, |s| s.content_width)
    }

    pub fn content_height(&self, id: ViewId) -> f32 {
        self.scroll_attrs(id).map_or(0.0, |s| s.content_height)
    }

    pub fn content_size(&self, id: ViewId) -> Size {
        Size::new(self.content_width(id), self.content_height(id))
    }

    /// Set the scrollable extent. A change fires `on_resize_content` and,
    /// with `refresh`, re-ranges the scroll bars and re-clamps the offset.
    pub fn set_content_size(&mut self, id: ViewId, width: f32, height: f32, refresh: bool) {
        let Some(attrs) = self.init_scroll_attrs(id) else {
            return;
        };
        let unchanged = is_almost_zero(width - attrs.content_width) && is_almost_zero(height - attrs.content_height);
        attrs.content_width = width;
        attrs.content_height = height;
        if unchanged {
            return;
        }
        self.call_handler(id, |handler, tree| handler.on_resize_content(tree, id, width, height));
        if refresh {
            self.refresh_scroll(id, true);
        }
    }

    pub fn set_content_width(&mut self, id: ViewId, width: f32, refresh: bool) {
        let height = self.content_height(id);
        self.set_content_size(id, width, height, refresh);
    }

    pub fn set_content_height(&mut self, id: ViewId, height: f32, refresh: bool) {
        let width = self.content_width(id);
        self.set_content_size(id, width, height, refresh);
    }

    // =========================================================================
    // Scroll bars
    // =========================================================================

    /// Thickness of the scroll bars; 0 for a view that never scrolled.
    pub fn scroll_bar_width(&self, id: ViewId) -> f32 {
        self.scroll_attrs(id).map_or(0.0, |s| s.bar_width)
    }

    pub fn set_scroll_bar_width(&mut self, id: ViewId, width: f32, refresh: bool) {
        if let Some(attrs) = self.init_scroll_attrs(id) {
            attrs.bar_width = width;
            if refresh {
                self.refresh_scroll(id, true);
            }
        }
    }

    pub fn horizontal_scroll_bar(&self, id: ViewId) -> Option<ViewId> {
        self.scroll_attrs(id).and_then(|s| s.horizontal_bar)
    }

    pub fn vertical_scroll_bar(&self, id: ViewId) -> Option<ViewId> {
        self.scroll_attrs(id).and_then(|s| s.vertical_bar)
    }

    /// Install `bar` as the horizontal scroll bar of `id`, destroying the
    /// previous one. The bar must not already have a parent.
    pub fn set_horizontal_scroll_bar(&mut self, id: ViewId, bar: Option<ViewId>, refresh: bool) {
        self.install_scroll_bar(id, bar, false, refresh);
    }

    /// Install `bar` as the vertical scroll bar of `id`, destroying the
    /// previous one. The bar must not already have a parent.
    pub fn set_vertical_scroll_bar(&mut self, id: ViewId, bar: Option<ViewId>, refresh: bool) {
        self.install_scroll_bar(id, bar, true, refresh);
    }

    fn install_scroll_bar(&mut self, id: ViewId, bar: Option<ViewId>, vertical: bool, refresh: bool) {
        if let Some(bar) = bar {
            if bar == id || !self.contains(bar) || self.parent(bar).is_some() {
                debug!(target: targets::SCROLL, ?id, ?bar, "scroll bar rejected: missing or already parented");
                return;
            }
        }
        let Some(attrs) = self.init_scroll_attrs(id) else {
            return;
        };
        let slot = if vertical {
            &mut attrs.vertical_bar
        } else {
            &mut attrs.horizontal_bar
        };
        let old = std::mem::replace(slot, bar);
        if let Some(old) = old.filter(|&old| Some(old) != bar) {
            self.destroy_view(old);
        }
        if let Some(bar) = bar {
            if let Some(node) = self.nodes.get_mut(bar) {
                node.parent = Some(id);
            }
        }
        if refresh {
            self.refresh_scroll(id, true);
        }
    }

    /// Create a horizontal bar drawn and driven by [`ScrollBarHandler`].
    pub fn create_horizontal_scroll_bar(&mut self, id: ViewId, refresh: bool) -> Option<ViewId> {
        if !self.contains(id) {
            return None;
        }
        let bar = self.create_view_with_handler(Box::new(ScrollBarHandler::default()));
        self.set_horizontal_scroll_bar(id, Some(bar), refresh);
        Some(bar)
    }

    pub fn create_vertical_scroll_bar(&mut self, id: ViewId, refresh: bool) -> Option<ViewId> {
        if !self.contains(id) {
            return None;
        }
        let bar = self.create_view_with_handler(Box::new(ScrollBarHandler::default()));
        self.set_vertical_scroll_bar(id, Some(bar), refresh);
        Some(bar)
    }

    pub fn create_scroll_bars(&mut self, id: ViewId, refresh: bool) {
        self.create_horizontal_scroll_bar(id, false);
        self.create_vertical_scroll_bar(id, false);
        if refresh {
            self.refresh_scroll(id, true);
        }
    }

    pub fn remove_horizontal_scroll_bar(&mut self, id: ViewId, refresh: bool) {
        self.set_horizontal_scroll_bar(id, None, refresh);
    }

    pub fn remove_vertical_scroll_bar(&mut self, id: ViewId, refresh: bool) {
        self.set_vertical_scroll_bar(id, None, refresh);
    }

    pub fn remove_scroll_bars(&mut self, id: ViewId, refresh: bool) {
        self.remove_horizontal_scroll_bar(id, false);
        self.remove_vertical_scroll_bar(id, false);
        if refresh {
            self.refresh_scroll(id, true);
        }
    }

    /// A bar counts as visible only while it is shown and its range exceeds
    /// one page.
    pub fn is_horizontal_scroll_bar_visible(&self, id: ViewId) -> bool {
        self.scroll_attrs(id).is_some_and(|s| {
            s.valid_horizontal && s.horizontal_bar.is_some_and(|bar| self.is_visible(bar))
        })
    }

    pub fn is_vertical_scroll_bar_visible(&self, id: ViewId) -> bool {
        self.scroll_attrs(id)
            .is_some_and(|s| s.valid_vertical && s.vertical_bar.is_some_and(|bar| self.is_visible(bar)))
    }

    pub fn set_horizontal_scroll_bar_visible(&mut self, id: ViewId, visible: bool, refresh: bool) {
        if let Some(bar) = self.horizontal_scroll_bar(id) {
            self.set_visible(bar, visible, false);
            if refresh {
                self.refresh_scroll(id, true);
            }
        }
    }

    pub fn set_vertical_scroll_bar_visible(&mut self, id: ViewId, visible: bool, refresh: bool) {
        if let Some(bar) = self.vertical_scroll_bar(id) {
            self.set_visible(bar, visible, false);
            if refresh {
                self.refresh_scroll(id, true);
            }
        }
    }

    pub fn set_scroll_bars_visible(&mut self, id: ViewId, visible: bool, refresh: bool) {
        self.set_horizontal_scroll_bar_visible(id, visible, false);
        self.set_vertical_scroll_bar_visible(id, visible, false);
        if refresh {
            self.refresh_scroll(id, true);
        }
    }

    /// The bars to draw and route events to: shown, with a valid range.
    pub(crate) fn scroll_bars(&self, id: ViewId) -> Vec<ViewId> {
        let Some(attrs) = self.scroll_attrs(id) else {
            return Vec::new();
        };
        let horizontal = attrs.horizontal_bar.filter(|_| attrs.valid_horizontal);
        let vertical = attrs.vertical_bar.filter(|_| attrs.valid_vertical);
        horizontal
            .into_iter()
            .chain(vertical)
            .filter(|&bar| self.is_visible(bar))
            .collect()
    }

    /// Re-range and re-place the scroll bars after a size change, then
    /// re-clamp the offset.
    pub(crate) fn refresh_scroll(&mut self, id: ViewId, redraw: bool) {
        let Some(attrs) = self.scroll_attrs(id) else {
            return;
        };
        let (width, height) = (self.width(id), self.height(id));
        let attrs = attrs.clone();

        if let Some(bar) = attrs.horizontal_bar {
            let range = ScrollBarAttributes {
                owner: id,
                vertical: false,
                value: attrs.x,
                page: width,
                min: 0.0,
                max: attrs.content_width,
            };
            let frame = Rect::new(0.0, height - attrs.bar_width, width, height);
            let valid = self.place_scroll_bar(id, bar, range, frame);
            if let Some(attrs) = self.scroll_attrs_mut(id) {
                attrs.valid_horizontal = valid;
            }
        }
        if let Some(bar) = attrs.vertical_bar {
            let range = ScrollBarAttributes {
                owner: id,
                vertical: true,
                value: attrs.y,
                page: height,
                min: 0.0,
                max: attrs.content_height,
            };
            let frame = Rect::new(width - attrs.bar_width, 0.0, width, height);
            let valid = self.place_scroll_bar(id, bar, range, frame);
            if let Some(attrs) = self.scroll_attrs_mut(id) {
                attrs.valid_vertical = valid;
            }
        }

        self.scroll_to(id, attrs.x, attrs.y, false);
        if redraw {
            self.invalidate(id);
        }
    }

    fn place_scroll_bar(&mut self, owner: ViewId, bar: ViewId, range: ScrollBarAttributes, frame: Rect) -> bool {
        let Some(node) = self.nodes.get_mut(bar) else {
            return false;
        };
        node.parent = Some(owner);
        node.scroll_bar = Some(Box::new(range));
        self.set_frame(bar, frame, false);
        range.is_valid()
    }

    // =========================================================================
    // Scroll bar values
    // =========================================================================

    /// The owner-provided range of a bar as `(min, max, page)`.
    pub fn scroll_bar_range(&self, bar: ViewId) -> Option<(f32, f32, f32)> {
        let attrs = self.nodes.get(bar)?.scroll_bar.as_deref()?;
        Some((attrs.min, attrs.max, attrs.page))
    }

    pub fn scroll_bar_value(&self, bar: ViewId) -> f32 {
        self.nodes
            .get(bar)
            .and_then(|node| node.scroll_bar.as_deref())
            .map_or(0.0, |attrs| attrs.value)
    }

    pub fn is_vertical_scroll_bar(&self, bar: ViewId) -> bool {
        self.nodes
            .get(bar)
            .and_then(|node| node.scroll_bar.as_deref())
            .is_some_and(|attrs| attrs.vertical)
    }

    /// Move a bar to `value`, clamped to `[min, max - page]`, and scroll its
    /// owner to match both of the owner's bars.
    pub fn set_scroll_bar_value(&mut self, bar: ViewId, value: f32) {
        let Some(attrs) = self.nodes.get_mut(bar).and_then(|node| node.scroll_bar.as_deref_mut()) else {
            return;
        };
        let value = value.min(attrs.max - attrs.page).max(attrs.min);
        if is_almost_zero(attrs.value - value) {
            return;
        }
        attrs.value = value;
        let owner = attrs.owner;
        self.invalidate(bar);

        let x = self.horizontal_scroll_bar(owner).map_or(0.0, |h| self.scroll_bar_value(h));
        let y = self.vertical_scroll_bar(owner).map_or(0.0, |v| self.scroll_bar_value(v));
        self.scroll_to(owner, x, y, true);
    }

    fn set_scroll_bar_value_out_of_range(&mut self, bar: ViewId, value: f32) {
        if let Some(attrs) = self.nodes.get_mut(bar).and_then(|node| node.scroll_bar.as_deref_mut()) {
            attrs.value = value;
            self.invalidate(bar);
        }
    }

    // =========================================================================
    // Content scrolling gestures
    // =========================================================================

    pub fn is_content_scrolling_by_mouse(&self, id: ViewId) -> bool {
        self.scroll_attrs(id).is_none_or(|s| s.by_mouse)
    }

    pub fn set_content_scrolling_by_mouse(&mut self, id: ViewId, enabled: bool) {
        if let Some(attrs) = self.init_scroll_attrs(id) {
            attrs.by_mouse = enabled;
        }
    }

    pub fn is_content_scrolling_by_touch(&self, id: ViewId) -> bool {
        self.scroll_attrs(id).is_none_or(|s| s.by_touch)
    }

    pub fn set_content_scrolling_by_touch(&mut self, id: ViewId, enabled: bool) {
        if let Some(attrs) = self.init_scroll_attrs(id) {
            attrs.by_touch = enabled;
        }
    }

    pub fn is_content_scrolling_by_mouse_wheel(&self, id: ViewId) -> bool {
        self.scroll_attrs(id).is_none_or(|s| s.by_mouse_wheel)
    }

    pub fn set_content_scrolling_by_mouse_wheel(&mut self, id: ViewId, enabled: bool) {
        if let Some(attrs) = self.init_scroll_attrs(id) {
            attrs.by_mouse_wheel = enabled;
        }
    }

    pub fn is_content_scrolling_by_keyboard(&self, id: ViewId) -> bool {
        self.scroll_attrs(id).is_none_or(|s| s.by_keyboard)
    }

    pub fn set_content_scrolling_by_keyboard(&mut self, id: ViewId, enabled: bool) {
        if let Some(attrs) = self.init_scroll_attrs(id) {
            attrs.by_keyboard = enabled;
        }
    }

    /// Drag, wheel and arrow-key scrolling of the content. Consumed events
    /// have their propagation stopped.
    pub(crate) fn process_content_scrolling(&mut self, id: ViewId, event: &mut UiEvent) {
        let (width, height) = (self.width(id), self.height(id));
        let config = *self.config();
        let Some(attrs) = self.scroll_attrs_mut(id) else {
            return;
        };
        if attrs.content_width < width && attrs.content_height < height {
            return;
        }
        let line_x = config.scroll_line(width);
        let line_y = config.scroll_line(height);
        let (sx, sy) = (attrs.x, attrs.y);

        match event.action() {
            UiAction::LeftButtonDown | UiAction::TouchBegin => {
                attrs.down_content = true;
                attrs.scroll_x_down = sx;
                attrs.scroll_y_down = sy;
                attrs.pointer_x_down = event.x();
                attrs.pointer_y_down = event.y();
                event.stop_propagation();
            }
            UiAction::LeftButtonDrag | UiAction::TouchMove => {
                if attrs.down_content {
                    let x = attrs.scroll_x_down - (event.x() - attrs.pointer_x_down);
                    let y = attrs.scroll_y_down - (event.y() - attrs.pointer_y_down);
                    self.scroll_to(id, x, y, true);
                    event.stop_propagation();
                }
            }
            UiAction::LeftButtonUp | UiAction::TouchEnd => {
                if attrs.down_content {
                    attrs.down_content = false;
                    event.stop_propagation();
                }
            }
            UiAction::MouseWheel => {
                let dx = wheel_step(event.delta_x(), line_x);
                let dy = wheel_step(event.delta_y(), line_y);
                if dx != 0.0 || dy != 0.0 {
                    self.scroll_to(id, sx + dx, sy + dy, true);
                    event.stop_propagation();
                }
            }
            UiAction::KeyDown => {
                let target = match event.keycode() {
                    Keycode::Left => Some((sx - line_x, sy)),
                    Keycode::Right => Some((sx + line_x, sy)),
                    Keycode::Up => Some((sx, sy - line_y)),
                    Keycode::Down => Some((sx, sy + line_y)),
                    Keycode::PageUp => Some((sx, sy - height)),
                    Keycode::PageDown => Some((sx, sy + height)),
                    _ => None,
                };
                if let Some((x, y)) = target {
                    self.scroll_to(id, x, y, true);
                    event.stop_propagation();
                }
            }
            _ => {}
        }
    }
}

/// Wheel deltas scroll one line against the wheel direction.
fn wheel_step(delta: f32, line: f32) -> f32 {
    if delta > horizon_trellis_render::EPSILON {
        -line
    } else if delta < -horizon_trellis_render::EPSILON {
        line
    } else {
        0.0
    }
}

// =============================================================================
// Default scroll bar
// =============================================================================

/// Handler of the bars made by `create_*_scroll_bar`: a track with a thumb
/// that can be dragged, and page jumps on track clicks.
#[derive(Debug, Clone)]
pub struct ScrollBarHandler {
    pub track_color: Color,
    pub thumb_color: Color,
    /// The thumb never gets shorter than this.
    pub min_thumb_length: f32,
    drag: Option<(f32, f32)>,
}

impl Default for ScrollBarHandler {
    fn default() -> Self {
        Self {
            track_color: Color::TRANSPARENT,
            thumb_color: Color::GRAY.with_alpha(0.6),
            min_thumb_length: 16.0,
            drag: None,
        }
    }
}

/// Thumb placement along a bar's track.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ThumbGeometry {
    start: f32,
    length: f32,
    /// Value units per track unit.
    ratio: f32,
}

impl ScrollBarHandler {
    fn geometry(&self, attrs: &ScrollBarAttributes, track: f32) -> Option<ThumbGeometry> {
        let range = attrs.max - attrs.min;
        if !attrs.is_valid() || track <= 0.0 {
            return None;
        }
        let length = (track * attrs.page / range).max(self.min_thumb_length).min(track);
        let free = track - length;
        let ratio = if free > 0.0 { (range - attrs.page) / free } else { 0.0 };
        let start = if ratio > 0.0 { (attrs.value - attrs.min) / ratio } else { 0.0 };
        Some(ThumbGeometry {
            start: start.clamp(0.0, free),
            length,
            ratio,
        })
    }

    fn state(tree: &ViewTree, id: ViewId) -> Option<(ScrollBarAttributes, f32)> {
        let attrs = *tree.nodes.get(id)?.scroll_bar.as_deref()?;
        let track = if attrs.vertical { tree.height(id) } else { tree.width(id) };
        Some((attrs, track))
    }
}

impl ViewHandler for ScrollBarHandler {
    fn on_draw(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {
        let bounds = tree.bounds(id);
        if !self.track_color.is_zero() {
            canvas.fill_rect(bounds, self.track_color);
        }
        let Some((attrs, track)) = Self::state(tree, id) else {
            return;
        };
        let Some(thumb) = self.geometry(&attrs, track) else {
            return;
        };
        let rect = if attrs.vertical {
            Rect::from_xywh(0.0, thumb.start, bounds.width(), thumb.length)
        } else {
            Rect::from_xywh(thumb.start, 0.0, thumb.length, bounds.height())
        };
        canvas.fill_rect(rect, self.thumb_color);
    }

    fn on_mouse_event(&mut self, tree: &mut ViewTree, id: ViewId, event: &mut UiEvent) {
        let Some((attrs, track)) = Self::state(tree, id) else {
            return;
        };
        let Some(thumb) = self.geometry(&attrs, track) else {
            return;
        };
        let pos = if attrs.vertical { event.y() } else { event.x() };
        match event.action() {
            UiAction::LeftButtonDown | UiAction::TouchBegin => {
                if pos < thumb.start {
                    tree.set_scroll_bar_value(id, attrs.value - attrs.page);
                } else if pos > thumb.start + thumb.length {
                    tree.set_scroll_bar_value(id, attrs.value + attrs.page);
                } else {
                    self.drag = Some((pos, attrs.value));
                }
                event.stop_propagation();
            }
            UiAction::LeftButtonDrag | UiAction::TouchMove => {
                if let Some((origin, value)) = self.drag {
                    tree.set_scroll_bar_value(id, value + (pos - origin) * thumb.ratio);
                    event.stop_propagation();
                }
            }
            UiAction::LeftButtonUp | UiAction::TouchEnd | UiAction::TouchCancel => {
                if self.drag.take().is_some() {
                    event.stop_propagation();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::view::hooks::ViewListener;

    fn scroller(tree: &mut ViewTree, w: f32, h: f32, cw: f32, ch: f32) -> ViewId {
        let v = tree.create_view();
        tree.set_frame(v, Rect::new(0.0, 0.0, w, h), false);
        tree.set_content_size(v, cw, ch, true);
        v
    }

    #[derive(Default)]
    struct ScrollLog(Mutex<Vec<(f32, f32)>>);

    impl ViewListener for ScrollLog {
        fn on_scroll(&self, _tree: &mut ViewTree, _view: ViewId, x: f32, y: f32) {
            self.0.lock().push((x, y));
        }
    }

    #[test]
    fn test_scroll_to_clamps_to_range() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 50.0, 300.0, 80.0);
        tree.scroll_to(v, 1000.0, -20.0, false);
        assert_eq!(tree.scroll_position(v), Point::new(200.0, 0.0));
        assert_eq!(tree.scroll_range(v), Size::new(200.0, 30.0));
    }

    #[test]
    fn test_content_smaller_than_view_never_scrolls() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 50.0, 40.0, 20.0);
        tree.scroll_to(v, 10.0, 10.0, false);
        assert_eq!(tree.scroll_position(v), Point::ZERO);
        assert_eq!(tree.scroll_range(v), Size::ZERO);
    }

    #[test]
    fn test_on_scroll_fires_only_on_change() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 50.0, 300.0, 200.0);
        let log = Arc::new(ScrollLog::default());
        tree.set_listener(v, Some(log.clone()));
        tree.set_scroll_x(v, 20.0, false);
        tree.set_scroll_x(v, 20.0, false);
        tree.set_scroll_y(v, 5.0, false);
        assert_eq!(*log.0.lock(), vec![(20.0, 0.0), (20.0, 5.0)]);
    }

    #[test]
    fn test_shrinking_content_reclamps_offset() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 50.0, 300.0, 50.0);
        tree.scroll_to(v, 150.0, 0.0, false);
        tree.set_content_width(v, 160.0, true);
        assert_eq!(tree.scroll_x(v), 60.0);
    }

    #[test]
    fn test_scroll_bars_are_owned_but_not_children() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 50.0, 300.0, 40.0);
        tree.create_scroll_bars(v, true);
        let h = tree.horizontal_scroll_bar(v).unwrap();
        let vb = tree.vertical_scroll_bar(v).unwrap();
        assert_eq!(tree.parent(h), Some(v));
        assert!(tree.children(v).is_empty());
        assert_eq!(tree.frame(h), Rect::new(0.0, 38.0, 100.0, 50.0));
        assert_eq!(tree.frame(vb), Rect::new(88.0, 0.0, 100.0, 50.0));
        // Only the horizontal range exceeds a page.
        assert_eq!(tree.scroll_bars(v), vec![h]);
        assert!(tree.is_horizontal_scroll_bar_visible(v));
        assert!(!tree.is_vertical_scroll_bar_visible(v));
    }

    #[test]
    fn test_horizontal_visibility_setter_targets_horizontal_bar() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 50.0, 300.0, 200.0);
        tree.create_scroll_bars(v, true);
        tree.set_horizontal_scroll_bar_visible(v, false, true);
        assert!(!tree.is_horizontal_scroll_bar_visible(v));
        assert!(tree.is_vertical_scroll_bar_visible(v));
    }

    #[test]
    fn test_bar_value_drives_owner() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 50.0, 300.0, 200.0);
        tree.create_scroll_bars(v, true);
        let h = tree.horizontal_scroll_bar(v).unwrap();
        tree.set_scroll_bar_value(h, 500.0);
        assert_eq!(tree.scroll_bar_value(h), 200.0);
        assert_eq!(tree.scroll_x(v), 200.0);

        tree.scroll_to(v, 10.0, 30.0, false);
        let vb = tree.vertical_scroll_bar(v).unwrap();
        assert_eq!(tree.scroll_bar_value(h), 10.0);
        assert_eq!(tree.scroll_bar_value(vb), 30.0);
    }

    #[test]
    fn test_removing_bars_destroys_them() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 50.0, 300.0, 200.0);
        tree.create_scroll_bars(v, true);
        let h = tree.horizontal_scroll_bar(v).unwrap();
        tree.remove_scroll_bars(v, true);
        assert!(!tree.contains(h));
        assert!(tree.scroll_bars(v).is_empty());
    }

    #[test]
    fn test_drag_scrolls_content() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 100.0, 400.0, 400.0);
        let mut down = UiEvent::mouse(UiAction::LeftButtonDown, 50.0, 50.0);
        tree.process_content_scrolling(v, &mut down);
        assert!(down.is_stopped_propagation());
        let mut drag = UiEvent::mouse(UiAction::LeftButtonDrag, 30.0, 20.0);
        tree.process_content_scrolling(v, &mut drag);
        assert_eq!(tree.scroll_position(v), Point::new(20.0, 30.0));
        let mut up = UiEvent::mouse(UiAction::LeftButtonUp, 30.0, 20.0);
        tree.process_content_scrolling(v, &mut up);
        assert!(up.is_stopped_propagation());
        let mut stray = UiEvent::mouse(UiAction::LeftButtonDrag, 0.0, 0.0);
        tree.process_content_scrolling(v, &mut stray);
        assert!(!stray.is_stopped_propagation());
    }

    #[test]
    fn test_wheel_and_keys_scroll_by_lines() {
        let mut tree = ViewTree::new();
        let v = scroller(&mut tree, 100.0, 200.0, 400.0, 1000.0);
        let mut wheel = UiEvent::mouse_wheel(10.0, 10.0, 0.0, -1.0);
        tree.process_content_scrolling(v, &mut wheel);
        assert_eq!(tree.scroll_y(v), 10.0);

        let mut key = UiEvent::key(UiAction::KeyDown, Keycode::PageDown, Default::default());
        tree.process_content_scrolling(v, &mut key);
        assert_eq!(tree.scroll_y(v), 210.0);
        let mut key = UiEvent::key(UiAction::KeyDown, Keycode::Right, Default::default());
        tree.process_content_scrolling(v, &mut key);
        assert_eq!(tree.scroll_x(v), 5.0);
        let mut other = UiEvent::key(UiAction::KeyDown, Keycode::Enter, Default::default());
        tree.process_content_scrolling(v, &mut other);
        assert!(!other.is_stopped_propagation());
    }

    #[test]
    fn test_thumb_geometry() {
        let handler = ScrollBarHandler::default();
        let attrs = ScrollBarAttributes {
            owner: ViewId::default(),
            vertical: false,
            value: 100.0,
            page: 100.0,
            min: 0.0,
            max: 400.0,
        };
        let thumb = handler.geometry(&attrs, 100.0).unwrap();
        assert_eq!(thumb.length, 25.0);
        assert_eq!(thumb.ratio, 4.0);
        assert_eq!(thumb.start, 25.0);
    }
}
