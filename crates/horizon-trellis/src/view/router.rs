//! Input routing.
//!
//! Pointer events enter a view in its own coordinates and are offered to its
//! scroll bars first, then to its children front to back. A child takes an
//! event unless it calls [`UiEvent::pass_to_next`]. What is left over runs
//! the view's default handling: handler hook, listener, content scrolling and
//! press/hover/click state.
//!
//! Each view remembers which child received the last button or touch down
//! (the capture), which child the pointer is over, and which children own
//! touch points in multi-touch mode. Drags and releases go to the capture
//! regardless of where the pointer is.
//!
//! Key events are not hit tested; they travel down the focused-child chain
//! and each level handles what its focused descendant left over.

use cursor_icon::CursorIcon;
use horizon_trellis_core::logging::{span_names, targets};
use horizon_trellis_render::Point;
use tracing::trace;

use super::events::{Keycode, TouchPhase, TouchPoint, UiAction, UiEvent};
use super::node::ViewId;
use super::tree::ViewTree;

/// Restores the action and propagation flag around a synthesized event.
fn with_synthesized_action(event: &mut UiEvent, action: UiAction, send: impl FnOnce(&mut UiEvent)) {
    let original = event.action();
    let stopped = event.is_stopped_propagation();
    event.set_action(action);
    send(event);
    event.set_action(original);
    event.set_stopped_propagation(stopped);
}

impl ViewTree {
    // =========================================================================
    // Routing flags
    // =========================================================================

    pub fn is_passing_events_to_children(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.pass_events_to_children)
    }

    /// When off, children never see pointer events; the view handles them
    /// itself.
    pub fn set_passing_events_to_children(&mut self, id: ViewId, pass: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.pass_events_to_children = pass;
        }
    }

    pub fn is_multi_touch_mode(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.multi_touch_mode)
    }

    /// In multi-touch mode each child receives only the touch points over it,
    /// so several children can be touched at once.
    pub fn set_multi_touch_mode(&mut self, id: ViewId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.multi_touch_mode = enabled;
        }
    }

    pub fn cursor(&self, id: ViewId) -> Option<CursorIcon> {
        self.nodes.get(id).and_then(|node| node.cursor)
    }

    /// Cursor reported by [`dispatch_set_cursor`](Self::dispatch_set_cursor)
    /// while the pointer is over the view.
    pub fn set_cursor(&mut self, id: ViewId, cursor: Option<CursorIcon>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.cursor = cursor;
        }
    }

    /// The child currently capturing button or touch input.
    pub fn capturing_child(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(id).and_then(|node| node.child_mouse_down)
    }

    /// The child the pointer was last over.
    pub fn hovered_child(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(id).and_then(|node| node.child_mouse_move)
    }

    /// Children owning touch points after the last multi-touch dispatch.
    pub fn multi_touch_children(&self, id: ViewId) -> Vec<ViewId> {
        self.nodes
            .get(id)
            .map(|node| node.children_multi_touch.clone())
            .unwrap_or_default()
    }

    /// Children that can receive pointer events: drawn by the tree, shown
    /// and hit-testable.
    fn is_point_event_target(&self, child: ViewId) -> bool {
        self.nodes
            .get(child)
            .is_some_and(|node| node.instance.is_none() && node.is_visible() && node.hit_testable)
    }

    /// The child-space point when `point` (parent space) hits `child`.
    fn hit_child(&self, child: ViewId, point: Point) -> Option<Point> {
        if !self.is_point_event_target(child) {
            return None;
        }
        let local = self.convert_coordinate_from_parent(child, point);
        self.hit_test(child, local).then_some(local)
    }

    fn set_capture(&mut self, id: ViewId, child: Option<ViewId>, action: UiAction) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.child_mouse_down = child;
            node.action_mouse_down = action;
        }
    }

    fn set_hovered_child(&mut self, id: ViewId, child: Option<ViewId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.child_mouse_move = child;
        }
    }

    // =========================================================================
    // Mouse
    // =========================================================================

    /// Route a mouse event to `id` (point in `id`'s coordinates) and its
    /// subtree.
    pub fn dispatch_mouse_event(&mut self, id: ViewId, event: &mut UiEvent) {
        self.check_ui_thread("dispatch_mouse_event");
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        let action = event.action();
        let _span = tracing::trace_span!(target: targets::EVENT, span_names::DISPATCH_EVENT, ?id, ?action).entered();

        let tracks_hover = matches!(action, UiAction::MouseMove | UiAction::MouseEnter);
        let mut old_hover = if tracks_hover { node.child_mouse_move } else { None };
        let pass_to_children = node.pass_events_to_children;
        let children = node.children.clone();

        let bars = self.scroll_bars(id);
        let handled = self.dispatch_mouse_event_to_children(id, event, &bars)
            || (pass_to_children
                && !children.is_empty()
                && self.dispatch_mouse_event_to_children(id, event, &children));
        if handled {
            old_hover = None;
        }
        if let Some(old) = old_hover {
            with_synthesized_action(event, UiAction::MouseLeave, |event| {
                self.dispatch_mouse_event_to_child(old, event, true);
            });
            self.set_hovered_child(id, None);
        }

        if event.is_stopped_propagation() {
            return;
        }
        if action.is_button_down() && self.is_focusable(id) {
            self.set_focus(id, true, true);
        }

        event.reset_status();
        self.call_handler(id, |handler, tree| handler.on_mouse_event(tree, id, event));
        if event.is_prevented_default() {
            return;
        }
        if let Some(listener) = self.listener(id) {
            listener.on_mouse_event(self, id, event);
            if event.is_prevented_default() {
                return;
            }
        }
        if self.is_content_scrolling_by_mouse(id) {
            self.process_content_scrolling(id, event);
        }
        self.process_event_for_state_and_click(id, event);
    }

    /// Offer a mouse event to `children` (back to front order). Returns
    /// whether the caller must not try other candidates.
    fn dispatch_mouse_event_to_children(&mut self, id: ViewId, event: &mut UiEvent, children: &[ViewId]) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return true;
        };
        let (capture, capture_action, hovered) = (node.child_mouse_down, node.action_mouse_down, node.child_mouse_move);
        let action = event.action();
        let point = event.point();

        match action {
            UiAction::LeftButtonDown | UiAction::RightButtonDown | UiAction::MiddleButtonDown => {
                if let Some(capture) = capture {
                    self.dispatch_mouse_event_to_child(capture, event, true);
                    return true;
                }
                for &child in children.iter().rev() {
                    if let Some(local) = self.hit_child(child, point) {
                        event.set_point(local);
                        self.dispatch_mouse_event_to_child(child, event, false);
                        event.set_point(point);
                        if !event.is_passed_to_next() {
                            trace!(target: targets::EVENT, ?id, ?child, ?action, "capture started");
                            self.set_capture(id, Some(child), action);
                            return true;
                        }
                    }
                }
                false
            }
            UiAction::LeftButtonDrag | UiAction::RightButtonDrag | UiAction::MiddleButtonDrag => {
                if let Some(capture) = capture {
                    self.dispatch_mouse_event_to_child(capture, event, true);
                }
                true
            }
            UiAction::LeftButtonDoubleClick | UiAction::RightButtonDoubleClick | UiAction::MiddleButtonDoubleClick => {
                for &child in children.iter().rev() {
                    if let Some(local) = self.hit_child(child, point) {
                        event.set_point(local);
                        self.dispatch_mouse_event_to_child(child, event, false);
                        event.set_point(point);
                        if !event.is_passed_to_next() {
                            return true;
                        }
                    }
                }
                false
            }
            UiAction::LeftButtonUp | UiAction::RightButtonUp | UiAction::MiddleButtonUp => {
                if let Some(capture) = capture {
                    self.dispatch_mouse_event_to_child(capture, event, true);
                    if capture_action.action_up_for() == Some(action) {
                        trace!(target: targets::EVENT, ?id, child = ?capture, "capture released");
                        self.set_capture(id, None, UiAction::Unknown);
                    }
                }
                true
            }
            UiAction::MouseMove | UiAction::MouseEnter => {
                for &child in children.iter().rev() {
                    if let Some(local) = self.hit_child(child, point) {
                        let routed = if hovered == Some(child) {
                            UiAction::MouseMove
                        } else {
                            UiAction::MouseEnter
                        };
                        event.set_action(routed);
                        event.set_point(local);
                        self.dispatch_mouse_event_to_child(child, event, false);
                        event.set_point(point);
                        event.set_action(action);
                        if !event.is_passed_to_next() {
                            self.set_hovered_child(id, Some(child));
                            if let Some(old) = hovered.filter(|&old| old != child) {
                                event.set_action(UiAction::MouseLeave);
                                self.dispatch_mouse_event_to_child(old, event, true);
                                event.set_action(action);
                            }
                            return true;
                        }
                    }
                }
                false
            }
            UiAction::MouseLeave => {
                if let Some(old) = hovered {
                    self.dispatch_mouse_event_to_child(old, event, true);
                    self.set_hovered_child(id, None);
                }
                true
            }
            _ => true,
        }
    }

    fn dispatch_mouse_event_to_child(&mut self, child: ViewId, event: &mut UiEvent, convert: bool) {
        event.reset_status();
        if convert {
            let point = event.point();
            event.set_point(self.convert_coordinate_from_parent(child, point));
            self.dispatch_mouse_event(child, event);
            event.set_point(point);
        } else {
            self.dispatch_mouse_event(child, event);
        }
    }

    // =========================================================================
    // Touch
    // =========================================================================

    /// Route a touch event to `id` and its subtree. Touch events also run
    /// the mouse hooks, after the touch hooks.
    pub fn dispatch_touch_event(&mut self, id: ViewId, event: &mut UiEvent) {
        self.check_ui_thread("dispatch_touch_event");
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        let action = event.action();
        let _span = tracing::trace_span!(target: targets::EVENT, span_names::DISPATCH_EVENT, ?id, ?action).entered();
        let pass_to_children = node.pass_events_to_children;
        let multi_touch = node.multi_touch_mode;
        let children = node.children.clone();

        let bars = self.scroll_bars(id);
        if !self.dispatch_touch_event_to_children(id, event, &bars) && pass_to_children && !children.is_empty() {
            if multi_touch {
                self.dispatch_multi_touch_event_to_children(id, event, &children);
            } else {
                self.dispatch_touch_event_to_children(id, event, &children);
            }
        }

        if event.is_stopped_propagation() {
            return;
        }
        if action == UiAction::TouchBegin && self.is_focusable(id) {
            self.set_focus(id, true, true);
        }

        event.reset_status();
        self.call_handler(id, |handler, tree| handler.on_touch_event(tree, id, event));
        if event.is_prevented_default() {
            return;
        }
        self.call_handler(id, |handler, tree| handler.on_mouse_event(tree, id, event));
        if event.is_prevented_default() {
            return;
        }
        if let Some(listener) = self.listener(id) {
            listener.on_touch_event(self, id, event);
            if event.is_prevented_default() {
                return;
            }
            listener.on_mouse_event(self, id, event);
            if event.is_prevented_default() {
                return;
            }
        }
        self.process_event_for_state_and_click(id, event);
        if self.is_content_scrolling_by_touch(id) {
            self.process_content_scrolling(id, event);
        }
    }

    /// Single-touch routing: the first touch down captures, everything after
    /// goes to the capture until the touch ends.
    fn dispatch_touch_event_to_children(&mut self, id: ViewId, event: &mut UiEvent, children: &[ViewId]) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return true;
        };
        let (capture, capture_action) = (node.child_mouse_down, node.action_mouse_down);
        let action = event.action();

        match action {
            UiAction::TouchBegin => {
                if let Some(capture) = capture {
                    self.dispatch_touch_event_to_child(capture, event, true);
                    return true;
                }
                let point = event.point();
                for &child in children.iter().rev() {
                    if self.hit_child(child, point).is_some() {
                        self.dispatch_touch_event_to_child(child, event, true);
                        if !event.is_passed_to_next() {
                            trace!(target: targets::EVENT, ?id, ?child, "touch capture started");
                            self.set_capture(id, Some(child), action);
                            return true;
                        }
                    }
                }
                false
            }
            UiAction::TouchMove => {
                if let Some(capture) = capture {
                    self.dispatch_touch_event_to_child(capture, event, true);
                }
                true
            }
            UiAction::TouchEnd | UiAction::TouchCancel => {
                if let Some(capture) = capture {
                    self.dispatch_touch_event_to_child(capture, event, true);
                    if capture_action == UiAction::TouchBegin {
                        self.set_capture(id, None, UiAction::Unknown);
                    }
                }
                true
            }
            _ => true,
        }
    }

    /// Multi-touch routing: every touch point goes to the frontmost child
    /// under it. Children that owned points before but got none this time
    /// receive a cancel.
    fn dispatch_multi_touch_event_to_children(&mut self, id: ViewId, event: &mut UiEvent, children: &[ViewId]) {
        let action = event.action();
        let original_points = event.touch_points().to_vec();
        let original_point = event.touch_point();
        let mut selected: Vec<ViewId> = Vec::new();

        if action != UiAction::TouchCancel {
            let mut unclaimed = original_points.clone();
            for &child in children.iter().rev() {
                if unclaimed.is_empty() {
                    break;
                }
                if !self.is_point_event_target(child) {
                    continue;
                }
                let mut inside = Vec::new();
                let mut outside = Vec::new();
                for touch in &unclaimed {
                    let local = self.convert_coordinate_from_parent(child, touch.point);
                    if self.hit_test(child, local) {
                        inside.push(TouchPoint { point: local, ..*touch });
                    } else {
                        outside.push(*touch);
                    }
                }
                let Some(&first) = inside.first() else {
                    continue;
                };
                if inside.len() == 1 {
                    match first.phase {
                        TouchPhase::Begin => event.set_action(UiAction::TouchBegin),
                        TouchPhase::End => event.set_action(UiAction::TouchEnd),
                        TouchPhase::Cancel => event.set_action(UiAction::TouchCancel),
                        TouchPhase::Move => {}
                    }
                }
                event.set_touch_points(inside);
                event.set_touch_point(first);
                self.dispatch_touch_event_to_child(child, event, false);
                event.set_action(action);
                if !event.is_passed_to_next() {
                    selected.push(child);
                    unclaimed = outside;
                }
            }
        }

        let previous = self.multi_touch_children(id);
        if let Some(&representative) = original_points.first() {
            for old in previous.into_iter().filter(|old| !selected.contains(old)) {
                trace!(target: targets::EVENT, ?id, child = ?old, "touch moved off child, cancelling");
                with_synthesized_action(event, UiAction::TouchCancel, |event| {
                    event.set_touch_points(vec![representative]);
                    event.set_touch_point(representative);
                    self.dispatch_touch_event_to_child(old, event, true);
                });
            }
        }

        event.set_touch_point(original_point);
        event.set_touch_points(original_points);
        if let Some(node) = self.nodes.get_mut(id) {
            node.children_multi_touch = selected;
        }
    }

    fn dispatch_touch_event_to_child(&mut self, child: ViewId, event: &mut UiEvent, convert: bool) {
        event.reset_status();
        if !convert {
            self.dispatch_touch_event(child, event);
            return;
        }
        let points = event.take_touch_points();
        if points.is_empty() {
            return;
        }
        let primary = event.touch_point();
        let converted = points
            .iter()
            .map(|touch| TouchPoint {
                point: self.convert_coordinate_from_parent(child, touch.point),
                ..*touch
            })
            .collect();
        event.set_touch_points(converted);
        event.set_touch_point(TouchPoint {
            point: self.convert_coordinate_from_parent(child, primary.point),
            ..primary
        });
        self.dispatch_touch_event(child, event);
        event.set_touch_points(points);
        event.set_touch_point(primary);
    }

    // =========================================================================
    // Wheel and cursor
    // =========================================================================

    pub fn dispatch_mouse_wheel_event(&mut self, id: ViewId, event: &mut UiEvent) {
        self.check_ui_thread("dispatch_mouse_wheel_event");
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        let pass_to_children = node.pass_events_to_children;
        let children = node.children.clone();
        let bars = self.scroll_bars(id);
        if !self.dispatch_hit_tested(event, &bars, Self::dispatch_mouse_wheel_event, UiAction::MouseWheel)
            && pass_to_children
        {
            self.dispatch_hit_tested(event, &children, Self::dispatch_mouse_wheel_event, UiAction::MouseWheel);
        }

        if event.is_stopped_propagation() {
            return;
        }
        event.reset_status();
        self.call_handler(id, |handler, tree| handler.on_mouse_wheel_event(tree, id, event));
        if event.is_prevented_default() {
            return;
        }
        if let Some(listener) = self.listener(id) {
            listener.on_mouse_wheel_event(self, id, event);
            if event.is_prevented_default() {
                return;
            }
        }
        if self.is_content_scrolling_by_mouse_wheel(id) {
            self.process_content_scrolling(id, event);
        }
    }

    /// Ask the view under the pointer for a cursor. The chosen cursor is set
    /// on the event, which then reports `is_prevented_default`.
    pub fn dispatch_set_cursor(&mut self, id: ViewId, event: &mut UiEvent) {
        self.check_ui_thread("dispatch_set_cursor");
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        let pass_to_children = node.pass_events_to_children;
        let children = node.children.clone();
        let bars = self.scroll_bars(id);
        if !self.dispatch_hit_tested(event, &bars, Self::dispatch_set_cursor, UiAction::SetCursor) && pass_to_children {
            self.dispatch_hit_tested(event, &children, Self::dispatch_set_cursor, UiAction::SetCursor);
        }

        if event.is_stopped_propagation() || event.is_prevented_default() {
            return;
        }
        event.reset_status();
        self.call_handler(id, |handler, tree| handler.on_set_cursor(tree, id, event));
        if event.is_prevented_default() {
            return;
        }
        if let Some(listener) = self.listener(id) {
            listener.on_set_cursor(self, id, event);
            if event.is_prevented_default() {
                return;
            }
        }
        if let Some(cursor) = self.cursor(id) {
            event.set_cursor(Some(cursor));
            event.prevent_default();
        }
    }

    /// Offer the event to the frontmost child under the pointer that does
    /// not pass it on. Only events carrying `expected` are routed; any other
    /// action counts as handled.
    fn dispatch_hit_tested(
        &mut self,
        event: &mut UiEvent,
        children: &[ViewId],
        dispatch: fn(&mut ViewTree, ViewId, &mut UiEvent),
        expected: UiAction,
    ) -> bool {
        if event.action() != expected {
            return true;
        }
        let point = event.point();
        for &child in children.iter().rev() {
            if let Some(local) = self.hit_child(child, point) {
                event.reset_status();
                event.set_point(local);
                dispatch(self, child, event);
                event.set_point(point);
                if !event.is_passed_to_next() {
                    return true;
                }
            }
        }
        false
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Route a key event down the focused-child chain. Unconsumed Tab and
    /// Shift+Tab move the focus to the next or previous tab stop.
    pub fn dispatch_key_event(&mut self, id: ViewId, event: &mut UiEvent) {
        self.check_ui_thread("dispatch_key_event");
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        let _span =
            tracing::trace_span!(target: targets::EVENT, span_names::DISPATCH_EVENT, ?id, action = ?event.action())
                .entered();
        if let Some(focused) = node.focused_child {
            self.dispatch_key_event(focused, event);
        }
        if event.is_stopped_propagation() {
            return;
        }

        event.reset_status();
        self.call_handler(id, |handler, tree| handler.on_key_event(tree, id, event));
        if event.is_prevented_default() {
            return;
        }
        if let Some(listener) = self.listener(id) {
            listener.on_key_event(self, id, event);
            if event.is_prevented_default() {
                return;
            }
        }
        if self.is_content_scrolling_by_keyboard(id) {
            self.process_content_scrolling(id, event);
        }
        if self.is_processing_tab_stop(id) && event.keycode() == Keycode::Tab {
            let target = if event.is_shift_key() {
                self.previous_tab_stop(id)
            } else {
                self.next_tab_stop(id)
            };
            if let Some(target) = target.filter(|&target| target != id) {
                trace!(target: targets::EVENT, from = ?id, to = ?target, "tab stop");
                self.set_focus(target, true, true);
                event.stop_propagation();
            }
        }
    }

    // =========================================================================
    // Click and state
    // =========================================================================

    /// Run the click hook, the listener and the `on_click` callback, in that
    /// order. `prevent_default` in the hook skips the rest.
    pub fn dispatch_click(&mut self, id: ViewId, event: &mut UiEvent) {
        if !self.is_enabled(id) {
            return;
        }
        self.call_handler(id, |handler, tree| handler.on_click(tree, id, event));
        if event.is_prevented_default() {
            return;
        }
        if let Some(listener) = self.listener(id) {
            listener.on_click(self, id, event);
        }
        if let Some(callback) = self.nodes.get(id).and_then(|node| node.on_click.clone()) {
            callback(self, id);
        }
    }

    /// Click the view programmatically.
    pub fn dispatch_click_with_no_event(&mut self, id: ViewId) {
        let mut event = UiEvent::mouse(UiAction::Unknown, 0.0, 0.0);
        self.dispatch_click(id, &mut event);
    }

    fn process_event_for_state_and_click(&mut self, id: ViewId, event: &mut UiEvent) {
        match event.action() {
            UiAction::LeftButtonDown | UiAction::TouchBegin => {
                self.set_pressed_state(id, true, true);
                if self.is_occurring_click(id) {
                    event.stop_propagation();
                }
            }
            UiAction::LeftButtonUp | UiAction::TouchEnd => {
                if self.is_occurring_click(id)
                    && self.is_pressed_state(id)
                    && self.bounds(id).contains_point(event.point())
                {
                    self.dispatch_click(id, event);
                }
                self.set_pressed_state(id, false, true);
            }
            UiAction::TouchCancel => self.set_pressed_state(id, false, true),
            UiAction::MouseEnter => self.set_hover_state(id, true, true),
            UiAction::MouseLeave => self.set_hover_state(id, false, true),
            _ => {}
        }
    }
}
