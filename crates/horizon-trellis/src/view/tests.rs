//! Scenarios crossing several view subsystems.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use horizon_trellis_render::{Point, Rect};
    use parking_lot::Mutex;

    use crate::view::{
        HeadlessInstance, UiAction, UiEvent, ViewHandler, ViewId, ViewListener, ViewTree,
    };

    #[derive(Default)]
    struct Trace(Mutex<Vec<&'static str>>);

    impl Trace {
        fn push(&self, entry: &'static str) {
            self.0.lock().push(entry);
        }

        fn entries(&self) -> Vec<&'static str> {
            self.0.lock().clone()
        }
    }

    struct TracingHandler {
        trace: Arc<Trace>,
        prevent: bool,
    }

    impl ViewHandler for TracingHandler {
        fn on_mouse_event(&mut self, _tree: &mut ViewTree, _id: ViewId, event: &mut UiEvent) {
            self.trace.push("handler");
            if self.prevent {
                event.prevent_default();
            }
        }
    }

    struct TracingListener(Arc<Trace>);

    impl ViewListener for TracingListener {
        fn on_mouse_event(&self, _tree: &mut ViewTree, _view: ViewId, _event: &mut UiEvent) {
            self.0.push("listener");
        }
    }

    fn root(tree: &mut ViewTree, w: f32, h: f32) -> ViewId {
        let root = tree.create_view();
        tree.set_frame(root, Rect::new(0.0, 0.0, w, h), false);
        root
    }

    fn child(tree: &mut ViewTree, parent: ViewId, frame: Rect) -> ViewId {
        let id = tree.create_view();
        tree.set_frame(id, frame, false);
        tree.add_child(parent, id).unwrap();
        id
    }

    #[test]
    fn test_handler_runs_before_listener() {
        let mut tree = ViewTree::new();
        let trace = Arc::new(Trace::default());
        let id = tree.create_view_with_handler(Box::new(TracingHandler {
            trace: trace.clone(),
            prevent: false,
        }));
        tree.set_listener(id, Some(Arc::new(TracingListener(trace.clone()))));
        tree.dispatch_mouse_event(id, &mut UiEvent::mouse(UiAction::MouseMove, 1.0, 1.0));
        assert_eq!(trace.entries(), vec!["handler", "listener"]);
    }

    #[test]
    fn test_prevent_default_in_handler_skips_listener() {
        let mut tree = ViewTree::new();
        let trace = Arc::new(Trace::default());
        let id = tree.create_view_with_handler(Box::new(TracingHandler {
            trace: trace.clone(),
            prevent: true,
        }));
        tree.set_listener(id, Some(Arc::new(TracingListener(trace.clone()))));
        tree.set_occurring_click(id, true);
        tree.set_frame(id, Rect::new(0.0, 0.0, 10.0, 10.0), false);
        tree.dispatch_mouse_event(id, &mut UiEvent::mouse(UiAction::LeftButtonDown, 1.0, 1.0));
        assert_eq!(trace.entries(), vec!["handler"]);
        // State bookkeeping is part of the default handling that was prevented.
        assert!(!tree.is_pressed_state(id));
    }

    #[test]
    fn test_scaled_child_hit_outside_its_frame() {
        let mut tree = ViewTree::new();
        let root = root(&mut tree, 100.0, 100.0);
        let scaled = child(&mut tree, root, Rect::new(0.0, 0.0, 20.0, 20.0));
        tree.set_scale(scaled, 2.0, 2.0, false);
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        struct Capture(Arc<Mutex<Option<Point>>>);
        impl ViewHandler for Capture {
            fn on_mouse_event(&mut self, _tree: &mut ViewTree, _id: ViewId, event: &mut UiEvent) {
                *self.0.lock() = Some(event.point());
            }
        }
        tree.set_handler(scaled, Box::new(Capture(sink)));

        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonDown, 25.0, 25.0));
        let local = seen.lock().unwrap_or_default();
        assert!((local.x - 17.5).abs() < 1e-4 && (local.y - 17.5).abs() < 1e-4, "{local:?}");
        assert_eq!(tree.capturing_child(root), Some(scaled));
    }

    #[test]
    fn test_instance_backed_child_is_not_routed() {
        let mut tree = ViewTree::new();
        let root = root(&mut tree, 100.0, 100.0);
        let native = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 50.0));
        tree.attach(native, HeadlessInstance::shared());
        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonDown, 10.0, 10.0));
        assert_eq!(tree.capturing_child(root), None);
        assert!(tree.is_pressed_state(root));
    }

    #[test]
    fn test_removing_captured_child_releases_capture() {
        let mut tree = ViewTree::new();
        let root = root(&mut tree, 100.0, 100.0);
        let target = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 50.0));
        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonDown, 10.0, 10.0));
        assert_eq!(tree.capturing_child(root), Some(target));

        tree.remove_child(root, target).unwrap();
        assert_eq!(tree.capturing_child(root), None);
        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonUp, 10.0, 10.0));
        assert!(!tree.is_pressed_state(root));
    }

    #[test]
    fn test_track_click_pages_owner_content() {
        let mut tree = ViewTree::new();
        let root = root(&mut tree, 100.0, 100.0);
        tree.set_content_size(root, 100.0, 400.0, false);
        tree.create_scroll_bars(root, true);
        let bar = tree.vertical_scroll_bar(root).unwrap();
        assert!(tree.is_vertical_scroll_bar_visible(root));
        assert!(!tree.is_horizontal_scroll_bar_visible(root));

        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonDown, 95.0, 90.0));
        assert_eq!(tree.scroll_y(root), 100.0);
        assert_eq!(tree.scroll_bar_value(bar), 100.0);
        assert_eq!(tree.capturing_child(root), Some(bar));

        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonUp, 95.0, 90.0));
        assert_eq!(tree.capturing_child(root), None);
        assert!(!tree.is_pressed_state(root));
    }

    #[test]
    fn test_hidden_scroll_bar_lets_content_drag() {
        let mut tree = ViewTree::new();
        let root = root(&mut tree, 100.0, 100.0);
        tree.set_content_size(root, 100.0, 400.0, false);
        tree.create_scroll_bars(root, true);
        tree.set_scroll_bars_visible(root, false, true);

        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonDown, 95.0, 90.0));
        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonDrag, 95.0, 40.0));
        assert_eq!(tree.scroll_y(root), 50.0);
        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonUp, 95.0, 40.0));
    }

    #[test]
    fn test_disabled_parent_blocks_focus_chain() {
        let mut tree = ViewTree::new();
        let root = root(&mut tree, 100.0, 100.0);
        let leaf = child(&mut tree, root, Rect::new(0.0, 0.0, 10.0, 10.0));
        tree.set_focusable(leaf, true);
        let trace = Arc::new(Trace::default());
        struct KeyTrace(Arc<Trace>);
        impl ViewListener for KeyTrace {
            fn on_key_event(&self, _tree: &mut ViewTree, _view: ViewId, _event: &mut UiEvent) {
                self.0.push("key");
            }
        }
        tree.set_listener(leaf, Some(Arc::new(KeyTrace(trace.clone()))));

        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonDown, 5.0, 5.0));
        assert_eq!(tree.focused_descendant(root), Some(leaf));

        tree.set_enabled(root, false, false);
        let mut key = UiEvent::key(UiAction::KeyDown, crate::view::Keycode::Enter, Default::default());
        tree.dispatch_key_event(root, &mut key);
        assert!(trace.entries().is_empty());
    }
}
