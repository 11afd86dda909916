//! Integration tests for pointer, key and wheel routing through a view tree.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_trellis::render::Rect;
use horizon_trellis::{KeyboardModifiers, Keycode, UiAction, UiEvent, ViewId, ViewTree};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Dialog {
    tree: ViewTree,
    root: ViewId,
    name_field: ViewId,
    email_field: ViewId,
    ok: ViewId,
    clicks: Arc<AtomicUsize>,
}

fn dialog() -> Dialog {
    let mut tree = ViewTree::new();
    let root = tree.create_group();
    tree.set_frame(root, Rect::new(0.0, 0.0, 200.0, 120.0), false);

    let field = |tree: &mut ViewTree, top: f32| {
        let id = tree.create_view();
        tree.set_frame(id, Rect::new(10.0, top, 190.0, top + 20.0), false);
        tree.set_focusable(id, true);
        tree.add_child(root, id).unwrap();
        id
    };
    let name_field = field(&mut tree, 10.0);
    let email_field = field(&mut tree, 40.0);

    let ok = tree.create_view();
    tree.set_frame(ok, Rect::new(130.0, 80.0, 190.0, 110.0), false);
    tree.set_focusable(ok, true);
    tree.set_occurring_click(ok, true);
    tree.add_child(root, ok).unwrap();

    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = clicks.clone();
    tree.set_on_click(
        ok,
        Some(Arc::new(move |_tree: &mut ViewTree, _id: ViewId| {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
    );

    Dialog {
        tree,
        root,
        name_field,
        email_field,
        ok,
        clicks,
    }
}

fn mouse(tree: &mut ViewTree, root: ViewId, action: UiAction, x: f32, y: f32) {
    tree.dispatch_mouse_event(root, &mut UiEvent::mouse(action, x, y));
}

#[test]
fn test_press_and_release_inside_clicks() {
    init_tracing();
    let Dialog {
        mut tree, root, ok, clicks, ..
    } = dialog();

    mouse(&mut tree, root, UiAction::LeftButtonDown, 150.0, 90.0);
    assert!(tree.is_pressed_state(ok));
    assert!(tree.is_focused(ok));
    mouse(&mut tree, root, UiAction::LeftButtonUp, 150.0, 90.0);

    assert!(!tree.is_pressed_state(ok));
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
}

#[test]
fn test_release_outside_does_not_click() {
    init_tracing();
    let Dialog {
        mut tree, root, ok, clicks, ..
    } = dialog();

    mouse(&mut tree, root, UiAction::LeftButtonDown, 150.0, 90.0);
    mouse(&mut tree, root, UiAction::LeftButtonDrag, 20.0, 20.0);
    // The drag stays with the button that captured the press.
    assert_eq!(tree.capturing_child(root), Some(ok));
    mouse(&mut tree, root, UiAction::LeftButtonUp, 20.0, 20.0);

    assert_eq!(clicks.load(Ordering::SeqCst), 0);
    assert_eq!(tree.capturing_child(root), None);
}

#[test]
fn test_hover_follows_pointer() {
    init_tracing();
    let Dialog {
        mut tree,
        root,
        name_field,
        ok,
        ..
    } = dialog();

    mouse(&mut tree, root, UiAction::MouseMove, 50.0, 15.0);
    assert!(tree.is_hover_state(name_field));
    mouse(&mut tree, root, UiAction::MouseMove, 150.0, 90.0);
    assert!(!tree.is_hover_state(name_field));
    assert!(tree.is_hover_state(ok));
    assert_eq!(tree.hovered_child(root), Some(ok));
}

#[test]
fn test_tab_cycles_through_fields() {
    init_tracing();
    let Dialog {
        mut tree,
        root,
        name_field,
        email_field,
        ok,
        ..
    } = dialog();
    tree.set_focus(name_field, true, false);

    let mut order = Vec::new();
    for _ in 0..3 {
        let mut tab = UiEvent::key(UiAction::KeyDown, Keycode::Tab, KeyboardModifiers::NONE);
        tree.dispatch_key_event(root, &mut tab);
        order.push(tree.focused_descendant(root));
    }
    assert_eq!(order, vec![Some(email_field), Some(ok), Some(name_field)]);

    let mut back = UiEvent::key(UiAction::KeyDown, Keycode::Tab, KeyboardModifiers::SHIFT);
    tree.dispatch_key_event(root, &mut back);
    assert_eq!(tree.focused_descendant(root), Some(ok));
}

#[test]
fn test_wheel_scrolls_list_under_pointer() {
    init_tracing();
    let mut tree = ViewTree::new();
    let root = tree.create_view();
    tree.set_frame(root, Rect::new(0.0, 0.0, 200.0, 200.0), false);
    let list = tree.create_view();
    tree.set_frame(list, Rect::new(100.0, 0.0, 200.0, 200.0), false);
    tree.add_child(root, list).unwrap();
    tree.set_content_size(list, 100.0, 1000.0, true);

    tree.dispatch_mouse_wheel_event(root, &mut UiEvent::mouse_wheel(50.0, 50.0, 0.0, -1.0));
    assert_eq!(tree.scroll_y(list), 0.0);

    tree.dispatch_mouse_wheel_event(root, &mut UiEvent::mouse_wheel(150.0, 50.0, 0.0, -1.0));
    assert_eq!(tree.scroll_y(list), 10.0);
}

#[test]
fn test_arrow_and_page_keys_scroll_focused_content() {
    init_tracing();
    let mut tree = ViewTree::new();
    let list = tree.create_view();
    tree.set_frame(list, Rect::new(0.0, 0.0, 100.0, 200.0), false);
    tree.set_content_size(list, 100.0, 1000.0, true);

    let key = |tree: &mut ViewTree, keycode: Keycode| {
        let mut event = UiEvent::key(UiAction::KeyDown, keycode, KeyboardModifiers::NONE);
        tree.dispatch_key_event(list, &mut event);
        event.is_stopped_propagation()
    };
    assert!(key(&mut tree, Keycode::Down));
    assert_eq!(tree.scroll_y(list), 10.0);
    assert!(key(&mut tree, Keycode::PageDown));
    assert_eq!(tree.scroll_y(list), 210.0);
    key(&mut tree, Keycode::PageUp);
    key(&mut tree, Keycode::PageUp);
    assert_eq!(tree.scroll_y(list), 0.0);

    tree.set_content_scrolling_by_keyboard(list, false);
    assert!(!key(&mut tree, Keycode::Down));
    assert_eq!(tree.scroll_y(list), 0.0);
}

#[test]
fn test_programmatic_click_runs_callback() {
    init_tracing();
    let Dialog {
        mut tree, ok, clicks, ..
    } = dialog();
    tree.dispatch_click_with_no_event(ok);
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
    assert!(!tree.is_pressed_state(ok));
}
