//! Integration tests for handing work to the UI thread.

use std::thread;

use horizon_trellis::render::Rect;
use horizon_trellis::{HeadlessInstance, UiAction, UiEvent, ViewTree};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_worker_posts_to_ui_thread() {
    init_tracing();
    let mut tree = ViewTree::new();
    let label = tree.create_view();
    let handle = tree.ui_handle();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || {
                handle.post(move |tree: &mut ViewTree| {
                    let width = tree.width(label);
                    tree.set_frame(label, Rect::new(0.0, 0.0, width + 10.0, 20.0), false);
                })
            })
        })
        .collect();
    for worker in workers {
        assert!(worker.join().unwrap().is_ok());
    }

    assert_eq!(tree.width(label), 0.0);
    assert_eq!(tree.pending_tasks(), 4);
    assert_eq!(tree.process_pending(), 4);
    assert_eq!(tree.pending_tasks(), 0);
    assert_eq!(tree.width(label), 40.0);
}

#[test]
fn test_task_posted_while_draining_runs_next_time() {
    init_tracing();
    let mut tree = ViewTree::new();
    let view = tree.create_view();
    let handle = tree.ui_handle();
    let again = handle.clone();
    handle
        .post(move |tree: &mut ViewTree| {
            tree.set_name(view, "first");
            again
                .post(move |tree: &mut ViewTree| tree.set_name(view, "second"))
                .unwrap();
        })
        .unwrap();

    assert_eq!(tree.process_pending(), 1);
    assert_eq!(tree.name(view), Some("first"));
    assert_eq!(tree.process_pending(), 1);
    assert_eq!(tree.name(view), Some("second"));
}

#[test]
fn test_remove_all_children_off_ui_thread_is_reposted() {
    init_tracing();
    let mut tree = ViewTree::new();
    let window = tree.create_view();
    tree.set_frame(window, Rect::new(0.0, 0.0, 100.0, 100.0), false);
    let a = tree.create_view();
    let b = tree.create_view();
    tree.add_child(window, a).unwrap();
    tree.add_child(window, b).unwrap();
    tree.attach(window, HeadlessInstance::shared());

    let mut tree = thread::spawn(move || {
        assert!(!tree.is_ui_thread());
        tree.remove_all_children(window);
        tree
    })
    .join()
    .unwrap();

    assert_eq!(tree.child_count(window), 2);
    assert_eq!(tree.pending_tasks(), 1);
    tree.process_pending();
    assert_eq!(tree.child_count(window), 0);
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.parent(b), None);
}

#[cfg(debug_assertions)]
#[test]
fn test_event_dispatch_off_ui_thread_panics() {
    init_tracing();
    let mut tree = ViewTree::new();
    let root = tree.create_view();
    tree.set_frame(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);

    let result = thread::spawn(move || {
        tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::MouseMove, 10.0, 10.0));
    })
    .join();
    assert!(result.is_err());
}
