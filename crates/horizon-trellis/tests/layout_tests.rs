//! Integration tests for the relative layout solver.

use horizon_trellis::render::Rect;
use horizon_trellis::{Edges, ViewId, ViewTree};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sized(tree: &mut ViewTree, parent: ViewId, width: f32, height: f32) -> ViewId {
    let id = tree.create_view();
    tree.set_frame(id, Rect::new(0.0, 0.0, width, height), false);
    tree.add_child(parent, id).unwrap();
    id
}

/// Header and footer pinned to the parent, body filling the space between.
fn page(tree: &mut ViewTree, width: f32, height: f32) -> (ViewId, [ViewId; 3]) {
    let root = tree.create_group();
    tree.set_frame(root, Rect::new(0.0, 0.0, width, height), false);

    let header = sized(tree, root, 10.0, 40.0);
    tree.set_width_filling(header, 1.0);
    tree.set_align_parent_top(header);

    let footer = sized(tree, root, 10.0, 30.0);
    tree.set_width_filling(footer, 1.0);
    tree.set_align_parent_bottom(footer);

    let body = sized(tree, root, 10.0, 10.0);
    tree.set_size_filling(body, 1.0, 1.0);
    tree.set_below(body, header);
    tree.set_above(body, footer);

    (root, [header, body, footer])
}

#[test]
fn test_page_layout_fills_between_siblings() {
    init_tracing();
    let mut tree = ViewTree::new();
    let (root, [header, body, footer]) = page(&mut tree, 300.0, 200.0);
    tree.make_layout(root);

    assert_eq!(tree.frame(header), Rect::new(0.0, 0.0, 300.0, 40.0));
    assert_eq!(tree.frame(footer), Rect::new(0.0, 170.0, 300.0, 200.0));
    assert_eq!(tree.frame(body), Rect::new(0.0, 40.0, 300.0, 170.0));
}

#[test]
fn test_resizing_root_relayouts_children() {
    init_tracing();
    let mut tree = ViewTree::new();
    let (root, [header, body, footer]) = page(&mut tree, 300.0, 200.0);
    tree.make_layout(root);

    tree.set_frame(root, Rect::new(0.0, 0.0, 400.0, 300.0), false);
    tree.make_layout(root);

    assert_eq!(tree.frame(header), Rect::new(0.0, 0.0, 400.0, 40.0));
    assert_eq!(tree.frame(footer), Rect::new(0.0, 270.0, 400.0, 300.0));
    assert_eq!(tree.frame(body), Rect::new(0.0, 40.0, 400.0, 270.0));
}

#[test]
fn test_relayout_without_changes_is_stable() {
    init_tracing();
    let mut tree = ViewTree::new();
    let (root, views) = page(&mut tree, 300.0, 200.0);
    let row = sized(&mut tree, root, 50.0, 20.0);
    tree.set_below(row, views[0]);
    tree.set_center_horizontal(row);
    tree.make_layout(root);
    let first: Vec<Rect> = views.iter().chain([&row]).map(|&id| tree.frame(id)).collect();

    tree.make_layout(root);
    tree.request_layout(root, false);
    tree.make_layout(root);
    tree.request_layout(root, false);
    tree.make_layout(root);
    let again: Vec<Rect> = views.iter().chain([&row]).map(|&id| tree.frame(id)).collect();
    assert_eq!(first, again);
}

#[test]
fn test_padding_shrinks_content_area() {
    init_tracing();
    let mut tree = ViewTree::new();
    let root = tree.create_group();
    tree.set_frame(root, Rect::new(0.0, 0.0, 200.0, 100.0), false);
    tree.set_padding(root, Edges::uniform(10.0));

    let fill = sized(&mut tree, root, 1.0, 1.0);
    tree.set_size_filling(fill, 1.0, 1.0);
    tree.make_layout(root);

    assert_eq!(tree.frame(fill), Rect::new(10.0, 10.0, 190.0, 90.0));
    assert_eq!(tree.bounds_inner_padding(root), Rect::new(10.0, 10.0, 190.0, 90.0));
}

#[test]
fn test_row_of_views_chained_right_of() {
    init_tracing();
    let mut tree = ViewTree::new();
    let root = tree.create_group();
    tree.set_frame(root, Rect::new(0.0, 0.0, 300.0, 50.0), false);

    let first = sized(&mut tree, root, 60.0, 20.0);
    tree.set_align_parent_left(first);
    tree.set_margin_left(first, 4.0);
    let second = sized(&mut tree, root, 60.0, 20.0);
    tree.set_right_of(second, first);
    tree.set_margin_left(second, 4.0);
    let third = sized(&mut tree, root, 60.0, 20.0);
    tree.set_right_of(third, second);
    tree.set_margin_left(third, 4.0);
    tree.set_center_vertical(third);
    tree.make_layout(root);

    assert_eq!(tree.frame(first).left, 4.0);
    assert_eq!(tree.frame(second).left, 68.0);
    assert_eq!(tree.frame(third), Rect::new(132.0, 15.0, 192.0, 35.0));
}

#[test]
fn test_gone_child_is_not_laid_out() {
    init_tracing();
    let mut tree = ViewTree::new();
    let root = tree.create_group();
    tree.set_frame(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
    let hidden = sized(&mut tree, root, 10.0, 10.0);
    tree.set_visibility(hidden, horizon_trellis::Visibility::Gone, false);
    tree.set_align_parent_right(hidden);
    tree.make_layout(root);

    assert_eq!(tree.frame(hidden), Rect::new(0.0, 0.0, 10.0, 10.0));
}
