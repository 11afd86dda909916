//! Integration tests for layers composited through a recording canvas.

use horizon_trellis_render::{
    Canvas, CanvasOp, Color, LayerDamage, LayerSurface, RecordingCanvas, Rect, aligned_layer_extent,
    with_saved_state,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_layer_repaint_cycle() {
    init_tracing();
    let mut screen = RecordingCanvas::new(400.0, 300.0);
    let width = aligned_layer_extent(120, 256);
    let mut layer = screen.create_layer(width, width).unwrap();
    let mut damage = LayerDamage::whole();

    let region = damage.take(layer.width(), layer.height()).unwrap();
    assert_eq!(region, Rect::new(0.0, 0.0, 256.0, 256.0));
    layer.reset_pixels(region, Color::TRANSPARENT);
    let canvas = layer.canvas();
    canvas.set_invalidated_rect(region);
    with_saved_state(canvas, |c| c.fill_rect(Rect::new(0.0, 0.0, 120.0, 40.0), Color::RED));

    let src = Rect::new(0.0, 0.0, 120.0, 40.0);
    screen.draw_layer(src, layer.as_ref(), src, 0.5);

    // Nothing changed: the cached layer is reused as is.
    assert_eq!(damage.take(layer.width(), layer.height()), None);

    let ops = screen.ops();
    assert!(ops.iter().any(|op| matches!(op, CanvasOp::ResetPixels { .. })));
    assert!(matches!(ops.last(), Some(CanvasOp::DrawLayer { alpha, .. }) if *alpha == 0.5));
}

#[test]
fn test_partial_damage_merges() {
    init_tracing();
    let mut damage = LayerDamage::default();
    damage.add_damage(Rect::new(10.0, 10.0, 20.0, 20.0));
    damage.add_damage(Rect::new(0.0, 15.0, 12.0, 40.0));
    assert!(!damage.is_whole());
    assert_eq!(damage.take(256, 256), Some(Rect::new(0.0, 10.0, 20.0, 40.0)));
}
