//! The canvas abstraction the draw pipeline paints through.
//!
//! A [`Canvas`] is handed to every view during a paint pass. Besides the usual
//! state stack, transforms, clipping and primitives it carries the
//! *invalidated rectangle*: the part of the current view that actually needs
//! repainting. Views intersect it against their children so untouched
//! subtrees are skipped.

use crate::error::RenderResult;
use crate::layer::{LayerSurface, MemoryLayer};
use crate::paint::{Alignment, Drawable, Pen, ScaleMode};
use crate::transform::Transform2D;
use crate::types::{Color, Path, Rect, Size};

/// The 2D drawing interface used by the view engine.
///
/// The trait is object safe; views always draw through `&mut dyn Canvas`.
pub trait Canvas {
    // =========================================================================
    // State Management
    // =========================================================================

    /// Push transform, clip and anti-alias state.
    fn save(&mut self);

    /// Pop the state pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    /// The rectangle, in current local coordinates, that needs repainting.
    fn invalidated_rect(&self) -> Rect;

    /// Replace the invalidated rectangle.
    fn set_invalidated_rect(&mut self, rect: Rect);

    fn is_anti_alias(&self) -> bool;

    fn set_anti_alias(&mut self, enabled: bool);

    // =========================================================================
    // Transform Operations
    // =========================================================================

    /// The current transform from local to device coordinates.
    fn transform(&self) -> Transform2D;

    /// Pre-concatenate `transform`: it applies to local coordinates before the
    /// current transform.
    fn concat_transform(&mut self, transform: &Transform2D);

    /// Shift the local origin.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.concat_transform(&Transform2D::translate(tx, ty));
    }

    // =========================================================================
    // Clipping
    // =========================================================================

    fn clip_rect(&mut self, rect: Rect);

    fn clip_round_rect(&mut self, rect: Rect, radius: Size);

    fn clip_ellipse(&mut self, rect: Rect);

    fn clip_path(&mut self, path: &Path);

    // =========================================================================
    // Drawing
    // =========================================================================

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Stroke a rectangle outline.
    fn draw_rect(&mut self, rect: Rect, pen: &Pen);

    fn draw_round_rect(&mut self, rect: Rect, radius: Size, pen: &Pen);

    fn draw_ellipse(&mut self, rect: Rect, pen: &Pen);

    fn draw_path(&mut self, path: &Path, pen: &Pen);

    /// Paint `drawable` into `dst`, placed per `mode` and `alignment`
    /// (see [`fit_rect`](crate::paint::fit_rect)).
    fn draw_drawable(&mut self, dst: Rect, drawable: &dyn Drawable, mode: ScaleMode, alignment: Alignment);

    // =========================================================================
    // Layers
    // =========================================================================

    /// Allocate an off-screen surface compatible with this canvas.
    ///
    /// The default allocates a [`MemoryLayer`].
    fn create_layer(&mut self, width: u32, height: u32) -> RenderResult<Box<dyn LayerSurface>> {
        Ok(Box::new(MemoryLayer::new(width, height)?))
    }

    /// Composite the `src` part of `layer` onto `dst` with `alpha`.
    fn draw_layer(&mut self, dst: Rect, layer: &dyn LayerSurface, src: Rect, alpha: f32);
}

/// Run `f` between `save` and `restore`.
///
/// ```
/// use horizon_trellis_render::{Canvas, RecordingCanvas, with_saved_state};
///
/// let mut canvas = RecordingCanvas::new(100.0, 100.0);
/// with_saved_state(&mut canvas, |c| c.translate(10.0, 0.0));
/// assert!(canvas.transform().is_identity());
/// ```
pub fn with_saved_state<R>(canvas: &mut dyn Canvas, f: impl FnOnce(&mut dyn Canvas) -> R) -> R {
    canvas.save();
    let result = f(canvas);
    canvas.restore();
    result
}
