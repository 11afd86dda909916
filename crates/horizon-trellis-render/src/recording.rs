//! A canvas that records its commands.
//!
//! [`RecordingCanvas`] is the reference [`Canvas`]: it keeps the full state
//! machine (transform, clip bounds, anti-aliasing, invalidated rect) and
//! appends every command to a shared log. Layers created from a recording
//! canvas write into the same log, so one list shows a whole paint pass in
//! order.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::canvas::Canvas;
use crate::error::RenderResult;
use crate::layer::{LayerSurface, MemoryLayer};
use crate::paint::{Alignment, Drawable, Pen, ScaleMode, fit_rect};
use crate::transform::Transform2D;
use crate::types::{Color, Path, Rect, Size};

/// One recorded canvas command.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Save,
    Restore,
    ConcatTransform(Transform2D),
    SetInvalidatedRect(Rect),
    SetAntiAlias(bool),
    ClipRect(Rect),
    ClipRoundRect { rect: Rect, radius: Size },
    ClipEllipse(Rect),
    /// Clip to a path; the path's bounds are kept.
    ClipPath(Rect),
    /// `device` is `rect` mapped through the transform current at the time.
    FillRect { rect: Rect, color: Color, device: Rect },
    DrawRect { rect: Rect, pen: Pen, anti_alias: bool },
    DrawRoundRect { rect: Rect, radius: Size, pen: Pen },
    DrawEllipse { rect: Rect, pen: Pen },
    DrawPath { bounds: Rect, pen: Pen },
    DrawDrawable { dst: Rect, placed: Rect },
    CreateLayer { width: u32, height: u32 },
    ResetPixels { rect: Rect, color: Color },
    DrawLayer { dst: Rect, src: Rect, alpha: f32 },
}

#[derive(Debug, Clone, Copy)]
struct CanvasState {
    transform: Transform2D,
    clip: Option<Rect>,
    anti_alias: bool,
}

/// A [`Canvas`] that logs commands instead of rasterizing them.
///
/// ```
/// use horizon_trellis_render::{Canvas, CanvasOp, Color, RecordingCanvas, Rect};
///
/// let mut canvas = RecordingCanvas::new(100.0, 100.0);
/// canvas.translate(10.0, 20.0);
/// canvas.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), Color::RED);
///
/// let fills: Vec<Rect> = canvas
///     .ops()
///     .into_iter()
///     .filter_map(|op| match op {
///         CanvasOp::FillRect { device, .. } => Some(device),
///         _ => None,
///     })
///     .collect();
/// assert_eq!(fills, vec![Rect::new(10.0, 20.0, 15.0, 25.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    log: Arc<Mutex<Vec<CanvasOp>>>,
    state: CanvasState,
    stack: Vec<CanvasState>,
    invalidated: Rect,
}

impl RecordingCanvas {
    /// A canvas of `width` x `height` whose invalidated rect covers it all.
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_log(Arc::new(Mutex::new(Vec::new())), width, height)
    }

    /// A canvas appending to an existing log.
    pub fn with_log(log: Arc<Mutex<Vec<CanvasOp>>>, width: f32, height: f32) -> Self {
        Self {
            log,
            state: CanvasState {
                transform: Transform2D::IDENTITY,
                clip: None,
                anti_alias: true,
            },
            stack: Vec::new(),
            invalidated: Rect::new(0.0, 0.0, width, height),
        }
    }

    /// Append `op` to the log.
    pub fn record(&self, op: CanvasOp) {
        self.log.lock().push(op);
    }

    /// Snapshot of every command recorded so far.
    pub fn ops(&self) -> Vec<CanvasOp> {
        self.log.lock().clone()
    }

    /// Forget the recorded commands. State is kept.
    pub fn clear(&self) {
        self.log.lock().clear();
    }

    /// The shared log handle.
    pub fn log(&self) -> Arc<Mutex<Vec<CanvasOp>>> {
        Arc::clone(&self.log)
    }

    /// Number of unmatched `save` calls.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Device-space bounding box of the clip, if any clip is active.
    pub fn clip_bounds(&self) -> Option<Rect> {
        self.state.clip
    }

    fn push_clip(&mut self, local: Rect) {
        let device = self.state.transform.transform_rect(&local);
        self.state.clip = Some(match self.state.clip {
            Some(current) => current.intersect(&device).unwrap_or(Rect::ZERO),
            None => device,
        });
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.stack.push(self.state);
        self.record(CanvasOp::Save);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => {
                self.state = state;
                self.record(CanvasOp::Restore);
            }
            None => tracing::warn!(target: "horizon_trellis_render::canvas", "restore without matching save"),
        }
    }

    fn invalidated_rect(&self) -> Rect {
        self.invalidated
    }

    fn set_invalidated_rect(&mut self, rect: Rect) {
        self.invalidated = rect;
        self.record(CanvasOp::SetInvalidatedRect(rect));
    }

    fn is_anti_alias(&self) -> bool {
        self.state.anti_alias
    }

    fn set_anti_alias(&mut self, enabled: bool) {
        self.state.anti_alias = enabled;
        self.record(CanvasOp::SetAntiAlias(enabled));
    }

    fn transform(&self) -> Transform2D {
        self.state.transform
    }

    fn concat_transform(&mut self, transform: &Transform2D) {
        self.state.transform = self.state.transform.then(transform);
        self.record(CanvasOp::ConcatTransform(*transform));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.push_clip(rect);
        self.record(CanvasOp::ClipRect(rect));
    }

    fn clip_round_rect(&mut self, rect: Rect, radius: Size) {
        self.push_clip(rect);
        self.record(CanvasOp::ClipRoundRect { rect, radius });
    }

    fn clip_ellipse(&mut self, rect: Rect) {
        self.push_clip(rect);
        self.record(CanvasOp::ClipEllipse(rect));
    }

    fn clip_path(&mut self, path: &Path) {
        let bounds = path.bounds();
        self.push_clip(bounds);
        self.record(CanvasOp::ClipPath(bounds));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let device = self.state.transform.transform_rect(&rect);
        self.record(CanvasOp::FillRect { rect, color, device });
    }

    fn draw_rect(&mut self, rect: Rect, pen: &Pen) {
        self.record(CanvasOp::DrawRect {
            rect,
            pen: *pen,
            anti_alias: self.state.anti_alias,
        });
    }

    fn draw_round_rect(&mut self, rect: Rect, radius: Size, pen: &Pen) {
        self.record(CanvasOp::DrawRoundRect { rect, radius, pen: *pen });
    }

    fn draw_ellipse(&mut self, rect: Rect, pen: &Pen) {
        self.record(CanvasOp::DrawEllipse { rect, pen: *pen });
    }

    fn draw_path(&mut self, path: &Path, pen: &Pen) {
        self.record(CanvasOp::DrawPath {
            bounds: path.bounds(),
            pen: *pen,
        });
    }

    fn draw_drawable(&mut self, dst: Rect, drawable: &dyn Drawable, mode: ScaleMode, alignment: Alignment) {
        let placed = fit_rect(drawable.width(), drawable.height(), dst, mode, alignment);
        self.record(CanvasOp::DrawDrawable { dst, placed });
        drawable.draw(self, placed);
    }

    fn create_layer(&mut self, width: u32, height: u32) -> RenderResult<Box<dyn LayerSurface>> {
        let canvas = RecordingCanvas::with_log(self.log(), width as f32, height as f32);
        let layer = MemoryLayer::with_canvas(width, height, canvas)?;
        self.record(CanvasOp::CreateLayer { width, height });
        Ok(Box::new(layer))
    }

    fn draw_layer(&mut self, dst: Rect, _layer: &dyn LayerSurface, src: Rect, alpha: f32) {
        self.record(CanvasOp::DrawLayer { dst, src, alpha });
    }
}
