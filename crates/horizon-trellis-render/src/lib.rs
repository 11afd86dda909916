//! Geometry and drawing backend for Horizon Trellis.
//!
//! This crate provides the pieces the view engine paints with: geometry types,
//! 2D affine transforms, pens and drawables, the object-safe [`Canvas`] trait,
//! off-screen layers and per-layer damage tracking.
//!
//! # Drawing
//!
//! Views never talk to a concrete backend. They receive a `&mut dyn Canvas`
//! and push state, clip and draw through it:
//!
//! ```
//! use horizon_trellis_render::{Canvas, Color, Pen, RecordingCanvas, Rect, with_saved_state};
//!
//! let mut canvas = RecordingCanvas::new(800.0, 600.0);
//!
//! canvas.fill_rect(Rect::new(10.0, 10.0, 110.0, 60.0), Color::RED);
//!
//! with_saved_state(&mut canvas, |c| {
//!     c.translate(200.0, 100.0);
//!     c.draw_rect(Rect::new(0.0, 0.0, 80.0, 80.0), &Pen::solid(Color::BLUE));
//! });
//!
//! assert_eq!(canvas.ops().len(), 6);
//! ```
//!
//! # Layers
//!
//! A canvas creates [`LayerSurface`]s through [`Canvas::create_layer`].
//! Content painted into a layer is composited back with
//! [`Canvas::draw_layer`] at some opacity. [`LayerDamage`] records which part
//! of a cached layer needs repainting.

mod canvas;
mod damage;
mod error;
mod layer;
mod paint;
mod recording;
mod transform;
mod types;

pub use canvas::{Canvas, with_saved_state};
pub use damage::LayerDamage;
pub use error::{RenderError, RenderResult};
pub use layer::{LayerSurface, MAX_LAYER_DIMENSION, MemoryLayer, aligned_layer_extent};
pub use paint::{Alignment, ColorDrawable, Drawable, Pen, PenStyle, ScaleMode, fit_rect};
pub use recording::{CanvasOp, RecordingCanvas};
pub use transform::Transform2D;
pub use types::{Color, EPSILON, Path, PathCommand, Point, Rect, Size, is_almost_equal, is_almost_zero};
