//! Off-screen layers.
//!
//! Views with a layer, or with partial opacity, paint their content into a
//! [`LayerSurface`] which the parent canvas then composites with
//! [`Canvas::draw_layer`]. Layers are reused between frames and only grown,
//! so sizes are rounded up with [`aligned_layer_extent`].

use tracing::debug;

use crate::canvas::Canvas;
use crate::error::{RenderError, RenderResult};
use crate::recording::{CanvasOp, RecordingCanvas};
use crate::types::{Color, Rect};

/// Hard upper bound on a [`MemoryLayer`] side.
pub const MAX_LAYER_DIMENSION: u32 = 16384;

/// An off-screen drawing surface.
pub trait LayerSurface: Send {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// The canvas that paints into this surface.
    fn canvas(&mut self) -> &mut dyn Canvas;

    /// Overwrite the pixels under `rect` with `color`, bypassing blending.
    fn reset_pixels(&mut self, rect: Rect, color: Color);

    /// Raw RGBA `f32` pixel data, row-major.
    fn pixel_bytes(&self) -> &[u8];
}

/// Round `value` up to a multiple of `alignment`.
///
/// ```
/// use horizon_trellis_render::aligned_layer_extent;
///
/// assert_eq!(aligned_layer_extent(1, 256), 256);
/// assert_eq!(aligned_layer_extent(256, 256), 256);
/// assert_eq!(aligned_layer_extent(300, 256), 512);
/// ```
pub fn aligned_layer_extent(value: u32, alignment: u32) -> u32 {
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment).saturating_mul(alignment)
}

/// A CPU layer: a pixel buffer plus a recording canvas.
///
/// Drawing commands are recorded rather than rasterized; only
/// [`reset_pixels`](LayerSurface::reset_pixels) touches the buffer.
pub struct MemoryLayer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    canvas: RecordingCanvas,
}

impl MemoryLayer {
    /// Allocate a transparent `width` x `height` layer with its own log.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let canvas = RecordingCanvas::new(width as f32, height as f32);
        Self::with_canvas(width, height, canvas)
    }

    /// Allocate a layer that records into `canvas`.
    pub fn with_canvas(width: u32, height: u32, canvas: RecordingCanvas) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if width > MAX_LAYER_DIMENSION || height > MAX_LAYER_DIMENSION {
            return Err(RenderError::LayerTooLarge {
                width,
                height,
                max: MAX_LAYER_DIMENSION,
            });
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(RenderError::AllocationFailed { width, height })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| RenderError::AllocationFailed { width, height })?;
        pixels.resize(len, Color::TRANSPARENT);

        debug!(target: "horizon_trellis_render::layer", width, height, "allocated memory layer");

        Ok(Self {
            width,
            height,
            pixels,
            canvas,
        })
    }

    /// The pixel at (`x`, `y`), if inside the layer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

impl std::fmt::Debug for MemoryLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLayer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl LayerSurface for MemoryLayer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        &mut self.canvas
    }

    fn reset_pixels(&mut self, rect: Rect, color: Color) {
        self.canvas.record(CanvasOp::ResetPixels { rect, color });
        let x0 = rect.left.max(0.0).floor() as u32;
        let y0 = rect.top.max(0.0).floor() as u32;
        let x1 = (rect.right.max(0.0).ceil() as u32).min(self.width);
        let y1 = (rect.bottom.max(0.0).ceil() as u32).min(self.height);
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                if let Some(px) = self.pixels.get_mut(row + x as usize) {
                    *px = color;
                }
            }
        }
    }

    fn pixel_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            MemoryLayer::new(0, 10).unwrap_err(),
            RenderError::InvalidDimensions { width: 0, height: 10 }
        );
        assert!(matches!(
            MemoryLayer::new(MAX_LAYER_DIMENSION + 1, 1),
            Err(RenderError::LayerTooLarge { .. })
        ));
    }

    #[test]
    fn test_reset_pixels_clamps_to_surface() {
        let mut layer = MemoryLayer::new(4, 4).unwrap();
        layer.reset_pixels(Rect::new(-5.0, 2.0, 100.0, 3.0), Color::RED);
        assert_eq!(layer.pixel(0, 2), Some(Color::RED));
        assert_eq!(layer.pixel(3, 2), Some(Color::RED));
        assert_eq!(layer.pixel(0, 1), Some(Color::TRANSPARENT));
        assert_eq!(layer.pixel(4, 2), None);
    }

    #[test]
    fn test_pixel_bytes_len() {
        let layer = MemoryLayer::new(2, 3).unwrap();
        assert_eq!(layer.pixel_bytes().len(), 2 * 3 * std::mem::size_of::<Color>());
    }

    #[test]
    fn test_aligned_extent() {
        assert_eq!(aligned_layer_extent(0, 256), 0);
        assert_eq!(aligned_layer_extent(257, 256), 512);
        assert_eq!(aligned_layer_extent(7, 1), 7);
    }
}
