//! Pens, drawables and placement rules.

use std::fmt::Debug;

use crate::canvas::Canvas;
use crate::types::{Color, Rect};

/// Dash pattern of a pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenStyle {
    #[default]
    Solid,
    Dot,
    Dash,
    DashDot,
    DashDotDot,
}

/// Stroke description used for borders and outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub style: PenStyle,
    pub width: f32,
    pub color: Color,
}

impl Pen {
    pub const fn new(style: PenStyle, width: f32, color: Color) -> Self {
        Self {
            style,
            width,
            color,
        }
    }

    /// A one pixel solid pen of the given color.
    pub const fn solid(color: Color) -> Self {
        Self::new(PenStyle::Solid, 1.0, color)
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::solid(Color::BLACK)
    }
}

/// How a drawable is scaled into its destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Keep the intrinsic size.
    None,
    /// Fill the destination, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Largest size that fits inside the destination, aspect preserved.
    Contain,
    /// Smallest size that covers the destination, aspect preserved.
    Cover,
}

/// Where a drawable sits inside its destination when it does not fill it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Alignment {
    /// Horizontal and vertical placement factors (0 = start, 0.5 = center, 1 = end).
    pub fn factors(self) -> (f32, f32) {
        match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopCenter => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::MiddleLeft => (0.0, 0.5),
            Self::MiddleCenter => (0.5, 0.5),
            Self::MiddleRight => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomCenter => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        }
    }
}

/// The rectangle a `width` x `height` drawable occupies inside `dst`.
///
/// Drawables without an intrinsic size (either dimension `<= 0`) always
/// stretch.
///
/// ```
/// use horizon_trellis_render::{Alignment, Rect, ScaleMode, fit_rect};
///
/// let dst = Rect::new(0.0, 0.0, 200.0, 100.0);
/// let r = fit_rect(50.0, 50.0, dst, ScaleMode::Contain, Alignment::MiddleCenter);
/// assert_eq!(r, Rect::new(50.0, 0.0, 150.0, 100.0));
/// ```
pub fn fit_rect(width: f32, height: f32, dst: Rect, mode: ScaleMode, alignment: Alignment) -> Rect {
    if width <= 0.0 || height <= 0.0 || mode == ScaleMode::Stretch {
        return dst;
    }
    let (w, h) = match mode {
        ScaleMode::None => (width, height),
        ScaleMode::Contain | ScaleMode::Cover => {
            let sx = dst.width() / width;
            let sy = dst.height() / height;
            let s = if mode == ScaleMode::Contain { sx.min(sy) } else { sx.max(sy) };
            (width * s, height * s)
        }
        ScaleMode::Stretch => (dst.width(), dst.height()),
    };
    let (fx, fy) = alignment.factors();
    let left = dst.left + (dst.width() - w) * fx;
    let top = dst.top + (dst.height() - h) * fy;
    Rect::new(left, top, left + w, top + h)
}

/// Anything that can paint itself into a rectangle: images, nine-patches,
/// solid fills.
pub trait Drawable: Debug + Send + Sync {
    /// Intrinsic width, or 0 for none.
    fn width(&self) -> f32 {
        0.0
    }

    /// Intrinsic height, or 0 for none.
    fn height(&self) -> f32 {
        0.0
    }

    /// Paint into `dst` on `canvas`.
    fn draw(&self, canvas: &mut dyn Canvas, dst: Rect);
}

/// A drawable that fills its destination with one color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDrawable {
    pub color: Color,
}

impl ColorDrawable {
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Drawable for ColorDrawable {
    fn draw(&self, canvas: &mut dyn Canvas, dst: Rect) {
        canvas.fill_rect(dst, self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_rect_stretch_and_sizeless() {
        let dst = Rect::new(0.0, 0.0, 80.0, 40.0);
        assert_eq!(fit_rect(10.0, 10.0, dst, ScaleMode::Stretch, Alignment::TopLeft), dst);
        assert_eq!(fit_rect(0.0, 10.0, dst, ScaleMode::None, Alignment::TopLeft), dst);
    }

    #[test]
    fn test_fit_rect_none_alignment() {
        let dst = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = fit_rect(20.0, 10.0, dst, ScaleMode::None, Alignment::BottomRight);
        assert_eq!(r, Rect::new(80.0, 90.0, 100.0, 100.0));
    }

    #[test]
    fn test_fit_rect_cover() {
        let dst = Rect::new(0.0, 0.0, 200.0, 100.0);
        let r = fit_rect(50.0, 50.0, dst, ScaleMode::Cover, Alignment::TopLeft);
        assert_eq!(r, Rect::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn test_default_pen() {
        let pen = Pen::default();
        assert_eq!(pen.style, PenStyle::Solid);
        assert_eq!(pen.width, 1.0);
        assert_eq!(pen.color, Color::BLACK);
    }
}
