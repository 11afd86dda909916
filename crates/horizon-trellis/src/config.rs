//! Numeric policy of a view tree.
//!
//! The defaults are what a desktop host expects; tests shrink or grow them
//! to reach edge cases cheaply.

use horizon_trellis_render::Size;

/// Tunable constants used by the draw, scroll and invalidation paths.
///
/// # Example
///
/// ```
/// use horizon_trellis::ViewTreeConfig;
///
/// let config = ViewTreeConfig::default()
///     .with_max_layer_size(1024)
///     .with_default_scroll_bar_width(8.0);
/// assert_eq!(config.max_layer_size, 1024);
/// assert_eq!(config.layer_alignment, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTreeConfig {
    /// Layers wider or taller than this are refused and the view draws
    /// directly.
    pub max_layer_size: u32,
    /// Layer surfaces are allocated in multiples of this.
    pub layer_alignment: u32,
    /// Below this final alpha a view is not drawn at all.
    pub min_visible_alpha: f32,
    /// Below this final alpha a view is drawn through a layer.
    pub opaque_alpha_threshold: f32,
    /// One scroll "line" is the viewport extent divided by this.
    pub scroll_line_divisor: f32,
    /// Extra margin added around a view's footprint in its parent when the
    /// footprint is invalidated after a move.
    pub bounds_invalidate_inflation: f32,
    /// Corner radius used by the round-rect bound shape until one is set.
    pub default_round_rect_radius: Size,
    /// Thickness of newly created scroll bars.
    pub default_scroll_bar_width: f32,
}

impl Default for ViewTreeConfig {
    fn default() -> Self {
        Self {
            max_layer_size: 8192,
            layer_alignment: 256,
            min_visible_alpha: 0.005,
            opaque_alpha_threshold: 0.995,
            scroll_line_divisor: 20.0,
            bounds_invalidate_inflation: 2.0,
            default_round_rect_radius: Size::new(5.0, 5.0),
            default_scroll_bar_width: 12.0,
        }
    }
}

impl ViewTreeConfig {
    pub fn with_max_layer_size(mut self, size: u32) -> Self {
        self.max_layer_size = size;
        self
    }

    pub fn with_layer_alignment(mut self, alignment: u32) -> Self {
        self.layer_alignment = alignment;
        self
    }

    pub fn with_min_visible_alpha(mut self, alpha: f32) -> Self {
        self.min_visible_alpha = alpha;
        self
    }

    pub fn with_opaque_alpha_threshold(mut self, alpha: f32) -> Self {
        self.opaque_alpha_threshold = alpha;
        self
    }

    pub fn with_scroll_line_divisor(mut self, divisor: f32) -> Self {
        self.scroll_line_divisor = divisor;
        self
    }

    pub fn with_bounds_invalidate_inflation(mut self, inflation: f32) -> Self {
        self.bounds_invalidate_inflation = inflation;
        self
    }

    pub fn with_default_round_rect_radius(mut self, radius: Size) -> Self {
        self.default_round_rect_radius = radius;
        self
    }

    pub fn with_default_scroll_bar_width(mut self, width: f32) -> Self {
        self.default_scroll_bar_width = width;
        self
    }

    /// The length of one scroll line for a viewport `extent` long.
    pub fn scroll_line(&self, extent: f32) -> f32 {
        if self.scroll_line_divisor > 0.0 {
            extent / self.scroll_line_divisor
        } else {
            extent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewTreeConfig::default();
        assert_eq!(config.max_layer_size, 8192);
        assert_eq!(config.default_round_rect_radius, Size::new(5.0, 5.0));
        assert_eq!(config.scroll_line(200.0), 10.0);
    }

    #[test]
    fn test_zero_divisor_scrolls_whole_extent() {
        let config = ViewTreeConfig::default().with_scroll_line_divisor(0.0);
        assert_eq!(config.scroll_line(120.0), 120.0);
    }
}
