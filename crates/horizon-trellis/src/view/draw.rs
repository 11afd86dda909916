//! The draw pipeline.
//!
//! A paint pass enters a view through [`ViewTree::dispatch_draw`] with the
//! canvas already translated into the view's local space and the canvas'
//! invalidated rectangle set to the part that needs repainting. Per view the
//! order is:
//!
//! 1. clip to the bound shape
//! 2. background, then the scroll offset and the content hook
//! 3. children, each intersected against the invalidated rectangle and
//!    transformed around its own center
//! 4. scroll bars, border, post-draw hook
//!
//! A view whose final alpha is below the opaque threshold, or that is
//! flagged as a layer, paints steps 1 to 3 into an off-screen
//! [`LayerSurface`] which is then composited. Layers keep their pixels
//! between frames and only repaint the damaged part.

use std::sync::Arc;

use horizon_trellis_core::logging::{span_names, targets};
use horizon_trellis_render::{
    Alignment, Canvas, Color, Drawable, EPSILON, LayerSurface, Path, Pen, PenStyle, Rect, ScaleMode, Size,
    aligned_layer_extent, is_almost_zero, with_saved_state,
};
use tracing::{trace, warn};

use super::node::{BoundShape, DrawAttributes, ViewId};
use super::tree::ViewTree;

impl ViewTree {
    fn draw_attrs(&self, id: ViewId) -> Option<&DrawAttributes> {
        self.nodes.get(id).and_then(|node| node.draw.as_deref())
    }

    fn draw_attrs_mut(&mut self, id: ViewId) -> Option<&mut DrawAttributes> {
        self.nodes.get_mut(id).and_then(|node| node.draw.as_deref_mut())
    }

    fn init_draw_attrs(&mut self, id: ViewId) -> Option<&mut DrawAttributes> {
        let radius = self.config().default_round_rect_radius;
        let node = self.nodes.get_mut(id)?;
        Some(node.draw.get_or_insert_with(|| Box::new(DrawAttributes::new(radius))))
    }

    /// Change one draw attribute and repaint the view if asked to.
    fn update_draw(&mut self, id: ViewId, redraw: bool, update: impl FnOnce(&mut DrawAttributes)) {
        if let Some(attrs) = self.init_draw_attrs(id) {
            update(attrs);
            if redraw {
                self.invalidate(id);
            }
        }
    }

    // =========================================================================
    // Background
    // =========================================================================

    pub fn background_color(&self, id: ViewId) -> Color {
        self.draw_attrs(id).map_or(Color::TRANSPARENT, |d| d.background_color)
    }

    pub fn set_background_color(&mut self, id: ViewId, color: Color, redraw: bool) {
        self.update_draw(id, redraw, |d| d.background_color = color);
    }

    pub fn background(&self, id: ViewId) -> Option<Arc<dyn Drawable>> {
        self.draw_attrs(id).and_then(|d| d.background.clone())
    }

    pub fn set_background(&mut self, id: ViewId, drawable: Option<Arc<dyn Drawable>>, redraw: bool) {
        self.update_draw(id, redraw, |d| d.background = drawable);
    }

    pub fn pressed_background(&self, id: ViewId) -> Option<Arc<dyn Drawable>> {
        self.draw_attrs(id).and_then(|d| d.background_pressed.clone())
    }

    /// Drawn instead of the background while the view is pressed.
    pub fn set_pressed_background(&mut self, id: ViewId, drawable: Option<Arc<dyn Drawable>>, redraw: bool) {
        self.update_draw(id, redraw, |d| d.background_pressed = drawable);
    }

    pub fn hover_background(&self, id: ViewId) -> Option<Arc<dyn Drawable>> {
        self.draw_attrs(id).and_then(|d| d.background_hover.clone())
    }

    /// Drawn instead of the background while the pointer hovers the view.
    pub fn set_hover_background(&mut self, id: ViewId, drawable: Option<Arc<dyn Drawable>>, redraw: bool) {
        self.update_draw(id, redraw, |d| d.background_hover = drawable);
    }

    pub fn background_scale_mode(&self, id: ViewId) -> ScaleMode {
        self.draw_attrs(id).map_or(ScaleMode::Stretch, |d| d.background_scale_mode)
    }

    pub fn set_background_scale_mode(&mut self, id: ViewId, mode: ScaleMode, redraw: bool) {
        self.update_draw(id, redraw, |d| d.background_scale_mode = mode);
    }

    pub fn background_alignment(&self, id: ViewId) -> Alignment {
        self.draw_attrs(id).map_or(Alignment::MiddleCenter, |d| d.background_alignment)
    }

    pub fn set_background_alignment(&mut self, id: ViewId, alignment: Alignment, redraw: bool) {
        self.update_draw(id, redraw, |d| d.background_alignment = alignment);
    }

    // =========================================================================
    // Border
    // =========================================================================

    pub fn border(&self, id: ViewId) -> Option<Pen> {
        self.draw_attrs(id).and_then(|d| d.border)
    }

    pub fn set_border(&mut self, id: ViewId, pen: Option<Pen>, redraw: bool) {
        self.update_draw(id, redraw, |d| d.border = pen);
    }

    pub fn has_border(&self, id: ViewId) -> bool {
        self.border(id).is_some()
    }

    /// Turn the border on with the default pen, or off. An existing pen is
    /// kept when turning on.
    pub fn set_border_enabled(&mut self, id: ViewId, enabled: bool, redraw: bool) {
        let current = self.has_border(id);
        if enabled && !current {
            self.set_border(id, Some(Pen::default()), redraw);
        } else if !enabled && current {
            self.set_border(id, None, redraw);
        }
    }

    pub fn border_color(&self, id: ViewId) -> Color {
        self.draw_attrs(id).map_or(Color::BLACK, |d| d.border_color)
    }

    pub fn set_border_color(&mut self, id: ViewId, color: Color, redraw: bool) {
        self.update_draw(id, false, |d| d.border_color = color);
        self.refresh_border_pen(id, redraw);
    }

    pub fn border_style(&self, id: ViewId) -> PenStyle {
        self.draw_attrs(id).map_or(PenStyle::Solid, |d| d.border_style)
    }

    pub fn set_border_style(&mut self, id: ViewId, style: PenStyle, redraw: bool) {
        self.update_draw(id, false, |d| d.border_style = style);
        self.refresh_border_pen(id, redraw);
    }

    pub fn border_width(&self, id: ViewId) -> f32 {
        self.draw_attrs(id).map_or(0.0, |d| d.border_width)
    }

    /// A width of zero removes the border pen.
    pub fn set_border_width(&mut self, id: ViewId, width: f32, redraw: bool) {
        self.update_draw(id, false, |d| d.border_width = width);
        self.refresh_border_pen(id, redraw);
    }

    fn refresh_border_pen(&mut self, id: ViewId, redraw: bool) {
        let Some(d) = self.draw_attrs(id) else {
            return;
        };
        let pen = (d.border_width > 0.0).then(|| Pen::new(d.border_style, d.border_width, d.border_color));
        self.set_border(id, pen, redraw);
    }

    // =========================================================================
    // Bound shape
    // =========================================================================

    pub fn bound_shape(&self, id: ViewId) -> BoundShape {
        self.draw_attrs(id).map_or(BoundShape::Rectangle, |d| d.bound_shape)
    }

    pub fn set_bound_shape(&mut self, id: ViewId, shape: BoundShape, redraw: bool) {
        self.update_draw(id, redraw, |d| d.bound_shape = shape);
    }

    pub fn round_rect_radius(&self, id: ViewId) -> Size {
        self.draw_attrs(id)
            .map_or(self.config().default_round_rect_radius, |d| d.round_rect_radius)
    }

    pub fn set_round_rect_radius(&mut self, id: ViewId, radius: Size, redraw: bool) {
        self.update_draw(id, redraw, |d| d.round_rect_radius = radius);
    }

    pub fn bound_shape_path(&self, id: ViewId) -> Path {
        self.draw_attrs(id)
            .map(|d| d.bound_shape_path.clone())
            .unwrap_or_default()
    }

    pub fn set_bound_shape_path(&mut self, id: ViewId, path: Path, redraw: bool) {
        self.update_draw(id, redraw, |d| d.bound_shape_path = path);
    }

    // =========================================================================
    // Hook switches
    // =========================================================================

    pub fn is_always_on_draw_background(&self, id: ViewId) -> bool {
        self.draw_attrs(id).is_some_and(|d| d.always_on_draw_background)
    }

    /// Call `on_draw_background` even without a background color or drawable.
    pub fn set_always_on_draw_background(&mut self, id: ViewId, enabled: bool, redraw: bool) {
        self.update_draw(id, redraw, |d| d.always_on_draw_background = enabled);
    }

    pub fn is_always_on_draw_border(&self, id: ViewId) -> bool {
        self.draw_attrs(id).is_some_and(|d| d.always_on_draw_border)
    }

    /// Call `on_draw_border` even without a border pen.
    pub fn set_always_on_draw_border(&mut self, id: ViewId, enabled: bool, redraw: bool) {
        self.update_draw(id, redraw, |d| d.always_on_draw_border = enabled);
    }

    pub fn is_pre_draw_enabled(&self, id: ViewId) -> bool {
        self.draw_attrs(id).is_some_and(|d| d.pre_draw_enabled)
    }

    pub fn set_pre_draw_enabled(&mut self, id: ViewId, enabled: bool, redraw: bool) {
        self.update_draw(id, redraw, |d| d.pre_draw_enabled = enabled);
    }

    pub fn is_post_draw_enabled(&self, id: ViewId) -> bool {
        self.draw_attrs(id).is_some_and(|d| d.post_draw_enabled)
    }

    pub fn set_post_draw_enabled(&mut self, id: ViewId, enabled: bool, redraw: bool) {
        self.update_draw(id, redraw, |d| d.post_draw_enabled = enabled);
    }

    // =========================================================================
    // Opacity and layers
    // =========================================================================

    pub fn is_opaque(&self, id: ViewId) -> bool {
        self.draw_attrs(id).is_some_and(|d| d.opaque)
    }

    /// Opaque views skip clearing their layer before a repaint.
    pub fn set_opaque(&mut self, id: ViewId, opaque: bool, redraw: bool) {
        let Some(attrs) = self.init_draw_attrs(id) else {
            return;
        };
        attrs.opaque = opaque;
        match self.nodes.get(id).and_then(|node| node.instance.clone()) {
            Some(instance) => instance.set_opaque(opaque),
            None => {
                if redraw {
                    self.invalidate_bounds_in_parent(id);
                }
            }
        }
    }

    pub fn alpha(&self, id: ViewId) -> f32 {
        self.draw_attrs(id).map_or(1.0, |d| d.alpha)
    }

    /// Static alpha times animation alpha.
    pub fn final_alpha(&self, id: ViewId) -> f32 {
        self.draw_attrs(id).map_or(1.0, |d| d.alpha * d.animation_alpha)
    }

    pub fn set_alpha(&mut self, id: ViewId, alpha: f32, redraw: bool) {
        if let Some(attrs) = self.init_draw_attrs(id) {
            attrs.alpha = alpha;
            self.apply_final_alpha(id, redraw);
        }
    }

    pub fn set_alpha_from_animation(&mut self, id: ViewId, alpha: f32, redraw: bool) {
        if let Some(attrs) = self.init_draw_attrs(id) {
            attrs.animation_alpha = alpha;
            self.apply_final_alpha(id, redraw);
        }
    }

    pub fn reset_alpha_from_animation(&mut self, id: ViewId, redraw: bool) {
        if let Some(attrs) = self.draw_attrs_mut(id) {
            attrs.animation_alpha = 1.0;
            self.apply_final_alpha(id, redraw);
        }
    }

    fn apply_final_alpha(&mut self, id: ViewId, redraw: bool) {
        match self.nodes.get(id).and_then(|node| node.instance.clone()) {
            Some(instance) => instance.set_alpha(self.final_alpha(id)),
            None => {
                if redraw {
                    self.invalidate_bounds_in_parent(id);
                }
            }
        }
    }

    pub fn is_layer(&self, id: ViewId) -> bool {
        self.draw_attrs(id).is_some_and(|d| d.layer)
    }

    /// Cache the view's content in an off-screen layer.
    pub fn set_layer(&mut self, id: ViewId, layer: bool, redraw: bool) {
        self.update_draw(id, redraw, |d| d.layer = layer);
    }

    /// Mark the whole cached layer for repaint.
    pub fn invalidate_layer(&mut self, id: ViewId) {
        if let Some(attrs) = self.draw_attrs_mut(id) {
            attrs.layer_damage.add_whole();
        }
    }

    /// Merge `rect` (local coordinates) into the layer's damage.
    pub fn invalidate_layer_rect(&mut self, id: ViewId, rect: Rect) {
        if let Some(attrs) = self.draw_attrs_mut(id) {
            attrs.layer_damage.add_damage(rect);
        }
    }

    /// Whether the view's layer has damage waiting for the next paint.
    pub fn is_layer_dirty(&self, id: ViewId) -> bool {
        self.draw_attrs(id).is_some_and(|d| d.layer_damage.is_dirty())
    }

    // =========================================================================
    // Paint pass
    // =========================================================================

    /// Paint the view and its subtree.
    ///
    /// The canvas must be in the view's local coordinates. While this runs
    /// the view is marked as drawing, so invalidations it causes inside the
    /// rectangle being painted are dropped.
    pub fn dispatch_draw(&mut self, id: ViewId, canvas: &mut dyn Canvas) {
        self.check_ui_thread("dispatch_draw");
        let rc = canvas.invalidated_rect();
        if rc.right < rc.left + EPSILON || rc.bottom < rc.top + EPSILON {
            return;
        }
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.current_drawing = true;
        node.rect_current_drawing = rc.inflate(EPSILON);
        let _span = tracing::trace_span!(target: targets::DRAW, span_names::DISPATCH_DRAW, ?id).entered();

        self.make_layout_internal(id, false);

        if self.is_pre_draw_enabled(id) {
            self.call_handler(id, |handler, tree| handler.on_pre_draw(tree, id, canvas));
        }

        self.draw(id, canvas);

        let bars = self.scroll_bars(id);
        if !bars.is_empty() {
            self.draw_children(id, canvas, &bars);
        }

        if let Some((border, post)) = self
            .draw_attrs(id)
            .map(|d| (d.always_on_draw_border || d.border.is_some(), d.post_draw_enabled))
        {
            if border {
                self.call_handler(id, |handler, tree| handler.on_draw_border(tree, id, canvas));
            }
            if post {
                self.call_handler(id, |handler, tree| handler.on_post_draw(tree, id, canvas));
            }
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.current_drawing = false;
        }
    }

    /// Paint the view's own content and children, through a layer when
    /// needed. Border and scroll bars are left to [`dispatch_draw`](Self::dispatch_draw).
    pub fn draw(&mut self, id: ViewId, canvas: &mut dyn Canvas) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.width() <= 0.0 || node.height() <= 0.0 {
            return;
        }
        let alpha = self.final_alpha(id);
        if alpha < self.config().min_visible_alpha {
            trace!(target: targets::DRAW, ?id, alpha, "skipping invisible view");
            return;
        }
        let require_layer = alpha < self.config().opaque_alpha_threshold || self.is_layer(id);
        if require_layer && self.draw_through_layer(id, canvas, alpha) {
            return;
        }
        with_saved_state(canvas, |canvas| self.draw_content(id, canvas));
    }

    /// Repaint the damaged part of the view's layer and composite it.
    /// Returns `false` when no layer could be used.
    fn draw_through_layer(&mut self, id: ViewId, canvas: &mut dyn Canvas, alpha: f32) -> bool {
        let config = *self.config();
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let width = node.width().ceil() as u32;
        let height = node.height().ceil() as u32;
        if width == 0 || height == 0 {
            return false;
        }
        if width > config.max_layer_size || height > config.max_layer_size {
            warn!(target: targets::DRAW, ?id, width, height, "layer refused, drawing directly");
            return false;
        }
        let Some(attrs) = node.draw.as_deref_mut() else {
            return false;
        };

        let mut surface = match attrs.layer_surface.take() {
            Some(surface) if surface.width() >= width && surface.height() >= height => surface,
            _ => {
                let layer_width = aligned_layer_extent(width, config.layer_alignment);
                let layer_height = aligned_layer_extent(height, config.layer_alignment);
                match canvas.create_layer(layer_width, layer_height) {
                    Ok(surface) => {
                        attrs.layer_damage.add_whole();
                        surface
                    }
                    Err(err) => {
                        warn!(target: targets::DRAW, ?id, %err, "layer allocation failed, drawing directly");
                        return false;
                    }
                }
            }
        };

        if let Some(rc) = attrs.layer_damage.take(width, height) {
            if !attrs.opaque && !attrs.background_color.is_opaque() {
                surface.reset_pixels(rc, Color::TRANSPARENT);
            }
            trace!(target: targets::DRAW, ?id, ?rc, "repainting layer");
            let layer_canvas = surface.canvas();
            layer_canvas.save();
            layer_canvas.set_invalidated_rect(rc);
            self.draw_content(id, layer_canvas);
            layer_canvas.restore();
        }

        let rc = canvas.invalidated_rect();
        canvas.draw_layer(rc, surface.as_ref(), rc, alpha);

        if let Some(attrs) = self.draw_attrs_mut(id) {
            attrs.layer_surface = Some(surface);
        }
        true
    }

    /// Clip, background, content and children.
    pub(crate) fn draw_content(&mut self, id: ViewId, canvas: &mut dyn Canvas) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let has_children = !node.children.is_empty();
        let mut draw_background = false;
        if let Some(d) = node.draw.as_deref() {
            let clip = Rect::new(0.0, 0.0, node.width() - 1.0, node.height() - 1.0).fixed();
            match d.bound_shape {
                BoundShape::RoundRect => canvas.clip_round_rect(clip, d.round_rect_radius),
                BoundShape::Ellipse => canvas.clip_ellipse(clip),
                BoundShape::Path => canvas.clip_path(&d.bound_shape_path),
                BoundShape::Rectangle => {}
            }
            draw_background = d.always_on_draw_background || !d.background_color.is_zero() || d.background.is_some();
        }

        with_saved_state(canvas, |canvas| {
            let rc = canvas.invalidated_rect();
            canvas.clip_rect(rc);
            if draw_background {
                self.call_handler(id, |handler, tree| handler.on_draw_background(tree, id, canvas));
            }
            let (sx, sy) = (self.scroll_x(id), self.scroll_y(id));
            if !is_almost_zero(sx) || !is_almost_zero(sy) {
                canvas.translate(-sx, -sy);
            }
            self.call_handler(id, |handler, tree| handler.on_draw(tree, id, canvas));
        });

        if has_children {
            self.call_handler(id, |handler, tree| handler.on_draw_children(tree, id, canvas));
        }
    }

    /// Paint `children` of `id` back to front.
    ///
    /// Each child only paints the part of the current invalidated rectangle
    /// it covers. Children backed by their own instance paint through it and
    /// are skipped.
    pub fn draw_children(&mut self, id: ViewId, canvas: &mut dyn Canvas, children: &[ViewId]) {
        if children.is_empty() {
            return;
        }
        let rc_parent = canvas.invalidated_rect();
        for &child in children {
            let Some(node) = self.nodes.get(child) else {
                continue;
            };
            if !node.is_visible() || node.instance.is_some() {
                continue;
            }
            let frame = node.frame;
            let bounds = node.bounds();
            match self.final_transform(child) {
                Some(matrix) => {
                    let rc = self.convert_rect_from_parent(child, rc_parent).inflate(1.0);
                    let Some(rc) = rc.intersect(&bounds) else {
                        continue;
                    };
                    let (ax, ay) = (bounds.width() / 2.0, bounds.height() / 2.0);
                    canvas.save();
                    canvas.clip_rect(rc_parent);
                    canvas.set_invalidated_rect(rc);
                    canvas.translate(frame.left + ax, frame.top + ay);
                    canvas.concat_transform(&matrix);
                    canvas.translate(-ax, -ay);
                    self.dispatch_draw(child, canvas);
                    canvas.restore();
                }
                None => {
                    let Some(rc) = rc_parent.offset(-frame.left, -frame.top).intersect(&bounds) else {
                        continue;
                    };
                    canvas.save();
                    canvas.set_invalidated_rect(rc);
                    canvas.translate(frame.left, frame.top);
                    self.dispatch_draw(child, canvas);
                    canvas.restore();
                }
            }
        }
        canvas.set_invalidated_rect(rc_parent);
        trace!(target: targets::DRAW, ?id, count = children.len(), "drew children");
    }

    /// Background color, then the background drawable matching the press and
    /// hover state.
    pub fn draw_default_background(&mut self, id: ViewId, canvas: &mut dyn Canvas) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let Some(d) = node.draw.as_deref() else {
            return;
        };
        let state_background = if node.pressed {
            d.background_pressed.clone()
        } else if node.hover {
            d.background_hover.clone()
        } else {
            None
        };
        let background = state_background.or_else(|| d.background.clone());
        let rc = node.bounds();
        if d.background_color.a > 0.0 {
            canvas.fill_rect(rc, d.background_color);
        }
        if let Some(background) = background {
            canvas.draw_drawable(rc, background.as_ref(), d.background_scale_mode, d.background_alignment);
        }
    }

    /// Stroke the bound shape with the border pen.
    pub fn draw_default_border(&mut self, id: ViewId, canvas: &mut dyn Canvas) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let Some(d) = node.draw.as_deref() else {
            return;
        };
        let Some(pen) = d.border else {
            return;
        };
        let (w, h) = (node.width(), node.height());
        match d.bound_shape {
            BoundShape::RoundRect => {
                let rc = Rect::new(1.0, 1.0, w - 2.0, h - 2.0).fixed();
                canvas.draw_round_rect(rc, d.round_rect_radius, &pen);
            }
            BoundShape::Ellipse => {
                let rc = Rect::new(1.0, 1.0, w - 2.0, h - 2.0).fixed();
                canvas.draw_ellipse(rc, &pen);
            }
            BoundShape::Path => canvas.draw_path(&d.bound_shape_path, &pen),
            BoundShape::Rectangle => {
                let rc = Rect::new(0.0, 0.0, w - 1.0, h - 1.0).fixed();
                let anti_alias = canvas.is_anti_alias();
                canvas.set_anti_alias(false);
                canvas.draw_rect(rc, &pen);
                canvas.set_anti_alias(anti_alias);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use horizon_trellis_render::{CanvasOp, ColorDrawable, RecordingCanvas};

    use super::*;
    use crate::config::ViewTreeConfig;
    use crate::view::Visibility;

    fn boxed(tree: &mut ViewTree, frame: Rect, color: Color) -> ViewId {
        let id = tree.create_view();
        tree.set_frame(id, frame, false);
        tree.set_background_color(id, color, false);
        id
    }

    fn fills(canvas: &RecordingCanvas) -> Vec<(Color, Rect)> {
        canvas
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                CanvasOp::FillRect { color, device, .. } => Some((color, device)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_children_paint_back_to_front_in_parent_space() {
        let mut tree = ViewTree::new();
        let root = boxed(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0), Color::WHITE);
        let a = boxed(&mut tree, Rect::new(10.0, 10.0, 30.0, 30.0), Color::RED);
        let b = boxed(&mut tree, Rect::new(20.0, 20.0, 50.0, 50.0), Color::BLUE);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();

        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        tree.dispatch_draw(root, &mut canvas);

        assert_eq!(
            fills(&canvas),
            vec![
                (Color::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
                (Color::RED, Rect::new(10.0, 10.0, 30.0, 30.0)),
                (Color::BLUE, Rect::new(20.0, 20.0, 50.0, 50.0)),
            ]
        );
        assert_eq!(canvas.save_depth(), 0);
        assert_eq!(canvas.invalidated_rect(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_children_outside_damage_are_skipped() {
        let mut tree = ViewTree::new();
        let root = boxed(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0), Color::WHITE);
        let a = boxed(&mut tree, Rect::new(60.0, 60.0, 90.0, 90.0), Color::RED);
        tree.add_child(root, a).unwrap();

        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        canvas.set_invalidated_rect(Rect::new(0.0, 0.0, 40.0, 40.0));
        tree.dispatch_draw(root, &mut canvas);

        assert!(fills(&canvas).iter().all(|(color, _)| *color != Color::RED));
    }

    #[test]
    fn test_hidden_and_transparent_views_are_not_drawn() {
        let mut tree = ViewTree::new();
        let root = tree.create_view();
        tree.set_frame(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        let hidden = boxed(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED);
        let faded = boxed(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLUE);
        tree.add_child(root, hidden).unwrap();
        tree.add_child(root, faded).unwrap();
        tree.set_visibility(hidden, Visibility::Hidden, false);
        tree.set_alpha(faded, 0.001, false);

        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        tree.dispatch_draw(root, &mut canvas);
        assert!(fills(&canvas).is_empty());
    }

    #[test]
    fn test_translated_child_is_drawn_offset() {
        let mut tree = ViewTree::new();
        let root = tree.create_view();
        tree.set_frame(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        let a = boxed(&mut tree, Rect::new(10.0, 10.0, 20.0, 20.0), Color::RED);
        tree.add_child(root, a).unwrap();
        tree.set_translation(a, 5.0, 0.0, false);

        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        tree.dispatch_draw(root, &mut canvas);
        let drawn = fills(&canvas);
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0].1.is_almost_equal(&Rect::new(15.0, 10.0, 25.0, 20.0)));
    }

    #[test]
    fn test_partial_alpha_draws_through_layer() {
        let mut tree = ViewTree::new();
        let v = boxed(&mut tree, Rect::new(0.0, 0.0, 300.0, 20.0), Color::RED);
        tree.set_alpha(v, 0.5, false);

        let mut canvas = RecordingCanvas::new(300.0, 20.0);
        tree.dispatch_draw(v, &mut canvas);
        let ops = canvas.ops();
        assert!(ops.contains(&CanvasOp::CreateLayer { width: 512, height: 256 }));
        assert!(ops.iter().any(|op| matches!(op, CanvasOp::DrawLayer { alpha, .. } if *alpha == 0.5)));
        assert!(!tree.is_layer_dirty(v));

        // Nothing changed: the cached layer is composited without repainting.
        canvas.clear();
        tree.dispatch_draw(v, &mut canvas);
        let ops = canvas.ops();
        assert!(fills(&canvas).is_empty());
        assert!(!ops.iter().any(|op| matches!(op, CanvasOp::CreateLayer { .. })));
        assert!(ops.iter().any(|op| matches!(op, CanvasOp::DrawLayer { .. })));
    }

    #[test]
    fn test_layer_repaints_only_damage() {
        let mut tree = ViewTree::new();
        let v = boxed(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0), Color::RED.with_alpha(0.5));
        tree.set_layer(v, true, false);
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        tree.dispatch_draw(v, &mut canvas);

        canvas.clear();
        tree.invalidate_layer_rect(v, Rect::new(10.0, 10.0, 20.0, 20.0));
        tree.dispatch_draw(v, &mut canvas);
        let ops = canvas.ops();
        assert!(ops.contains(&CanvasOp::SetInvalidatedRect(Rect::new(10.0, 10.0, 20.0, 20.0))));
        assert!(ops.iter().any(|op| matches!(op, CanvasOp::ResetPixels { .. })));
    }

    #[test]
    fn test_oversized_layer_is_refused() {
        let mut tree = ViewTree::with_config(ViewTreeConfig::default().with_max_layer_size(64));
        let v = boxed(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0), Color::RED);
        tree.set_layer(v, true, false);
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        tree.dispatch_draw(v, &mut canvas);
        let ops = canvas.ops();
        assert!(!ops.iter().any(|op| matches!(op, CanvasOp::CreateLayer { .. })));
        assert_eq!(fills(&canvas).len(), 1);
    }

    #[test]
    fn test_border_follows_bound_shape() {
        let mut tree = ViewTree::new();
        let v = tree.create_view();
        tree.set_frame(v, Rect::new(0.0, 0.0, 20.0, 10.0), false);
        tree.set_border_width(v, 2.0, false);
        assert_eq!(tree.border(v), Some(Pen::new(PenStyle::Solid, 2.0, Color::BLACK)));

        let mut canvas = RecordingCanvas::new(20.0, 10.0);
        tree.dispatch_draw(v, &mut canvas);
        assert!(canvas.ops().iter().any(|op| matches!(
            op,
            CanvasOp::DrawRect { rect, anti_alias: false, .. } if *rect == Rect::new(0.0, 0.0, 19.0, 9.0)
        )));
        assert!(canvas.is_anti_alias());

        tree.set_bound_shape(v, BoundShape::Ellipse, false);
        canvas.clear();
        tree.dispatch_draw(v, &mut canvas);
        let ops = canvas.ops();
        assert!(ops.contains(&CanvasOp::ClipEllipse(Rect::new(0.0, 0.0, 19.0, 9.0))));
        assert!(ops.iter().any(|op| matches!(op, CanvasOp::DrawEllipse { .. })));

        tree.set_border_width(v, 0.0, false);
        assert!(!tree.has_border(v));
    }

    #[test]
    fn test_pressed_background_replaces_background() {
        let mut tree = ViewTree::new();
        let v = tree.create_view();
        tree.set_frame(v, Rect::new(0.0, 0.0, 10.0, 10.0), false);
        tree.set_background(v, Some(Arc::new(ColorDrawable::new(Color::RED))), false);
        tree.set_pressed_background(v, Some(Arc::new(ColorDrawable::new(Color::GREEN))), false);
        tree.set_pressed_state(v, true, false);

        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        tree.dispatch_draw(v, &mut canvas);
        assert!(canvas.ops().iter().any(|op| matches!(op, CanvasOp::DrawDrawable { .. })));
        assert_eq!(fills(&canvas), vec![(Color::GREEN, Rect::new(0.0, 0.0, 10.0, 10.0))]);
    }

    #[test]
    fn test_drawing_flag_cleared_after_pass() {
        let mut tree = ViewTree::new();
        let v = boxed(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED);
        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        tree.dispatch_draw(v, &mut canvas);
        assert!(!tree.nodes[v].current_drawing);
    }
}
