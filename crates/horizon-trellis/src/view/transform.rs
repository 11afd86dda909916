//! Per-view affine transforms and coordinate conversion.
//!
//! A view's final transform is either an explicit matrix (`set_transform`)
//! or the composition of translation, scale and rotation components about an
//! anchor. Each has a static value and a value driven by animations; the two
//! are combined (translations and rotations add, scales multiply). The
//! transform pivots around the view's center, offset by the anchor.
//!
//! Composed matrices are cached and only recomputed after a setter
//! invalidated them.

use horizon_trellis_render::{Point, Rect, Transform2D, is_almost_zero};

use super::node::{TransformAttributes, TransformComponents, ViewId};
use super::tree::ViewTree;

/// Compose the component transform, skipping factors that are identity.
///
/// Application order: translate by `-anchor`, rotate, scale, translate by
/// `anchor`, translate.
pub(crate) fn compose_components(
    static_components: &TransformComponents,
    animation: &TransformComponents,
    anchor_x: f32,
    anchor_y: f32,
) -> Option<Transform2D> {
    let tx = static_components.translation_x + animation.translation_x;
    let ty = static_components.translation_y + animation.translation_y;
    let sx = static_components.scale_x * animation.scale_x;
    let sy = static_components.scale_y * animation.scale_y;
    let rotation = static_components.rotation + animation.rotation;

    let translates = !(is_almost_zero(tx) && is_almost_zero(ty));
    let scales = !(is_almost_zero(sx - 1.0) && is_almost_zero(sy - 1.0));
    let rotates = !is_almost_zero(rotation);

    let mut matrix: Option<Transform2D> = None;
    let mut push = |step: Transform2D| {
        matrix = Some(match matrix {
            Some(m) => m.followed_by(&step),
            None => step,
        });
    };
    if scales || rotates {
        let anchored = !(is_almost_zero(anchor_x) && is_almost_zero(anchor_y));
        if anchored {
            push(Transform2D::translate(-anchor_x, -anchor_y));
        }
        if rotates {
            push(Transform2D::rotate(rotation));
        }
        if scales {
            push(Transform2D::scale_xy(sx, sy));
        }
        if anchored {
            push(Transform2D::translate(anchor_x, anchor_y));
        }
    }
    if translates {
        push(Transform2D::translate(tx, ty));
    }
    matrix
}

impl TransformAttributes {
    fn final_transform(&self) -> Option<Transform2D> {
        if self.invalid_final.replace(false) {
            self.invalid_inverse.set(true);
            let base = match self.static_transform {
                Some(matrix) => Some(matrix),
                None => {
                    if self.invalid_calc.replace(false) {
                        self.calc_transform.set(compose_components(
                            &self.static_components,
                            &self.animation_components,
                            self.anchor_offset_x,
                            self.anchor_offset_y,
                        ));
                    }
                    self.calc_transform.get()
                }
            };
            let composed = match (base, self.animation_transform) {
                (Some(base), Some(animation)) => Some(base.followed_by(&animation)),
                (Some(base), None) => Some(base),
                (None, animation) => animation,
            };
            self.final_transform.set(composed);
        }
        self.final_transform.get()
    }

    fn final_inverse_transform(&self) -> Option<Transform2D> {
        let forward = self.final_transform();
        if self.invalid_inverse.replace(false) {
            self.inverse_transform.set(forward.and_then(|m| m.inverse()));
        }
        self.inverse_transform.get()
    }
}

impl ViewTree {
    fn transform_attrs(&self, id: ViewId) -> Option<&TransformAttributes> {
        self.nodes.get(id).and_then(|node| node.transform.as_deref())
    }

    fn init_transform_attrs(&mut self, id: ViewId) -> Option<&mut TransformAttributes> {
        let node = self.nodes.get_mut(id)?;
        Some(node.transform.get_or_insert_with(Default::default).as_mut())
    }

    fn update_components(&mut self, id: ViewId, redraw: bool, update: impl FnOnce(&mut TransformAttributes)) {
        if let Some(attrs) = self.init_transform_attrs(id) {
            update(attrs);
            self.apply_calc_transform(id, redraw);
        }
    }

    /// The combined transform, `None` when it is the identity.
    pub fn final_transform(&self, id: ViewId) -> Option<Transform2D> {
        self.transform_attrs(id).and_then(TransformAttributes::final_transform)
    }

    pub fn final_inverse_transform(&self, id: ViewId) -> Option<Transform2D> {
        self.transform_attrs(id)
            .and_then(TransformAttributes::final_inverse_transform)
    }

    /// The explicit matrix set with [`set_transform`](Self::set_transform).
    pub fn transform(&self, id: ViewId) -> Transform2D {
        self.transform_attrs(id)
            .and_then(|attrs| attrs.static_transform)
            .unwrap_or(Transform2D::IDENTITY)
    }

    /// Override the components with an explicit matrix.
    pub fn set_transform(&mut self, id: ViewId, matrix: Transform2D, redraw: bool) {
        if let Some(attrs) = self.init_transform_attrs(id) {
            attrs.static_transform = Some(matrix);
            self.apply_final_transform(id, redraw);
        }
    }

    pub fn reset_transform(&mut self, id: ViewId, redraw: bool) {
        let Some(attrs) = self.nodes.get_mut(id).and_then(|node| node.transform.as_deref_mut()) else {
            return;
        };
        if attrs.static_transform.take().is_some() {
            self.apply_final_transform(id, redraw);
        }
    }

    pub fn set_transform_from_animation(&mut self, id: ViewId, matrix: Transform2D, redraw: bool) {
        if let Some(attrs) = self.init_transform_attrs(id) {
            attrs.animation_transform = Some(matrix);
            self.apply_final_transform(id, redraw);
        }
    }

    pub fn reset_transform_from_animation(&mut self, id: ViewId, redraw: bool) {
        let Some(attrs) = self.nodes.get_mut(id).and_then(|node| node.transform.as_deref_mut()) else {
            return;
        };
        if attrs.animation_transform.take().is_some() {
            self.apply_final_transform(id, redraw);
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    pub fn translation_x(&self, id: ViewId) -> f32 {
        self.transform_attrs(id).map_or(0.0, |a| a.static_components.translation_x)
    }

    pub fn translation_y(&self, id: ViewId) -> f32 {
        self.transform_attrs(id).map_or(0.0, |a| a.static_components.translation_y)
    }

    pub fn set_translation_x(&mut self, id: ViewId, tx: f32, redraw: bool) {
        self.update_components(id, redraw, |a| a.static_components.translation_x = tx);
    }

    pub fn set_translation_y(&mut self, id: ViewId, ty: f32, redraw: bool) {
        self.update_components(id, redraw, |a| a.static_components.translation_y = ty);
    }

    pub fn set_translation(&mut self, id: ViewId, tx: f32, ty: f32, redraw: bool) {
        self.update_components(id, redraw, |a| {
            a.static_components.translation_x = tx;
            a.static_components.translation_y = ty;
        });
    }

    pub fn set_translation_from_animation(&mut self, id: ViewId, tx: f32, ty: f32, redraw: bool) {
        self.update_components(id, redraw, |a| {
            a.animation_components.translation_x = tx;
            a.animation_components.translation_y = ty;
        });
    }

    pub fn reset_translation_from_animation(&mut self, id: ViewId, redraw: bool) {
        if self.transform_attrs(id).is_some() {
            self.set_translation_from_animation(id, 0.0, 0.0, redraw);
        }
    }

    pub fn scale_x(&self, id: ViewId) -> f32 {
        self.transform_attrs(id).map_or(1.0, |a| a.static_components.scale_x)
    }

    pub fn scale_y(&self, id: ViewId) -> f32 {
        self.transform_attrs(id).map_or(1.0, |a| a.static_components.scale_y)
    }

    pub fn set_scale_x(&mut self, id: ViewId, sx: f32, redraw: bool) {
        self.update_components(id, redraw, |a| a.static_components.scale_x = sx);
    }

    pub fn set_scale_y(&mut self, id: ViewId, sy: f32, redraw: bool) {
        self.update_components(id, redraw, |a| a.static_components.scale_y = sy);
    }

    pub fn set_scale(&mut self, id: ViewId, sx: f32, sy: f32, redraw: bool) {
        self.update_components(id, redraw, |a| {
            a.static_components.scale_x = sx;
            a.static_components.scale_y = sy;
        });
    }

    pub fn set_scale_from_animation(&mut self, id: ViewId, sx: f32, sy: f32, redraw: bool) {
        self.update_components(id, redraw, |a| {
            a.animation_components.scale_x = sx;
            a.animation_components.scale_y = sy;
        });
    }

    pub fn reset_scale_from_animation(&mut self, id: ViewId, redraw: bool) {
        if self.transform_attrs(id).is_some() {
            self.set_scale_from_animation(id, 1.0, 1.0, redraw);
        }
    }

    /// Static rotation in radians.
    pub fn rotation(&self, id: ViewId) -> f32 {
        self.transform_attrs(id).map_or(0.0, |a| a.static_components.rotation)
    }

    pub fn set_rotation(&mut self, id: ViewId, radians: f32, redraw: bool) {
        self.update_components(id, redraw, |a| a.static_components.rotation = radians);
    }

    pub fn set_rotation_from_animation(&mut self, id: ViewId, radians: f32, redraw: bool) {
        self.update_components(id, redraw, |a| a.animation_components.rotation = radians);
    }

    pub fn reset_rotation_from_animation(&mut self, id: ViewId, redraw: bool) {
        if self.transform_attrs(id).is_some() {
            self.set_rotation_from_animation(id, 0.0, redraw);
        }
    }

    pub fn anchor_offset_x(&self, id: ViewId) -> f32 {
        self.transform_attrs(id).map_or(0.0, |a| a.anchor_offset_x)
    }

    pub fn anchor_offset_y(&self, id: ViewId) -> f32 {
        self.transform_attrs(id).map_or(0.0, |a| a.anchor_offset_y)
    }

    pub fn set_anchor_offset_x(&mut self, id: ViewId, x: f32, redraw: bool) {
        self.update_components(id, redraw, |a| a.anchor_offset_x = x);
    }

    pub fn set_anchor_offset_y(&mut self, id: ViewId, y: f32, redraw: bool) {
        self.update_components(id, redraw, |a| a.anchor_offset_y = y);
    }

    /// Move the scale/rotate pivot away from the center.
    pub fn set_anchor_offset(&mut self, id: ViewId, x: f32, y: f32, redraw: bool) {
        self.update_components(id, redraw, |a| {
            a.anchor_offset_x = x;
            a.anchor_offset_y = y;
        });
    }

    /// Combined translation, rotation, scale and anchor:
    /// `((tx, ty), rotation, (sx, sy), (ax, ay))`.
    #[allow(clippy::type_complexity)]
    pub fn final_translation_rotation_scale(&self, id: ViewId) -> Option<((f32, f32), f32, (f32, f32), (f32, f32))> {
        let attrs = self.transform_attrs(id)?;
        let (s, a) = (&attrs.static_components, &attrs.animation_components);
        Some((
            (s.translation_x + a.translation_x, s.translation_y + a.translation_y),
            s.rotation + a.rotation,
            (s.scale_x * a.scale_x, s.scale_y * a.scale_y),
            (attrs.anchor_offset_x, attrs.anchor_offset_y),
        ))
    }

    fn apply_calc_transform(&mut self, id: ViewId, redraw: bool) {
        let Some(attrs) = self.transform_attrs(id) else {
            return;
        };
        attrs.invalid_calc.set(true);
        if attrs.static_transform.is_none() {
            self.apply_final_transform(id, redraw);
        }
    }

    fn apply_final_transform(&mut self, id: ViewId, redraw: bool) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let Some(attrs) = node.transform.as_deref() else {
            return;
        };
        attrs.invalid_final.set(true);
        if let Some(instance) = node.instance.clone() {
            let matrix = self.final_transform(id).unwrap_or(Transform2D::IDENTITY);
            instance.set_transform(&matrix);
        }
        self.update_and_invalidate_bounds_in_parent(id, redraw);
    }

    // =========================================================================
    // Coordinate conversion
    // =========================================================================

    fn center_of(&self, id: ViewId) -> (f32, f32) {
        let frame = self.frame(id);
        (frame.width() / 2.0, frame.height() / 2.0)
    }

    /// Map a point from the parent's coordinates into the view's.
    pub fn convert_coordinate_from_parent(&self, id: ViewId, point: Point) -> Point {
        let Some(node) = self.nodes.get(id) else {
            return point;
        };
        if node.parent.is_none() {
            return point;
        }
        let mut pt = Point::new(point.x - node.frame.left, point.y - node.frame.top);
        if let Some(inverse) = self.final_inverse_transform(id) {
            let (ax, ay) = self.center_of(id);
            pt = inverse.transform_point(pt.offset(-ax, -ay)).offset(ax, ay);
        }
        pt
    }

    /// Map a point from the view's coordinates into the parent's.
    pub fn convert_coordinate_to_parent(&self, id: ViewId, point: Point) -> Point {
        let Some(node) = self.nodes.get(id) else {
            return point;
        };
        if node.parent.is_none() {
            return point;
        }
        let mut pt = point;
        if let Some(forward) = self.final_transform(id) {
            let (ax, ay) = self.center_of(id);
            pt = forward.transform_point(pt.offset(-ax, -ay)).offset(ax, ay);
        }
        pt.offset(node.frame.left, node.frame.top)
    }

    /// The bounding box of `rect` (parent coordinates) in the view's
    /// coordinates.
    pub fn convert_rect_from_parent(&self, id: ViewId, rect: Rect) -> Rect {
        let Some(node) = self.nodes.get(id) else {
            return rect;
        };
        if node.parent.is_none() {
            return rect;
        }
        let (ox, oy) = (node.frame.left, node.frame.top);
        match self.final_inverse_transform(id) {
            Some(inverse) => {
                let (ax, ay) = self.center_of(id);
                let corners = rect
                    .corner_points()
                    .map(|p| inverse.transform_point(p.offset(-ox - ax, -oy - ay)).offset(ax, ay));
                Rect::from_points(&corners)
            }
            None => rect.offset(-ox, -oy),
        }
    }

    /// The bounding box of `rect` (view coordinates) in the parent's
    /// coordinates.
    pub fn convert_rect_to_parent(&self, id: ViewId, rect: Rect) -> Rect {
        let Some(node) = self.nodes.get(id) else {
            return rect;
        };
        if node.parent.is_none() {
            return rect;
        }
        let (ox, oy) = (node.frame.left, node.frame.top);
        match self.final_transform(id) {
            Some(forward) => {
                let (ax, ay) = self.center_of(id);
                let corners = rect
                    .corner_points()
                    .map(|p| forward.transform_point(p.offset(-ax, -ay)).offset(ax + ox, ay + oy));
                Rect::from_points(&corners)
            }
            None => rect.offset(ox, oy),
        }
    }

    /// Map a screen point into the view, through the nearest view backed by
    /// an instance.
    pub fn convert_coordinate_from_screen(&self, id: ViewId, point: Point) -> Point {
        let Some(node) = self.nodes.get(id) else {
            return point;
        };
        let Some(parent) = node.parent else {
            return point;
        };
        if let Some(instance) = node.instance.as_ref() {
            return instance.convert_coordinate_from_screen_to_view(point);
        }
        let in_parent = self.convert_coordinate_from_screen(parent, point);
        self.convert_coordinate_from_parent(id, in_parent)
    }

    pub fn convert_coordinate_to_screen(&self, id: ViewId, point: Point) -> Point {
        let Some(node) = self.nodes.get(id) else {
            return point;
        };
        let Some(parent) = node.parent else {
            return point;
        };
        if let Some(instance) = node.instance.as_ref() {
            return instance.convert_coordinate_from_view_to_screen(point);
        }
        let in_parent = self.convert_coordinate_to_parent(id, point);
        self.convert_coordinate_to_screen(parent, in_parent)
    }
}
