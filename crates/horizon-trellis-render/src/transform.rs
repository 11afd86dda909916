//! 2D affine transformations.

use crate::types::{Point, Rect, is_almost_equal};

/// A 2D affine transformation matrix.
///
/// Stored as a 3x2 matrix in column-major order:
/// ```text
/// | m00 m10 m20 |   | scale_x  skew_x   translate_x |
/// | m01 m11 m21 | = | skew_y   scale_y  translate_y |
/// ```
///
/// so a point maps as `x' = m00*x + m10*y + m20`, `y' = m01*x + m11*y + m21`.
///
/// # Composing
///
/// [`then`](Self::then) is matrix multiplication (`self * other`: `other`
/// applies first). [`followed_by`](Self::followed_by) reads in application
/// order, which is how view transforms are described.
///
/// ```
/// use horizon_trellis_render::{Point, Transform2D};
///
/// let t = Transform2D::translate(10.0, 0.0).followed_by(&Transform2D::scale(2.0));
/// // translate first: 5 + 10 = 15, then scale: 30
/// assert_eq!(t.transform_point(Point::new(5.0, 0.0)), Point::new(30.0, 0.0));
///
/// let inverse = t.inverse().unwrap();
/// let back = inverse.transform_point(Point::new(30.0, 0.0));
/// assert!((back.x - 5.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    m: [f32; 6],
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    /// The identity transform (no transformation).
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    #[inline]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 1.0, tx, ty],
        }
    }

    /// Uniform scale.
    #[inline]
    pub const fn scale(s: f32) -> Self {
        Self::scale_xy(s, s)
    }

    #[inline]
    pub const fn scale_xy(sx: f32, sy: f32) -> Self {
        Self {
            m: [sx, 0.0, 0.0, sy, 0.0, 0.0],
        }
    }

    /// Rotation by `angle` radians (clockwise on a y-down screen).
    #[inline]
    pub fn rotate(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            m: [cos, sin, -sin, cos, 0.0, 0.0],
        }
    }

    /// Matrix product `self * other`: the result applies `other` first.
    #[inline]
    pub fn then(&self, other: &Self) -> Self {
        let a = &self.m;
        let b = &other.m;
        Self {
            m: [
                a[0] * b[0] + a[2] * b[1],
                a[1] * b[0] + a[3] * b[1],
                a[0] * b[2] + a[2] * b[3],
                a[1] * b[2] + a[3] * b[3],
                a[0] * b[4] + a[2] * b[5] + a[4],
                a[1] * b[4] + a[3] * b[5] + a[5],
            ],
        }
    }

    /// The transform that applies `self` and then `next`.
    #[inline]
    pub fn followed_by(&self, next: &Self) -> Self {
        next.then(self)
    }

    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: self.m[0] * p.x + self.m[2] * p.y + self.m[4],
            y: self.m[1] * p.x + self.m[3] * p.y + self.m[5],
        }
    }

    /// Compute the inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-10 {
            return None;
        }

        let inv_det = 1.0 / det;
        Some(Self {
            m: [
                self.m[3] * inv_det,
                -self.m[1] * inv_det,
                -self.m[2] * inv_det,
                self.m[0] * inv_det,
                (self.m[2] * self.m[5] - self.m[3] * self.m[4]) * inv_det,
                (self.m[1] * self.m[4] - self.m[0] * self.m[5]) * inv_det,
            ],
        })
    }

    #[inline]
    pub fn translation(&self) -> (f32, f32) {
        (self.m[4], self.m[5])
    }

    #[inline]
    fn determinant(&self) -> f32 {
        self.m[0] * self.m[3] - self.m[1] * self.m[2]
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Element-wise epsilon comparison.
    pub fn is_almost_equal(&self, other: &Self) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| is_almost_equal(*a, *b))
    }

    /// Axis-aligned bounding box of the transformed rectangle's corners.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = rect.corner_points().map(|p| self.transform_point(p));
        Rect::from_points(&corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity() {
        let p = Point::new(5.0, 10.0);
        assert_eq!(Transform2D::IDENTITY.transform_point(p), p);
        assert!(Transform2D::default().is_identity());
    }

    #[test]
    fn test_translation_and_scale() {
        let t = Transform2D::translate(10.0, 20.0);
        assert_eq!(t.transform_point(Point::new(5.0, 5.0)), Point::new(15.0, 25.0));
        let s = Transform2D::scale_xy(2.0, 3.0);
        assert_eq!(s.transform_point(Point::new(5.0, 10.0)), Point::new(10.0, 30.0));
    }

    #[test]
    fn test_rotation() {
        let p = Transform2D::rotate(PI / 2.0).transform_point(Point::new(1.0, 0.0));
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.y, 1.0));
    }

    #[test]
    fn test_then_versus_followed_by() {
        let t = Transform2D::translate(10.0, 0.0);
        let s = Transform2D::scale(2.0);
        let p = Point::new(5.0, 0.0);
        assert_eq!(s.then(&t).transform_point(p), Point::new(30.0, 0.0));
        assert_eq!(t.followed_by(&s).transform_point(p), Point::new(30.0, 0.0));
        assert_eq!(s.followed_by(&t).transform_point(p), Point::new(20.0, 0.0));
    }

    #[test]
    fn test_inverse() {
        let t = Transform2D::translate(10.0, 20.0)
            .followed_by(&Transform2D::scale(2.0))
            .followed_by(&Transform2D::rotate(PI / 4.0));
        let inv = t.inverse().unwrap();
        let p = Point::new(100.0, 50.0);
        let back = inv.transform_point(t.transform_point(p));
        assert!(approx_eq(back.x, p.x));
        assert!(approx_eq(back.y, p.y));
        assert!(t.followed_by(&inv).is_almost_equal(&Transform2D::IDENTITY));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Transform2D::scale_xy(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_transform_rect() {
        let t = Transform2D::translate(10.0, 10.0);
        let r = Rect::from_xywh(0.0, 0.0, 100.0, 50.0);
        assert_eq!(t.transform_rect(&r), Rect::from_xywh(10.0, 10.0, 100.0, 50.0));

        let rotated = Transform2D::rotate(PI / 2.0).transform_rect(&r);
        assert!(approx_eq(rotated.width(), 50.0));
        assert!(approx_eq(rotated.height(), 100.0));
    }
}
