//! Damage tracking for cached view layers.
//!
//! A view drawn through a layer only repaints the part of its cached surface
//! that changed. [`LayerDamage`] accumulates those parts: either a single
//! bounding rectangle or a "whole layer" marker that overrides any
//! rectangle.

use crate::types::Rect;

/// Dirty state of one cached layer.
///
/// # Example
///
/// ```
/// use horizon_trellis_render::{LayerDamage, Rect};
///
/// let mut damage = LayerDamage::default();
/// damage.add_damage(Rect::new(0.0, 0.0, 10.0, 10.0));
/// damage.add_damage(Rect::new(20.0, 20.0, 30.0, 30.0));
/// assert_eq!(damage.take(100, 100), Some(Rect::new(0.0, 0.0, 30.0, 30.0)));
/// assert_eq!(damage.take(100, 100), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerDamage {
    dirty: bool,
    whole: bool,
    rect: Rect,
}

impl LayerDamage {
    /// Damage covering the whole surface, as for a freshly allocated layer.
    pub fn whole() -> Self {
        Self {
            dirty: true,
            whole: true,
            rect: Rect::ZERO,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_whole(&self) -> bool {
        self.dirty && self.whole
    }

    /// The accumulated partial rectangle. Meaningless when [`is_whole`](Self::is_whole).
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Mark the entire surface dirty.
    pub fn add_whole(&mut self) {
        self.dirty = true;
        self.whole = true;
    }

    /// Merge `rect` into the damage.
    ///
    /// Already-whole damage stays whole.
    pub fn add_damage(&mut self, rect: Rect) {
        if self.dirty {
            if !self.whole {
                self.rect = self.rect.union(&rect);
            }
        } else {
            self.rect = rect;
            self.whole = false;
            self.dirty = true;
        }
    }

    /// Clear the damage, returning the region to repaint on a
    /// `width` x `height` surface.
    pub fn take(&mut self, width: u32, height: u32) -> Option<Rect> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        if self.whole {
            self.whole = false;
            Some(Rect::new(0.0, 0.0, width as f32, height as f32))
        } else {
            Some(self.rect)
        }
    }

    /// Drop all damage without repainting.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clean() {
        let mut damage = LayerDamage::default();
        assert!(!damage.is_dirty());
        assert_eq!(damage.take(10, 10), None);
    }

    #[test]
    fn test_whole_absorbs_rects() {
        let mut damage = LayerDamage::whole();
        damage.add_damage(Rect::new(1.0, 1.0, 2.0, 2.0));
        assert!(damage.is_whole());
        assert_eq!(damage.take(64, 32), Some(Rect::new(0.0, 0.0, 64.0, 32.0)));
        assert!(!damage.is_whole());
    }

    #[test]
    fn test_partial_replaces_stale_rect_after_take() {
        let mut damage = LayerDamage::default();
        damage.add_damage(Rect::new(0.0, 0.0, 50.0, 50.0));
        damage.take(100, 100);
        damage.add_damage(Rect::new(60.0, 60.0, 70.0, 70.0));
        assert_eq!(damage.take(100, 100), Some(Rect::new(60.0, 60.0, 70.0, 70.0)));
    }

    #[test]
    fn test_whole_after_partial() {
        let mut damage = LayerDamage::default();
        damage.add_damage(Rect::new(0.0, 0.0, 5.0, 5.0));
        damage.add_whole();
        assert_eq!(damage.take(8, 8), Some(Rect::new(0.0, 0.0, 8.0, 8.0)));
    }
}
