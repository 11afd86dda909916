//! Animation targets.
//!
//! The tree does no interpolation. An external [`AnimationDriver`] computes
//! values over time and pushes them into views through [`AnimationTarget`]s,
//! which write the animation layer of the property (`*_from_animation`
//! setters) so static values set by the application are preserved.
//!
//! A view remembers which driver animates each of its properties, so
//! replacing, resetting or destroying the view unregisters it cleanly.

use std::sync::Arc;

use horizon_trellis_core::logging::targets;
use horizon_trellis_render::{Color, Transform2D};
use parking_lot::Mutex;
use tracing::{trace, warn};

use super::node::ViewId;
use super::tree::ViewTree;

/// A view property that can be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationProperty {
    Transform,
    Translation,
    Scale,
    Rotation,
    Alpha,
    BackgroundColor,
}

/// An interpolated value for one [`AnimationProperty`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationValue {
    Transform(Transform2D),
    Translation(f32, f32),
    Scale(f32, f32),
    /// Radians.
    Rotation(f32),
    Alpha(f32),
    BackgroundColor(Color),
}

impl AnimationValue {
    pub fn property(&self) -> AnimationProperty {
        match self {
            AnimationValue::Transform(_) => AnimationProperty::Transform,
            AnimationValue::Translation(..) => AnimationProperty::Translation,
            AnimationValue::Scale(..) => AnimationProperty::Scale,
            AnimationValue::Rotation(_) => AnimationProperty::Rotation,
            AnimationValue::Alpha(_) => AnimationProperty::Alpha,
            AnimationValue::BackgroundColor(_) => AnimationProperty::BackgroundColor,
        }
    }
}

/// One animated property of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationTarget {
    view: ViewId,
    property: AnimationProperty,
}

impl AnimationTarget {
    pub fn new(view: ViewId, property: AnimationProperty) -> Self {
        Self { view, property }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn property(&self) -> AnimationProperty {
        self.property
    }

    /// Apply `value` at `fraction` (0 to 1) of the animation. Values for a
    /// different property are ignored.
    pub fn update(&self, tree: &mut ViewTree, fraction: f32, value: AnimationValue) {
        if value.property() != self.property {
            warn!(target: targets::CORE, animation = ?self, ?value, "animation value does not match target property");
            return;
        }
        trace!(target: targets::CORE, view = ?self.view, property = ?self.property, fraction, "animation update");
        tree.apply_animation_value(self.view, value, true);
    }
}

/// Something that drives animation targets.
pub trait AnimationDriver: Send + Sync {
    fn add_target(&self, target: AnimationTarget);

    fn remove_target(&self, target: &AnimationTarget);
}

/// A driver that keeps its targets in a list and fans values out to them.
///
/// Animation engines can wrap one of these and call
/// [`update`](Self::update) on every tick.
#[derive(Debug, Default)]
pub struct AnimationTargetList {
    targets: Mutex<Vec<AnimationTarget>>,
}

impl AnimationTargetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> Vec<AnimationTarget> {
        self.targets.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.lock().is_empty()
    }

    /// Push `value` to every target whose property it fits.
    pub fn update(&self, tree: &mut ViewTree, fraction: f32, value: AnimationValue) {
        // Snapshot: targets may unregister while being updated.
        for target in self.targets() {
            if target.property() == value.property() {
                target.update(tree, fraction, value);
            }
        }
    }
}

impl AnimationDriver for AnimationTargetList {
    fn add_target(&self, target: AnimationTarget) {
        let mut targets = self.targets.lock();
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    fn remove_target(&self, target: &AnimationTarget) {
        self.targets.lock().retain(|t| t != target);
    }
}

/// Drivers currently animating a view, by property.
#[derive(Default)]
pub(crate) struct AnimationAttributes {
    bindings: Vec<(AnimationProperty, Arc<dyn AnimationDriver>)>,
}

impl std::fmt::Debug for AnimationAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|(property, _)| property))
            .finish()
    }
}

impl AnimationAttributes {
    fn get(&self, property: AnimationProperty) -> Option<&Arc<dyn AnimationDriver>> {
        self.bindings.iter().find(|(p, _)| *p == property).map(|(_, driver)| driver)
    }

    fn take(&mut self, property: AnimationProperty) -> Option<Arc<dyn AnimationDriver>> {
        let index = self.bindings.iter().position(|(p, _)| *p == property)?;
        Some(self.bindings.remove(index).1)
    }
}

impl ViewTree {
    fn apply_animation_value(&mut self, id: ViewId, value: AnimationValue, redraw: bool) {
        match value {
            AnimationValue::Transform(matrix) => self.set_transform_from_animation(id, matrix, redraw),
            AnimationValue::Translation(tx, ty) => self.set_translation_from_animation(id, tx, ty, redraw),
            AnimationValue::Scale(sx, sy) => self.set_scale_from_animation(id, sx, sy, redraw),
            AnimationValue::Rotation(radians) => self.set_rotation_from_animation(id, radians, redraw),
            AnimationValue::Alpha(alpha) => self.set_alpha_from_animation(id, alpha, redraw),
            AnimationValue::BackgroundColor(color) => self.set_background_color(id, color, redraw),
        }
    }

    fn reset_animation_value(&mut self, id: ViewId, property: AnimationProperty, redraw: bool) {
        match property {
            AnimationProperty::Transform => self.reset_transform_from_animation(id, redraw),
            AnimationProperty::Translation => self.reset_translation_from_animation(id, redraw),
            AnimationProperty::Scale => self.reset_scale_from_animation(id, redraw),
            AnimationProperty::Rotation => self.reset_rotation_from_animation(id, redraw),
            AnimationProperty::Alpha => self.reset_alpha_from_animation(id, redraw),
            // The last applied color stays; there is no separate animation layer.
            AnimationProperty::BackgroundColor => {}
        }
    }

    /// The driver animating `property` of `id`.
    pub fn animation(&self, id: ViewId, property: AnimationProperty) -> Option<Arc<dyn AnimationDriver>> {
        self.nodes
            .get(id)
            .and_then(|node| node.animation.as_deref())
            .and_then(|attrs| attrs.get(property))
            .cloned()
    }

    /// Let `driver` animate a property of `id`, starting from `start`.
    ///
    /// A driver already animating the same property is unregistered first.
    pub fn set_animation(&mut self, id: ViewId, driver: Arc<dyn AnimationDriver>, start: AnimationValue, redraw: bool) {
        if !self.nodes.contains_key(id) {
            return;
        }
        let property = start.property();
        self.reset_animation(id, property, false);
        self.apply_animation_value(id, start, redraw);
        driver.add_target(AnimationTarget::new(id, property));
        if let Some(node) = self.nodes.get_mut(id) {
            node.animation
                .get_or_insert_with(Default::default)
                .bindings
                .push((property, driver));
        }
        trace!(target: targets::CORE, ?id, ?property, "animation registered");
    }

    pub fn set_transform_animation(&mut self, id: ViewId, driver: Arc<dyn AnimationDriver>, start: Transform2D, redraw: bool) {
        self.set_animation(id, driver, AnimationValue::Transform(start), redraw);
    }

    pub fn set_translation_animation(
        &mut self,
        id: ViewId,
        driver: Arc<dyn AnimationDriver>,
        start: (f32, f32),
        redraw: bool,
    ) {
        self.set_animation(id, driver, AnimationValue::Translation(start.0, start.1), redraw);
    }

    pub fn set_scale_animation(&mut self, id: ViewId, driver: Arc<dyn AnimationDriver>, start: (f32, f32), redraw: bool) {
        self.set_animation(id, driver, AnimationValue::Scale(start.0, start.1), redraw);
    }

    pub fn set_rotation_animation(&mut self, id: ViewId, driver: Arc<dyn AnimationDriver>, start: f32, redraw: bool) {
        self.set_animation(id, driver, AnimationValue::Rotation(start), redraw);
    }

    pub fn set_alpha_animation(&mut self, id: ViewId, driver: Arc<dyn AnimationDriver>, start: f32, redraw: bool) {
        self.set_animation(id, driver, AnimationValue::Alpha(start), redraw);
    }

    pub fn set_background_color_animation(
        &mut self,
        id: ViewId,
        driver: Arc<dyn AnimationDriver>,
        start: Color,
        redraw: bool,
    ) {
        self.set_animation(id, driver, AnimationValue::BackgroundColor(start), redraw);
    }

    /// Unregister the driver of `property` and drop its animation layer.
    pub fn reset_animation(&mut self, id: ViewId, property: AnimationProperty, redraw: bool) {
        let driver = self
            .nodes
            .get_mut(id)
            .and_then(|node| node.animation.as_deref_mut())
            .and_then(|attrs| attrs.take(property));
        if let Some(driver) = driver {
            driver.remove_target(&AnimationTarget::new(id, property));
            self.reset_animation_value(id, property, redraw);
        }
    }

    pub fn reset_transform_animation(&mut self, id: ViewId, redraw: bool) {
        self.reset_animation(id, AnimationProperty::Transform, redraw);
    }

    pub fn reset_translation_animation(&mut self, id: ViewId, redraw: bool) {
        self.reset_animation(id, AnimationProperty::Translation, redraw);
    }

    pub fn reset_scale_animation(&mut self, id: ViewId, redraw: bool) {
        self.reset_animation(id, AnimationProperty::Scale, redraw);
    }

    pub fn reset_rotation_animation(&mut self, id: ViewId, redraw: bool) {
        self.reset_animation(id, AnimationProperty::Rotation, redraw);
    }

    pub fn reset_alpha_animation(&mut self, id: ViewId, redraw: bool) {
        self.reset_animation(id, AnimationProperty::Alpha, redraw);
    }

    pub fn reset_background_color_animation(&mut self, id: ViewId, redraw: bool) {
        self.reset_animation(id, AnimationProperty::BackgroundColor, redraw);
    }

    /// Unregister every driver of `id` without touching its state.
    pub(crate) fn detach_animations(&mut self, id: ViewId) {
        let Some(attrs) = self.nodes.get_mut(id).and_then(|node| node.animation.take()) else {
            return;
        };
        for (property, driver) in attrs.bindings {
            driver.remove_target(&AnimationTarget::new(id, property));
        }
    }

    /// Unregister every driver and restore identity animation components and
    /// full animation alpha.
    pub fn reset_animations(&mut self, id: ViewId, redraw: bool) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.detach_animations(id);
        for property in [
            AnimationProperty::Transform,
            AnimationProperty::Translation,
            AnimationProperty::Scale,
            AnimationProperty::Rotation,
            AnimationProperty::Alpha,
        ] {
            self.reset_animation_value(id, property, false);
        }
        if redraw {
            self.invalidate_bounds_in_parent(id);
        }
    }
}
