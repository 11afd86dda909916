//! View storage: the arena key, the per-view record and its optional
//! attribute blocks.
//!
//! Every [`ViewNode`] carries the handful of fields all views need. The
//! layout, transform, draw, scroll and animation concerns live in boxed
//! blocks that are only allocated by the first setter touching them, so a
//! plain view stays small.

use std::cell::Cell;
use std::sync::Arc;

use cursor_icon::CursorIcon;
use horizon_trellis_render::{
    Alignment, Color, Drawable, LayerDamage, LayerSurface, Path, Pen, PenStyle, Rect, ScaleMode, Size,
    Transform2D,
};
use slotmap::new_key_type;

use super::animation::AnimationAttributes;
use super::events::UiAction;
use super::hooks::{ClickCallback, ViewHandler, ViewListener};
use super::instance::ViewInstance;

new_key_type! {
    /// Generational handle to a view in a [`ViewTree`](super::ViewTree).
    ///
    /// Ids stay valid until the view is destroyed; after that every lookup
    /// with the stale id misses, which is what makes them safe to keep as
    /// weak references (layout anchors, tab stops, capture state).
    pub struct ViewId;
}

/// Whether a view is drawn and whether it takes part in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Not drawn, but keeps its space in the parent's layout.
    Hidden,
    /// Not drawn and removed from layout.
    Gone,
}

/// How one axis of a view is sized by its parent's layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeMode {
    /// The frame's current extent is kept.
    #[default]
    Fixed,
    /// Stretch between the resolved edges, capped at `parent * |weight|`.
    Filling,
    /// Measure the content.
    Wrapping,
    /// Exactly `parent * |weight|`.
    Weight,
}

/// How one edge of a view is positioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionMode {
    /// The frame's current edge is kept.
    #[default]
    Fixed,
    /// The matching edge of the parent's content rectangle, plus margin.
    ParentEdge,
    /// The start edge (left/top) of a referenced sibling.
    OtherStart,
    /// The end edge (right/bottom) of a referenced sibling.
    OtherEnd,
    CenterInParent,
    CenterInOther,
}

/// Clip and hit-test shape of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundShape {
    #[default]
    Rectangle,
    RoundRect,
    Ellipse,
    /// The path set with `set_bound_shape_path`. Hit testing uses the frame.
    Path,
}

/// When a child gets its own platform instance while its parent is being
/// attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachMode {
    NotAttach,
    AttachAlways,
    /// Attach unless the parent's instance is a native widget.
    #[default]
    NotAttachInNativeWidget,
    /// Attach only inside a native widget.
    AttachInNativeWidget,
}

/// Padding or margins on four sides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Edges {
    pub const ZERO: Self = Self::uniform(0.0);

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Relative layout state of one view.
#[derive(Debug, Clone)]
pub(crate) struct LayoutAttributes {
    pub width_mode: SizeMode,
    pub height_mode: SizeMode,
    pub width_weight: f32,
    pub height_weight: f32,

    pub left_mode: PositionMode,
    pub top_mode: PositionMode,
    pub right_mode: PositionMode,
    pub bottom_mode: PositionMode,
    pub left_refer: Option<ViewId>,
    pub top_refer: Option<ViewId>,
    pub right_refer: Option<ViewId>,
    pub bottom_refer: Option<ViewId>,

    pub margin: Edges,
    /// Parent-relative margin weights; `Some` overrides the absolute margin
    /// on that side every prepare pass.
    pub relative_margin_left: Option<f32>,
    pub relative_margin_top: Option<f32>,
    pub relative_margin_right: Option<f32>,
    pub relative_margin_bottom: Option<f32>,

    /// The frame resolved by the last prepare pass.
    pub frame: Rect,
    pub measured_width: f32,
    pub measured_height: f32,
    pub measured_relative_bound_width: f32,
    pub measured_relative_bound_height: f32,

    pub invalid_measure: bool,
    pub invalid_layout: bool,
    pub invalid_relative_bound_width: bool,
    pub invalid_relative_bound_height: bool,
    pub bad_relative_bound_width: bool,
    pub bad_relative_bound_height: bool,
    pub measuring_relative_bound_width: bool,
    pub measuring_relative_bound_height: bool,
    pub recursive_make_layout: bool,
    pub updated_layout_frame: bool,

    pub make_layout: bool,
    pub on_prepare_layout_enabled: bool,
    pub on_make_layout_enabled: bool,
}

impl LayoutAttributes {
    pub fn new(frame: Rect) -> Self {
        Self {
            width_mode: SizeMode::Fixed,
            height_mode: SizeMode::Fixed,
            width_weight: 1.0,
            height_weight: 1.0,
            left_mode: PositionMode::Fixed,
            top_mode: PositionMode::Fixed,
            right_mode: PositionMode::Fixed,
            bottom_mode: PositionMode::Fixed,
            left_refer: None,
            top_refer: None,
            right_refer: None,
            bottom_refer: None,
            margin: Edges::ZERO,
            relative_margin_left: None,
            relative_margin_top: None,
            relative_margin_right: None,
            relative_margin_bottom: None,
            frame,
            measured_width: 0.0,
            measured_height: 0.0,
            measured_relative_bound_width: 0.0,
            measured_relative_bound_height: 0.0,
            invalid_measure: true,
            invalid_layout: true,
            invalid_relative_bound_width: true,
            invalid_relative_bound_height: true,
            bad_relative_bound_width: false,
            bad_relative_bound_height: false,
            measuring_relative_bound_width: false,
            measuring_relative_bound_height: false,
            recursive_make_layout: false,
            updated_layout_frame: false,
            make_layout: false,
            on_prepare_layout_enabled: false,
            on_make_layout_enabled: false,
        }
    }
}

// =============================================================================
// Transform
// =============================================================================

/// One set of transform components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransformComponents {
    pub translation_x: f32,
    pub translation_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Radians.
    pub rotation: f32,
}

impl Default for TransformComponents {
    fn default() -> Self {
        Self {
            translation_x: 0.0,
            translation_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

/// Transform state of one view.
///
/// The composed matrices are caches behind `Cell`s so read-only queries
/// (hit testing, coordinate conversion) can refresh them lazily.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransformAttributes {
    /// `Some` when an explicit matrix overrides the static components.
    pub static_transform: Option<Transform2D>,
    pub static_components: TransformComponents,
    pub animation_transform: Option<Transform2D>,
    pub animation_components: TransformComponents,
    /// Offset of the scale/rotate pivot from the view's center.
    pub anchor_offset_x: f32,
    pub anchor_offset_y: f32,

    pub calc_transform: Cell<Option<Transform2D>>,
    pub invalid_calc: Cell<bool>,
    pub final_transform: Cell<Option<Transform2D>>,
    pub invalid_final: Cell<bool>,
    pub inverse_transform: Cell<Option<Transform2D>>,
    pub invalid_inverse: Cell<bool>,
}

// =============================================================================
// Draw
// =============================================================================

pub(crate) struct DrawAttributes {
    pub background_color: Color,
    pub background: Option<Arc<dyn Drawable>>,
    pub background_pressed: Option<Arc<dyn Drawable>>,
    pub background_hover: Option<Arc<dyn Drawable>>,
    pub background_scale_mode: ScaleMode,
    pub background_alignment: Alignment,

    pub border: Option<Pen>,
    pub border_style: PenStyle,
    pub border_width: f32,
    pub border_color: Color,

    pub bound_shape: BoundShape,
    pub round_rect_radius: Size,
    pub bound_shape_path: Path,

    pub always_on_draw_background: bool,
    pub always_on_draw_border: bool,
    pub pre_draw_enabled: bool,
    pub post_draw_enabled: bool,

    pub opaque: bool,
    pub alpha: f32,
    pub animation_alpha: f32,

    pub layer: bool,
    pub layer_surface: Option<Box<dyn LayerSurface>>,
    pub layer_damage: LayerDamage,
}

impl DrawAttributes {
    pub fn new(round_rect_radius: Size) -> Self {
        Self {
            background_color: Color::TRANSPARENT,
            background: None,
            background_pressed: None,
            background_hover: None,
            background_scale_mode: ScaleMode::Stretch,
            background_alignment: Alignment::MiddleCenter,
            border: None,
            border_style: PenStyle::Solid,
            border_width: 0.0,
            border_color: Color::BLACK,
            bound_shape: BoundShape::Rectangle,
            round_rect_radius,
            bound_shape_path: Path::new(),
            always_on_draw_background: false,
            always_on_draw_border: false,
            pre_draw_enabled: false,
            post_draw_enabled: false,
            opaque: false,
            alpha: 1.0,
            animation_alpha: 1.0,
            layer: false,
            layer_surface: None,
            layer_damage: LayerDamage::whole(),
        }
    }
}

impl std::fmt::Debug for DrawAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawAttributes")
            .field("background_color", &self.background_color)
            .field("border", &self.border)
            .field("bound_shape", &self.bound_shape)
            .field("opaque", &self.opaque)
            .field("alpha", &self.alpha)
            .field("layer", &self.layer)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Scroll
// =============================================================================

#[derive(Debug, Clone)]
pub(crate) struct ScrollAttributes {
    pub x: f32,
    pub y: f32,
    pub content_width: f32,
    pub content_height: f32,

    pub horizontal_bar: Option<ViewId>,
    pub vertical_bar: Option<ViewId>,
    pub bar_width: f32,
    pub valid_horizontal: bool,
    pub valid_vertical: bool,

    pub by_mouse: bool,
    pub by_touch: bool,
    pub by_mouse_wheel: bool,
    pub by_keyboard: bool,

    pub down_content: bool,
    pub scroll_x_down: f32,
    pub scroll_y_down: f32,
    pub pointer_x_down: f32,
    pub pointer_y_down: f32,
}

impl ScrollAttributes {
    pub fn new(bar_width: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            content_width: 0.0,
            content_height: 0.0,
            horizontal_bar: None,
            vertical_bar: None,
            bar_width,
            valid_horizontal: false,
            valid_vertical: false,
            by_mouse: true,
            by_touch: true,
            by_mouse_wheel: true,
            by_keyboard: true,
            down_content: false,
            scroll_x_down: 0.0,
            scroll_y_down: 0.0,
            pointer_x_down: 0.0,
            pointer_y_down: 0.0,
        }
    }
}

/// Range state of a view acting as a scroll bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScrollBarAttributes {
    pub owner: ViewId,
    pub vertical: bool,
    pub value: f32,
    pub page: f32,
    pub min: f32,
    pub max: f32,
}

impl ScrollBarAttributes {
    /// A bar only makes sense when the range exceeds one page.
    pub fn is_valid(&self) -> bool {
        self.max - self.min > self.page
    }
}

// =============================================================================
// Node
// =============================================================================

/// Everything the tree stores for one view.
pub(crate) struct ViewNode {
    pub name: Option<String>,
    pub parent: Option<ViewId>,
    pub children: Vec<ViewId>,

    pub frame: Rect,
    /// Footprint in the parent as last invalidated, transform included.
    pub bounds_in_parent: Rect,
    pub padding: Edges,

    pub visibility: Visibility,
    pub enabled: bool,
    pub hit_testable: bool,
    pub focusable: bool,
    pub focused: bool,
    pub pressed: bool,
    pub hover: bool,
    pub occurring_click: bool,
    pub pass_events_to_children: bool,
    pub processing_tab_stop: bool,
    pub multi_touch_mode: bool,
    pub on_add_child_enabled: bool,
    pub on_remove_child_enabled: bool,
    pub cursor: Option<CursorIcon>,

    pub creating_instance: bool,
    pub creating_child_instances: bool,
    pub creating_native_widget: bool,
    pub attach_mode: AttachMode,
    pub instance: Option<Arc<dyn ViewInstance>>,

    pub handler: Option<Box<dyn ViewHandler>>,
    pub listener: Option<Arc<dyn ViewListener>>,
    pub on_click: Option<ClickCallback>,

    pub next_tab_stop: Option<ViewId>,
    pub previous_tab_stop: Option<ViewId>,
    pub focused_child: Option<ViewId>,

    pub child_mouse_down: Option<ViewId>,
    pub action_mouse_down: UiAction,
    pub child_mouse_move: Option<ViewId>,
    pub children_multi_touch: Vec<ViewId>,

    pub current_drawing: bool,
    pub rect_current_drawing: Rect,

    pub layout: Option<Box<LayoutAttributes>>,
    pub transform: Option<Box<TransformAttributes>>,
    pub draw: Option<Box<DrawAttributes>>,
    pub scroll: Option<Box<ScrollAttributes>>,
    pub scroll_bar: Option<Box<ScrollBarAttributes>>,
    pub animation: Option<Box<AnimationAttributes>>,
}

impl ViewNode {
    pub fn new(handler: Option<Box<dyn ViewHandler>>) -> Self {
        Self {
            name: None,
            parent: None,
            children: Vec::new(),
            frame: Rect::ZERO,
            bounds_in_parent: Rect::ZERO,
            padding: Edges::ZERO,
            visibility: Visibility::Visible,
            enabled: true,
            hit_testable: true,
            focusable: false,
            focused: false,
            pressed: false,
            hover: false,
            occurring_click: false,
            pass_events_to_children: true,
            processing_tab_stop: true,
            multi_touch_mode: false,
            on_add_child_enabled: false,
            on_remove_child_enabled: false,
            cursor: None,
            creating_instance: true,
            creating_child_instances: false,
            creating_native_widget: false,
            attach_mode: AttachMode::NotAttachInNativeWidget,
            instance: None,
            handler,
            listener: None,
            on_click: None,
            next_tab_stop: None,
            previous_tab_stop: None,
            focused_child: None,
            child_mouse_down: None,
            action_mouse_down: UiAction::Unknown,
            child_mouse_move: None,
            children_multi_touch: Vec::new(),
            current_drawing: false,
            rect_current_drawing: Rect::ZERO,
            layout: None,
            transform: None,
            draw: None,
            scroll: None,
            scroll_bar: None,
            animation: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn width(&self) -> f32 {
        self.frame.width()
    }

    pub fn height(&self) -> f32 {
        self.frame.height()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.frame.width(), self.frame.height())
    }

    /// Instances that are native widgets render themselves.
    pub fn is_native_widget(&self) -> bool {
        self.instance.as_ref().is_some_and(|i| i.is_native_widget())
    }

    pub fn bound_shape(&self) -> BoundShape {
        self.draw.as_ref().map_or(BoundShape::Rectangle, |d| d.bound_shape)
    }
}

impl std::fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("frame", &self.frame)
            .field("visibility", &self.visibility)
            .field("has_instance", &self.instance.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_defaults() {
        let node = ViewNode::new(None);
        assert!(node.is_visible());
        assert!(node.enabled && node.hit_testable);
        assert!(!node.focusable);
        assert!(node.creating_instance);
        assert!(!node.creating_child_instances);
        assert_eq!(node.attach_mode, AttachMode::NotAttachInNativeWidget);
        assert!(node.pass_events_to_children);
        assert!(node.processing_tab_stop);
        assert!(node.layout.is_none() && node.draw.is_none());
    }

    #[test]
    fn test_layout_defaults() {
        let attrs = LayoutAttributes::new(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(attrs.width_mode, SizeMode::Fixed);
        assert_eq!(attrs.width_weight, 1.0);
        assert!(attrs.invalid_measure && attrs.invalid_layout);
        assert!(!attrs.make_layout);
        assert_eq!(attrs.frame, Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_scroll_bar_validity() {
        let mut bar = ScrollBarAttributes {
            owner: ViewId::default(),
            vertical: false,
            value: 0.0,
            page: 100.0,
            min: 0.0,
            max: 100.0,
        };
        assert!(!bar.is_valid());
        bar.max = 150.0;
        assert!(bar.is_valid());
    }

    #[test]
    fn test_edges() {
        let e = Edges::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(e.horizontal(), 4.0);
        assert_eq!(e.vertical(), 6.0);
        assert_eq!(Edges::uniform(2.0).horizontal(), 4.0);
    }
}
