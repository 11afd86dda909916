//! Relative layout.
//!
//! A view takes part in layout once it has layout attributes (any setter in
//! this module allocates them). A view whose `making_layout` flag is set
//! lays out its children in three steps:
//!
//! 1. **Measure**: wrapping axes ask [`ViewHandler::on_measure_layout`]
//!    for an intrinsic size. The default measures the union of the
//!    children's relative bounds.
//! 2. **Prepare**: every child resolves its four edges against the parent's
//!    content rectangle or a referenced sibling. This runs once with the
//!    children's current frames, then the parent's `on_make_layout` hook
//!    may position children by hand, then it runs again (for children the
//!    hook did not place) with the frames resolved so far.
//! 3. **Apply**: resolved frames are applied and children that lay out
//!    their own children recurse.
//!
//! Layout runs on the UI thread. Requests made while mutating the tree mark
//! the affected views dirty and post a pass for the nearest view backed by a
//! platform instance; trees without instances call [`ViewTree::make_layout`]
//! directly.
//!
//! [`ViewHandler::on_measure_layout`]: super::ViewHandler::on_measure_layout

use horizon_trellis_core::PerfSpan;
use horizon_trellis_core::logging::{span_names, targets};
use horizon_trellis_render::{Rect, is_almost_equal};
use tracing::trace;

use super::node::{Edges, LayoutAttributes, PositionMode, SizeMode, ViewId, Visibility};
use super::tree::ViewTree;

/// What a child's prepare pass resolves against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepareLayoutParam {
    /// The parent's bounds inset by its padding.
    pub parent_content_frame: Rect,
    /// Start from the child's in-progress layout frame instead of its
    /// applied frame.
    pub use_layout_frame: bool,
}

/// Mode normalization shared by prepare and the relative-bound walk.
///
/// Filling spans both edges unless it is centered, in which case it behaves
/// like Weight. A non-filling axis positioned by its start edge ignores the
/// end edge.
pub(crate) fn normalize_axis(
    size_mode: SizeMode,
    start: PositionMode,
    end: PositionMode,
) -> (SizeMode, PositionMode, PositionMode) {
    let centered = matches!(start, PositionMode::CenterInParent | PositionMode::CenterInOther);
    if size_mode == SizeMode::Filling {
        if centered {
            (SizeMode::Weight, start, PositionMode::Fixed)
        } else {
            let start = if start == PositionMode::Fixed { PositionMode::ParentEdge } else { start };
            let end = if end == PositionMode::Fixed { PositionMode::ParentEdge } else { end };
            (size_mode, start, end)
        }
    } else if start != PositionMode::Fixed {
        (size_mode, start, PositionMode::Fixed)
    } else {
        (size_mode, start, end)
    }
}

impl ViewTree {
    // =========================================================================
    // Attribute block
    // =========================================================================

    pub(crate) fn layout_attrs(&self, id: ViewId) -> Option<&LayoutAttributes> {
        self.nodes.get(id).and_then(|node| node.layout.as_deref())
    }

    pub(crate) fn layout_attrs_mut(&mut self, id: ViewId) -> Option<&mut LayoutAttributes> {
        self.nodes.get_mut(id).and_then(|node| node.layout.as_deref_mut())
    }

    /// The layout block of `id`, allocated on first use.
    pub(crate) fn init_layout_attrs(&mut self, id: ViewId) -> Option<&mut LayoutAttributes> {
        let node = self.nodes.get_mut(id)?;
        let frame = node.frame;
        Some(
            node.layout
                .get_or_insert_with(|| Box::new(LayoutAttributes::new(frame)))
                .as_mut(),
        )
    }

    /// An edge reference resolves only while it names a live sibling of `id`.
    pub(crate) fn sibling_refer(&self, id: ViewId, refer: Option<ViewId>) -> Option<ViewId> {
        let parent = self.parent(id)?;
        refer.filter(|&r| r != id && self.contains(r) && self.parent(r) == Some(parent))
    }

    /// Whether the view has layout attributes.
    pub fn is_layouting(&self, id: ViewId) -> bool {
        self.layout_attrs(id).is_some()
    }

    /// Drop the layout attributes; the view keeps its current frame.
    pub fn reset_layout(&mut self, id: ViewId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.layout = None;
        }
        self.request_parent_layout(id, true);
    }

    pub fn is_making_layout(&self, id: ViewId) -> bool {
        self.layout_attrs(id).is_some_and(|attrs| attrs.make_layout)
    }

    /// Whether the view lays out its children.
    pub fn set_making_layout(&mut self, id: ViewId, make_layout: bool) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.make_layout = make_layout;
            self.request_layout(id, true);
        }
    }

    /// The frame resolved by the last prepare pass, or the frame itself for
    /// views outside layout.
    pub fn layout_frame(&self, id: ViewId) -> Rect {
        match self.nodes.get(id) {
            Some(node) => node.layout.as_ref().map_or(node.frame, |attrs| attrs.frame),
            None => Rect::ZERO,
        }
    }

    /// Place a child from an `on_make_layout` hook. The second prepare pass
    /// leaves a child placed this way alone.
    pub fn set_layout_frame(&mut self, id: ViewId, rect: Rect) {
        match self.layout_attrs_mut(id) {
            Some(attrs) => {
                attrs.frame = rect;
                attrs.updated_layout_frame = true;
            }
            None => self.set_frame_internal(id, rect, false, true),
        }
    }

    pub fn is_layout_frame_updated(&self, id: ViewId) -> bool {
        self.layout_attrs(id).is_some_and(|attrs| attrs.updated_layout_frame)
    }

    fn set_layout_frame_updated(&mut self, id: ViewId, updated: bool) {
        if let Some(attrs) = self.layout_attrs_mut(id) {
            attrs.updated_layout_frame = updated;
        }
    }

    pub fn is_on_prepare_layout_enabled(&self, id: ViewId) -> bool {
        self.layout_attrs(id).is_some_and(|attrs| attrs.on_prepare_layout_enabled)
    }

    pub fn set_on_prepare_layout_enabled(&mut self, id: ViewId, enabled: bool) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.on_prepare_layout_enabled = enabled;
            self.request_parent_layout(id, true);
        }
    }

    pub fn is_on_make_layout_enabled(&self, id: ViewId) -> bool {
        self.layout_attrs(id).is_some_and(|attrs| attrs.on_make_layout_enabled)
    }

    pub fn set_on_make_layout_enabled(&mut self, id: ViewId, enabled: bool) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.on_make_layout_enabled = enabled;
            self.request_layout(id, true);
        }
    }

    // =========================================================================
    // Size modes
    // =========================================================================

    pub fn width_mode(&self, id: ViewId) -> SizeMode {
        self.layout_attrs(id).map_or(SizeMode::Fixed, |attrs| attrs.width_mode)
    }

    pub fn height_mode(&self, id: ViewId) -> SizeMode {
        self.layout_attrs(id).map_or(SizeMode::Fixed, |attrs| attrs.height_mode)
    }

    pub fn width_weight(&self, id: ViewId) -> f32 {
        self.layout_attrs(id).map_or(1.0, |attrs| attrs.width_weight)
    }

    pub fn height_weight(&self, id: ViewId) -> f32 {
        self.layout_attrs(id).map_or(1.0, |attrs| attrs.height_weight)
    }

    fn set_size_modes(&mut self, id: ViewId, width: Option<(SizeMode, Option<f32>)>, height: Option<(SizeMode, Option<f32>)>) {
        let Some(attrs) = self.init_layout_attrs(id) else {
            return;
        };
        if let Some((mode, weight)) = width {
            attrs.width_mode = mode;
            if let Some(weight) = weight {
                attrs.width_weight = weight;
            }
        }
        if let Some((mode, weight)) = height {
            attrs.height_mode = mode;
            if let Some(weight) = weight {
                attrs.height_weight = weight;
            }
        }
        self.request_parent_and_self_layout(id, true);
    }

    pub fn set_width_fixed(&mut self, id: ViewId) {
        self.set_size_modes(id, Some((SizeMode::Fixed, None)), None);
    }

    pub fn set_height_fixed(&mut self, id: ViewId) {
        self.set_size_modes(id, None, Some((SizeMode::Fixed, None)));
    }

    pub fn set_size_fixed(&mut self, id: ViewId) {
        self.set_size_modes(id, Some((SizeMode::Fixed, None)), Some((SizeMode::Fixed, None)));
    }

    /// Stretch between the resolved edges. A weight below 1 caps the width
    /// at `parent * |weight|`, anchored at the left edge for a positive
    /// weight and at the right edge for a negative one.
    pub fn set_width_filling(&mut self, id: ViewId, weight: f32) {
        self.set_size_modes(id, Some((SizeMode::Filling, Some(weight))), None);
    }

    pub fn set_height_filling(&mut self, id: ViewId, weight: f32) {
        self.set_size_modes(id, None, Some((SizeMode::Filling, Some(weight))));
    }

    pub fn set_size_filling(&mut self, id: ViewId, width_weight: f32, height_weight: f32) {
        self.set_size_modes(
            id,
            Some((SizeMode::Filling, Some(width_weight))),
            Some((SizeMode::Filling, Some(height_weight))),
        );
    }

    pub fn set_width_wrapping(&mut self, id: ViewId) {
        self.set_size_modes(id, Some((SizeMode::Wrapping, None)), None);
    }

    pub fn set_height_wrapping(&mut self, id: ViewId) {
        self.set_size_modes(id, None, Some((SizeMode::Wrapping, None)));
    }

    pub fn set_size_wrapping(&mut self, id: ViewId) {
        self.set_size_modes(id, Some((SizeMode::Wrapping, None)), Some((SizeMode::Wrapping, None)));
    }

    pub fn set_width_weight(&mut self, id: ViewId, weight: f32) {
        self.set_size_modes(id, Some((SizeMode::Weight, Some(weight))), None);
    }

    pub fn set_height_weight(&mut self, id: ViewId, weight: f32) {
        self.set_size_modes(id, None, Some((SizeMode::Weight, Some(weight))));
    }

    pub fn set_size_weight(&mut self, id: ViewId, width_weight: f32, height_weight: f32) {
        self.set_size_modes(
            id,
            Some((SizeMode::Weight, Some(width_weight))),
            Some((SizeMode::Weight, Some(height_weight))),
        );
    }

    // =========================================================================
    // Edge positions
    // =========================================================================

    pub fn layout_left_mode(&self, id: ViewId) -> PositionMode {
        self.layout_attrs(id).map_or(PositionMode::Fixed, |attrs| attrs.left_mode)
    }

    pub fn layout_top_mode(&self, id: ViewId) -> PositionMode {
        self.layout_attrs(id).map_or(PositionMode::Fixed, |attrs| attrs.top_mode)
    }

    pub fn layout_right_mode(&self, id: ViewId) -> PositionMode {
        self.layout_attrs(id).map_or(PositionMode::Fixed, |attrs| attrs.right_mode)
    }

    pub fn layout_bottom_mode(&self, id: ViewId) -> PositionMode {
        self.layout_attrs(id).map_or(PositionMode::Fixed, |attrs| attrs.bottom_mode)
    }

    pub fn layout_left_refer(&self, id: ViewId) -> Option<ViewId> {
        self.layout_attrs(id).and_then(|attrs| attrs.left_refer)
    }

    pub fn layout_top_refer(&self, id: ViewId) -> Option<ViewId> {
        self.layout_attrs(id).and_then(|attrs| attrs.top_refer)
    }

    pub fn layout_right_refer(&self, id: ViewId) -> Option<ViewId> {
        self.layout_attrs(id).and_then(|attrs| attrs.right_refer)
    }

    pub fn layout_bottom_refer(&self, id: ViewId) -> Option<ViewId> {
        self.layout_attrs(id).and_then(|attrs| attrs.bottom_refer)
    }

    fn set_edge(&mut self, id: ViewId, edge: Edge, mode: PositionMode, refer: Option<ViewId>) {
        let Some(attrs) = self.init_layout_attrs(id) else {
            return;
        };
        match edge {
            Edge::Left => {
                attrs.left_mode = mode;
                if refer.is_some() {
                    attrs.left_refer = refer;
                }
            }
            Edge::Top => {
                attrs.top_mode = mode;
                if refer.is_some() {
                    attrs.top_refer = refer;
                }
            }
            Edge::Right => {
                attrs.right_mode = mode;
                if refer.is_some() {
                    attrs.right_refer = refer;
                }
            }
            Edge::Bottom => {
                attrs.bottom_mode = mode;
                if refer.is_some() {
                    attrs.bottom_refer = refer;
                }
            }
        }
        self.request_parent_layout(id, true);
    }

    /// Reference setters ignore a view that does not exist.
    fn set_edge_refer(&mut self, id: ViewId, edge: Edge, mode: PositionMode, refer: ViewId) {
        if !self.contains(refer) {
            trace!(target: targets::LAYOUT, ?id, ?refer, "ignoring stale layout reference");
            return;
        }
        self.set_edge(id, edge, mode, Some(refer));
    }

    pub fn set_layout_left_fixed(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Left, PositionMode::Fixed, None);
    }

    pub fn set_layout_top_fixed(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Top, PositionMode::Fixed, None);
    }

    pub fn set_layout_right_fixed(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Right, PositionMode::Fixed, None);
    }

    pub fn set_layout_bottom_fixed(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Bottom, PositionMode::Fixed, None);
    }

    pub fn set_align_parent_left(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Left, PositionMode::ParentEdge, None);
    }

    /// Left edge aligned with `other`'s left edge.
    pub fn set_align_left(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Left, PositionMode::OtherStart, other);
    }

    /// Left edge after `other`'s right edge and margin.
    pub fn set_right_of(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Left, PositionMode::OtherEnd, other);
    }

    pub fn set_align_parent_right(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Right, PositionMode::ParentEdge, None);
    }

    pub fn set_align_right(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Right, PositionMode::OtherEnd, other);
    }

    /// Right edge before `other`'s left edge and margin.
    pub fn set_left_of(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Right, PositionMode::OtherStart, other);
    }

    pub fn set_align_parent_top(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Top, PositionMode::ParentEdge, None);
    }

    pub fn set_align_top(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Top, PositionMode::OtherStart, other);
    }

    pub fn set_below(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Top, PositionMode::OtherEnd, other);
    }

    pub fn set_align_parent_bottom(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Bottom, PositionMode::ParentEdge, None);
    }

    pub fn set_align_bottom(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Bottom, PositionMode::OtherEnd, other);
    }

    pub fn set_above(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Bottom, PositionMode::OtherStart, other);
    }

    pub fn set_center_horizontal(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Left, PositionMode::CenterInParent, None);
    }

    pub fn set_center_vertical(&mut self, id: ViewId) {
        self.set_edge(id, Edge::Top, PositionMode::CenterInParent, None);
    }

    pub fn set_center_in_parent(&mut self, id: ViewId) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.left_mode = PositionMode::CenterInParent;
            attrs.top_mode = PositionMode::CenterInParent;
            self.request_parent_layout(id, true);
        }
    }

    pub fn set_align_center_horizontal(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Left, PositionMode::CenterInOther, other);
    }

    pub fn set_align_center_vertical(&mut self, id: ViewId, other: ViewId) {
        self.set_edge_refer(id, Edge::Top, PositionMode::CenterInOther, other);
    }

    // =========================================================================
    // Margins
    // =========================================================================

    /// The stored margins. Relative margins show their value from the last
    /// prepare pass.
    pub fn margin(&self, id: ViewId) -> Edges {
        self.layout_attrs(id).map_or(Edges::ZERO, |attrs| attrs.margin)
    }

    pub fn set_margin_left(&mut self, id: ViewId, margin: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.margin.left = margin;
            if attrs.left_mode == PositionMode::Fixed && attrs.right_mode == PositionMode::Fixed {
                attrs.left_mode = PositionMode::ParentEdge;
            }
            self.request_parent_layout(id, true);
        }
    }

    pub fn set_margin_top(&mut self, id: ViewId, margin: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.margin.top = margin;
            if attrs.top_mode == PositionMode::Fixed && attrs.bottom_mode == PositionMode::Fixed {
                attrs.top_mode = PositionMode::ParentEdge;
            }
            self.request_parent_layout(id, true);
        }
    }

    pub fn set_margin_right(&mut self, id: ViewId, margin: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.margin.right = margin;
            self.request_parent_layout(id, true);
        }
    }

    pub fn set_margin_bottom(&mut self, id: ViewId, margin: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.margin.bottom = margin;
            self.request_parent_layout(id, true);
        }
    }

    /// Set all four margins. Unlike the per-side setters, fixed edges stay
    /// fixed.
    pub fn set_margin(&mut self, id: ViewId, margin: Edges) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.margin = margin;
            self.request_parent_layout(id, true);
        }
    }

    /// Margin as a fraction of the parent's content width, recomputed every
    /// prepare pass.
    pub fn set_relative_margin_left(&mut self, id: ViewId, weight: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.relative_margin_left = Some(weight);
            if attrs.left_mode == PositionMode::Fixed && attrs.right_mode == PositionMode::Fixed {
                attrs.left_mode = PositionMode::ParentEdge;
            }
            self.request_parent_layout(id, true);
        }
    }

    pub fn set_relative_margin_top(&mut self, id: ViewId, weight: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.relative_margin_top = Some(weight);
            if attrs.top_mode == PositionMode::Fixed && attrs.bottom_mode == PositionMode::Fixed {
                attrs.top_mode = PositionMode::ParentEdge;
            }
            self.request_parent_layout(id, true);
        }
    }

    pub fn set_relative_margin_right(&mut self, id: ViewId, weight: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.relative_margin_right = Some(weight);
            self.request_parent_layout(id, true);
        }
    }

    pub fn set_relative_margin_bottom(&mut self, id: ViewId, weight: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.relative_margin_bottom = Some(weight);
            self.request_parent_layout(id, true);
        }
    }

    pub fn relative_margin_left(&self, id: ViewId) -> Option<f32> {
        self.layout_attrs(id).and_then(|attrs| attrs.relative_margin_left)
    }

    pub fn relative_margin_top(&self, id: ViewId) -> Option<f32> {
        self.layout_attrs(id).and_then(|attrs| attrs.relative_margin_top)
    }

    pub fn relative_margin_right(&self, id: ViewId) -> Option<f32> {
        self.layout_attrs(id).and_then(|attrs| attrs.relative_margin_right)
    }

    pub fn relative_margin_bottom(&self, id: ViewId) -> Option<f32> {
        self.layout_attrs(id).and_then(|attrs| attrs.relative_margin_bottom)
    }

    /// Switch the left margin back to an absolute value.
    pub fn set_absolute_margin_left(&mut self, id: ViewId, margin: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.relative_margin_left = None;
        }
        self.set_margin_left(id, margin);
    }

    pub fn set_absolute_margin_top(&mut self, id: ViewId, margin: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.relative_margin_top = None;
        }
        self.set_margin_top(id, margin);
    }

    pub fn set_absolute_margin_right(&mut self, id: ViewId, margin: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.relative_margin_right = None;
        }
        self.set_margin_right(id, margin);
    }

    pub fn set_absolute_margin_bottom(&mut self, id: ViewId, margin: f32) {
        if let Some(attrs) = self.init_layout_attrs(id) {
            attrs.relative_margin_bottom = None;
        }
        self.set_margin_bottom(id, margin);
    }

    /// The left margin that takes up space next to the view: zero when it is
    /// relative or when both horizontal edges are fixed.
    pub fn absolute_margin_left(&self, id: ViewId) -> f32 {
        match self.layout_attrs(id) {
            Some(attrs) if attrs.relative_margin_left.is_none() => {
                if attrs.left_mode == PositionMode::Fixed && attrs.right_mode == PositionMode::Fixed {
                    0.0
                } else {
                    attrs.margin.left
                }
            }
            _ => 0.0,
        }
    }

    pub fn absolute_margin_top(&self, id: ViewId) -> f32 {
        match self.layout_attrs(id) {
            Some(attrs) if attrs.relative_margin_top.is_none() => {
                if attrs.top_mode == PositionMode::Fixed && attrs.bottom_mode == PositionMode::Fixed {
                    0.0
                } else {
                    attrs.margin.top
                }
            }
            _ => 0.0,
        }
    }

    pub fn absolute_margin_right(&self, id: ViewId) -> f32 {
        match self.layout_attrs(id) {
            Some(attrs) if attrs.relative_margin_right.is_none() => {
                if attrs.left_mode == PositionMode::Fixed && attrs.right_mode == PositionMode::Fixed {
                    0.0
                } else {
                    attrs.margin.right
                }
            }
            _ => 0.0,
        }
    }

    pub fn absolute_margin_bottom(&self, id: ViewId) -> f32 {
        match self.layout_attrs(id) {
            Some(attrs) if attrs.relative_margin_bottom.is_none() => {
                if attrs.top_mode == PositionMode::Fixed && attrs.bottom_mode == PositionMode::Fixed {
                    0.0
                } else {
                    attrs.margin.bottom
                }
            }
            _ => 0.0,
        }
    }

    fn apply_relative_margins(&mut self, id: ViewId, parent_width: f32, parent_height: f32) {
        if let Some(attrs) = self.layout_attrs_mut(id) {
            if let Some(weight) = attrs.relative_margin_left {
                attrs.margin.left = parent_width * weight;
            }
            if let Some(weight) = attrs.relative_margin_top {
                attrs.margin.top = parent_height * weight;
            }
            if let Some(weight) = attrs.relative_margin_right {
                attrs.margin.right = parent_width * weight;
            }
            if let Some(weight) = attrs.relative_margin_bottom {
                attrs.margin.bottom = parent_height * weight;
            }
        }
    }

    // =========================================================================
    // Padding
    // =========================================================================

    fn update_padding(&mut self, id: ViewId, update: impl FnOnce(&mut Edges)) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        update(&mut node.padding);
        self.request_layout(id, true);
        self.call_handler(id, |handler, tree| handler.on_change_padding(tree, id));
    }

    pub fn set_padding(&mut self, id: ViewId, padding: Edges) {
        self.update_padding(id, |p| *p = padding);
    }

    pub fn set_padding_left(&mut self, id: ViewId, value: f32) {
        self.update_padding(id, |p| p.left = value);
    }

    pub fn set_padding_top(&mut self, id: ViewId, value: f32) {
        self.update_padding(id, |p| p.top = value);
    }

    pub fn set_padding_right(&mut self, id: ViewId, value: f32) {
        self.update_padding(id, |p| p.right = value);
    }

    pub fn set_padding_bottom(&mut self, id: ViewId, value: f32) {
        self.update_padding(id, |p| p.bottom = value);
    }

    // =========================================================================
    // Measure
    // =========================================================================

    /// Refresh the measured size if it is stale.
    ///
    /// Fixed axes measure as the frame, wrapping axes ask the handler, and
    /// filling or weighted axes measure as zero.
    pub fn measure_layout(&mut self, id: ViewId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let (width, height) = (node.width(), node.height());
        let Some(attrs) = node.layout.as_deref_mut() else {
            return;
        };
        if !attrs.invalid_measure {
            return;
        }
        let horizontal = attrs.width_mode == SizeMode::Wrapping;
        let vertical = attrs.height_mode == SizeMode::Wrapping;
        attrs.measured_width = if attrs.width_mode == SizeMode::Fixed { width } else { 0.0 };
        attrs.measured_height = if attrs.height_mode == SizeMode::Fixed { height } else { 0.0 };

        if horizontal || vertical {
            self.call_handler(id, |handler, tree| {
                handler.on_measure_layout(tree, id, horizontal, vertical)
            });
        }
        if let Some(attrs) = self.layout_attrs_mut(id) {
            attrs.invalid_measure = false;
        }
    }

    /// The size the parent's layout sees for this axis.
    pub fn measured_width(&self, id: ViewId) -> f32 {
        match self.layout_attrs(id).map(|attrs| (attrs.width_mode, attrs.measured_width)) {
            Some((SizeMode::Wrapping, measured)) => measured,
            Some((SizeMode::Filling | SizeMode::Weight, _)) => 0.0,
            _ => self.width(id),
        }
    }

    pub fn measured_height(&self, id: ViewId) -> f32 {
        match self.layout_attrs(id).map(|attrs| (attrs.height_mode, attrs.measured_height)) {
            Some((SizeMode::Wrapping, measured)) => measured,
            Some((SizeMode::Filling | SizeMode::Weight, _)) => 0.0,
            _ => self.height(id),
        }
    }

    /// Store a measurement from an `on_measure_layout` hook.
    pub fn set_measured_width(&mut self, id: ViewId, width: f32) {
        if let Some(attrs) = self.layout_attrs_mut(id) {
            attrs.measured_width = width;
        }
    }

    pub fn set_measured_height(&mut self, id: ViewId, height: f32) {
        if let Some(attrs) = self.layout_attrs_mut(id) {
            attrs.measured_height = height;
        }
    }

    /// Measure the requested axes as the largest relative bound of the
    /// children that are not gone, plus padding.
    ///
    /// Children outside layout contribute their frame's far edge. Children
    /// whose relative bound is ambiguous are left out.
    pub fn measure_relative_layout(&mut self, id: ViewId, horizontal: bool, vertical: bool) {
        if !horizontal && !vertical {
            return;
        }
        let padding = self.padding(id);
        let children: Vec<ViewId> = self
            .children(id)
            .into_iter()
            .filter(|&child| self.visibility(child) != Visibility::Gone)
            .collect();

        for &child in &children {
            if let Some(attrs) = self.layout_attrs_mut(child) {
                attrs.invalid_relative_bound_width = true;
                attrs.invalid_relative_bound_height = true;
            }
        }

        let mut measured_width: f32 = 0.0;
        let mut measured_height: f32 = 0.0;
        for &child in &children {
            if self.is_layouting(child) {
                if horizontal {
                    if let Some(w) = self.measure_relative_bound_width(child) {
                        measured_width = measured_width.max(w + padding.horizontal());
                    }
                }
                if vertical {
                    if let Some(h) = self.measure_relative_bound_height(child) {
                        measured_height = measured_height.max(h + padding.vertical());
                    }
                }
            } else {
                let frame = self.frame(child);
                if horizontal {
                    measured_width = measured_width.max(frame.right);
                }
                if vertical {
                    measured_height = measured_height.max(frame.bottom);
                }
            }
        }
        if horizontal {
            self.set_measured_width(id, measured_width);
        }
        if vertical {
            self.set_measured_height(id, measured_height);
        }
    }

    // =========================================================================
    // Prepare
    // =========================================================================

    /// Resolve the layout frame of `id` against `param`.
    pub(crate) fn prepare_layout(&mut self, id: ViewId, param: &PrepareLayoutParam) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.is_visible() {
            return;
        }
        let Some(attrs) = node.layout.as_deref() else {
            return;
        };
        let mut frame = if param.use_layout_frame { attrs.frame } else { node.frame };
        if attrs.width_mode == SizeMode::Wrapping || attrs.height_mode == SizeMode::Wrapping {
            self.measure_layout(id);
        }

        let parent = param.parent_content_frame;
        let parent_width = parent.width();
        let parent_height = parent.height();
        self.apply_relative_margins(id, parent_width, parent_height);

        let Some(attrs) = self.layout_attrs(id) else {
            return;
        };
        let (width_mode, left_mode, right_mode) =
            normalize_axis(attrs.width_mode, attrs.left_mode, attrs.right_mode);
        let (height_mode, top_mode, bottom_mode) =
            normalize_axis(attrs.height_mode, attrs.top_mode, attrs.bottom_mode);
        let margin = attrs.margin;
        let (width_weight, height_weight) = (attrs.width_weight, attrs.height_weight);
        let refer = |r: Option<ViewId>| self.sibling_refer(id, r);
        let (left_refer, top_refer) = (refer(attrs.left_refer), refer(attrs.top_refer));
        let (right_refer, bottom_refer) = (refer(attrs.right_refer), refer(attrs.bottom_refer));

        let width = match width_mode {
            SizeMode::Wrapping => attrs.measured_width,
            SizeMode::Filling | SizeMode::Weight => parent_width * width_weight.abs(),
            SizeMode::Fixed => frame.width(),
        }
        .max(0.0);
        let height = match height_mode {
            SizeMode::Wrapping => attrs.measured_height,
            SizeMode::Filling | SizeMode::Weight => parent_height * height_weight.abs(),
            SizeMode::Fixed => frame.height(),
        }
        .max(0.0);

        match left_mode {
            PositionMode::ParentEdge => frame.left = parent.left + margin.left,
            PositionMode::OtherStart => {
                frame.left = match left_refer {
                    Some(r) => self.layout_frame(r).left + margin.left,
                    None => parent.left + margin.left,
                };
            }
            PositionMode::OtherEnd => {
                frame.left = match left_refer {
                    Some(r) => self.layout_frame(r).right + self.margin(r).right + margin.left,
                    None => parent.left + margin.left,
                };
            }
            PositionMode::CenterInParent => {
                frame.left = (parent.left + margin.left + parent.right - margin.right - width) / 2.0;
            }
            PositionMode::CenterInOther => {
                let base = left_refer.map_or(parent, |r| self.layout_frame(r));
                frame.left = (base.left + margin.left + base.right - margin.right - width) / 2.0;
            }
            PositionMode::Fixed => {}
        }
        match right_mode {
            PositionMode::ParentEdge => frame.right = parent.right - margin.right,
            PositionMode::OtherStart => {
                frame.right = match right_refer {
                    Some(r) => self.layout_frame(r).left - self.margin(r).left - margin.right,
                    None => parent.right - margin.right,
                };
            }
            PositionMode::OtherEnd => {
                frame.right = match right_refer {
                    Some(r) => self.layout_frame(r).right - margin.right,
                    None => parent.right - margin.right,
                };
            }
            _ => frame.right = parent.right,
        }
        match top_mode {
            PositionMode::ParentEdge => frame.top = parent.top + margin.top,
            PositionMode::OtherStart => {
                frame.top = match top_refer {
                    Some(r) => self.layout_frame(r).top + margin.top,
                    None => parent.top + margin.top,
                };
            }
            PositionMode::OtherEnd => {
                frame.top = match top_refer {
                    Some(r) => self.layout_frame(r).bottom + self.margin(r).bottom + margin.top,
                    None => parent.top + margin.top,
                };
            }
            PositionMode::CenterInParent => {
                frame.top = (parent.top + margin.top + parent.bottom - margin.bottom - height) / 2.0;
            }
            PositionMode::CenterInOther => {
                let base = top_refer.map_or(parent, |r| self.layout_frame(r));
                frame.top = (base.top + margin.top + base.bottom - margin.bottom - height) / 2.0;
            }
            PositionMode::Fixed => {}
        }
        match bottom_mode {
            PositionMode::ParentEdge => frame.bottom = parent.bottom - margin.bottom,
            PositionMode::OtherStart => {
                frame.bottom = match bottom_refer {
                    Some(r) => self.layout_frame(r).top - self.margin(r).top - margin.bottom,
                    None => parent.bottom - margin.bottom,
                };
            }
            PositionMode::OtherEnd => {
                frame.bottom = match bottom_refer {
                    Some(r) => self.layout_frame(r).bottom - margin.bottom,
                    None => parent.bottom - margin.bottom,
                };
            }
            _ => frame.bottom = parent.bottom,
        }

        resolve_extent(&mut frame.left, &mut frame.right, width_mode, left_mode, right_mode, width, width_weight);
        resolve_extent(&mut frame.top, &mut frame.bottom, height_mode, top_mode, bottom_mode, height, height_weight);

        frame.fix_size_error();
        if let Some(attrs) = self.layout_attrs_mut(id) {
            attrs.frame = frame;
            attrs.updated_layout_frame = true;
        }
    }

    // =========================================================================
    // Make
    // =========================================================================

    /// Run a layout pass rooted at `id` if its layout is stale.
    pub fn make_layout(&mut self, id: ViewId) {
        let _perf = PerfSpan::new("make_layout");
        self.make_layout_internal(id, false);
    }

    /// With `apply`, first move the view to its resolved layout frame and
    /// only lay out the children if that changed its size.
    pub(crate) fn make_layout_internal(&mut self, id: ViewId, apply: bool) {
        if !self.is_ui_thread() {
            return;
        }
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.is_visible() {
            return;
        }
        match node.layout.as_deref_mut() {
            Some(attrs) if !attrs.recursive_make_layout => attrs.recursive_make_layout = true,
            _ => return,
        }
        let _span = tracing::trace_span!(target: targets::LAYOUT, span_names::MAKE_LAYOUT, ?id, apply).entered();

        'pass: {
            let Some(attrs) = self.layout_attrs(id) else {
                break 'pass;
            };
            if apply {
                let layout_frame = attrs.frame;
                let frame = self.frame(id);
                if layout_frame.is_almost_equal(&frame) {
                    break 'pass;
                }
                self.set_frame_internal(id, layout_frame, false, true);
                if is_almost_equal(layout_frame.width(), frame.width())
                    && is_almost_equal(layout_frame.height(), frame.height())
                {
                    break 'pass;
                }
            } else {
                if !attrs.invalid_layout {
                    break 'pass;
                }
                if attrs.width_mode == SizeMode::Wrapping || attrs.height_mode == SizeMode::Wrapping {
                    self.measure_layout(id);
                    let Some(attrs) = self.layout_attrs(id) else {
                        break 'pass;
                    };
                    let mut frame = self.frame(id);
                    if attrs.width_mode == SizeMode::Wrapping {
                        frame.set_width(attrs.measured_width);
                    }
                    if attrs.height_mode == SizeMode::Wrapping {
                        frame.set_height(attrs.measured_height);
                    }
                    self.set_frame_internal(id, frame, false, true);
                }
            }

            if self.is_making_layout(id) {
                self.layout_children(id);
            }
        }

        if let Some(attrs) = self.layout_attrs_mut(id) {
            attrs.invalid_layout = false;
            attrs.recursive_make_layout = false;
        }
    }

    fn layout_children(&mut self, id: ViewId) {
        let mut param = PrepareLayoutParam {
            parent_content_frame: self.bounds_inner_padding(id),
            use_layout_frame: false,
        };
        let children: Vec<ViewId> = self
            .children(id)
            .into_iter()
            .filter(|&child| self.is_layouting(child))
            .collect();

        for &child in &children {
            self.prepare_layout(child, &param);
            self.set_layout_frame_updated(child, false);
        }

        if self.is_on_make_layout_enabled(id) {
            self.call_handler(id, |handler, tree| handler.on_make_layout(tree, id));
        }

        param.use_layout_frame = true;
        for &child in &children {
            if !self.is_layouting(child) {
                continue;
            }
            if !self.is_layout_frame_updated(child) {
                self.prepare_layout(child, &param);
                if self.is_on_prepare_layout_enabled(child) {
                    self.call_handler(child, |handler, tree| handler.on_prepare_layout(tree, child, &param));
                }
            }
            self.make_layout_internal(child, true);
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Post a layout pass for `id` if it sits, visible, under a view backed
    /// by a platform instance.
    pub(crate) fn request_make_layout(&mut self, id: ViewId) {
        let mut current = Some(id);
        while let Some(view) = current {
            let Some(node) = self.nodes.get(view) else {
                return;
            };
            if !node.is_visible() {
                return;
            }
            if node.instance.is_some() {
                break;
            }
            current = node.parent;
        }
        if current.is_some() {
            self.post_to_ui_thread("make_layout", move |tree| tree.make_layout_internal(id, false));
        }
    }

    fn request_invalidate_layout(&mut self, id: ViewId) {
        if let Some(attrs) = self.layout_attrs_mut(id) {
            attrs.invalid_layout = true;
            attrs.invalid_measure = true;
            self.request_make_layout(id);
        }
    }

    /// Mark layout dirty, and the measure of every wrapping ancestor on the
    /// requested axes.
    fn request_invalidate_measure(&mut self, id: ViewId, width: bool, height: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let parent = node.parent;
        let Some(attrs) = node.layout.as_deref_mut() else {
            return;
        };
        attrs.invalid_layout = true;
        let width = width && attrs.width_mode == SizeMode::Wrapping;
        let height = height && attrs.height_mode == SizeMode::Wrapping;
        if width || height {
            if let Some(parent) = parent {
                self.request_invalidate_measure(parent, width, height);
            }
        }
        self.request_invalidate_layout(id);
    }

    /// The view's content changed: re-measure it and lay out its children.
    pub fn request_layout(&mut self, id: ViewId, redraw: bool) {
        self.request_invalidate_measure(id, true, true);
        if redraw {
            self.invalidate(id);
        }
    }

    /// Only the parent's placement of this view changed.
    pub fn request_parent_layout(&mut self, id: ViewId, redraw: bool) {
        if let Some(parent) = self.parent(id) {
            self.request_layout(parent, redraw);
        }
    }

    /// Both the view's own size and the parent's placement of it changed.
    pub fn request_parent_and_self_layout(&mut self, id: ViewId, redraw: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let parent = node.parent;
        let Some(attrs) = node.layout.as_deref_mut() else {
            return;
        };
        attrs.invalid_layout = true;
        attrs.invalid_measure = true;
        match parent {
            Some(parent) if self.is_layouting(parent) => {
                self.request_layout(parent, redraw);
                self.request_invalidate_layout(id);
            }
            _ => {
                self.request_invalidate_layout(id);
                if redraw {
                    self.invalidate(id);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

/// Settle one axis once both edges are resolved.
fn resolve_extent(
    start: &mut f32,
    end: &mut f32,
    size_mode: SizeMode,
    start_mode: PositionMode,
    end_mode: PositionMode,
    size: f32,
    weight: f32,
) {
    if size_mode == SizeMode::Filling {
        if *end < *start {
            *end = *start;
        }
        if size > 0.0 && size < *end - *start {
            if weight > 0.0 {
                *end = *start + size;
            } else {
                *start = *end - size;
            }
        }
    } else if start_mode == PositionMode::Fixed && end_mode != PositionMode::Fixed {
        *start = *end - size;
    } else {
        *end = *start + size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(tree: &mut ViewTree, w: f32, h: f32) -> ViewId {
        let root = tree.create_group();
        tree.set_frame(root, Rect::new(0.0, 0.0, w, h), false);
        root
    }

    fn child(tree: &mut ViewTree, parent: ViewId, frame: Rect) -> ViewId {
        let child = tree.create_view();
        tree.set_frame(child, frame, false);
        tree.add_child(parent, child).unwrap();
        child
    }

    #[test]
    fn test_normalize_axis() {
        use PositionMode::*;
        assert_eq!(
            normalize_axis(SizeMode::Filling, Fixed, Fixed),
            (SizeMode::Filling, ParentEdge, ParentEdge)
        );
        assert_eq!(
            normalize_axis(SizeMode::Filling, CenterInParent, ParentEdge),
            (SizeMode::Weight, CenterInParent, Fixed)
        );
        assert_eq!(normalize_axis(SizeMode::Fixed, OtherEnd, ParentEdge), (SizeMode::Fixed, OtherEnd, Fixed));
        assert_eq!(normalize_axis(SizeMode::Fixed, Fixed, ParentEdge), (SizeMode::Fixed, Fixed, ParentEdge));
    }

    #[test]
    fn test_align_parent_right_keeps_width() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 200.0, 100.0);
        let c = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 20.0));
        tree.set_align_parent_right(c);
        tree.set_margin_right(c, 10.0);
        tree.make_layout(root);
        assert_eq!(tree.frame(c), Rect::new(140.0, 0.0, 190.0, 20.0));
    }

    #[test]
    fn test_right_of_sibling_uses_its_margin() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 300.0, 100.0);
        let a = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 20.0));
        let b = child(&mut tree, root, Rect::new(0.0, 0.0, 40.0, 20.0));
        tree.set_align_parent_left(a);
        tree.set_margin_left(a, 5.0);
        tree.set_margin_right(a, 7.0);
        tree.set_right_of(b, a);
        tree.set_margin_left(b, 3.0);
        tree.make_layout(root);
        assert_eq!(tree.frame(a).left, 5.0);
        assert_eq!(tree.frame(b).left, 55.0 + 7.0 + 3.0);
        assert_eq!(tree.frame(b).width(), 40.0);
    }

    #[test]
    fn test_center_in_parent_with_padding() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 100.0, 100.0);
        tree.set_padding(root, Edges::new(10.0, 0.0, 30.0, 0.0));
        let c = child(&mut tree, root, Rect::new(0.0, 0.0, 20.0, 20.0));
        tree.set_center_in_parent(c);
        tree.make_layout(root);
        assert_eq!(tree.frame(c).left, (10.0 + 70.0 - 20.0) / 2.0);
        assert_eq!(tree.frame(c).top, 40.0);
    }

    #[test]
    fn test_weight_size() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 200.0, 100.0);
        let c = child(&mut tree, root, Rect::new(0.0, 0.0, 10.0, 10.0));
        tree.set_width_weight(c, 0.25);
        tree.set_height_weight(c, -0.5);
        tree.make_layout(root);
        assert_eq!(tree.frame(c).width(), 50.0);
        assert_eq!(tree.frame(c).height(), 50.0);
    }

    #[test]
    fn test_stale_reference_falls_back_to_parent_edge() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 200.0, 100.0);
        let a = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 20.0));
        let b = child(&mut tree, root, Rect::new(30.0, 0.0, 70.0, 20.0));
        tree.set_right_of(b, a);
        tree.set_margin_left(b, 4.0);
        tree.destroy_view(a);
        tree.make_layout(root);
        assert_eq!(tree.frame(b).left, 4.0);
    }

    #[test]
    fn test_removed_sibling_reference_falls_back_to_parent_edge() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 200.0, 100.0);
        let a = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 20.0));
        let b = child(&mut tree, root, Rect::new(0.0, 0.0, 40.0, 20.0));
        tree.set_align_parent_left(a);
        tree.set_right_of(b, a);
        tree.make_layout(root);
        assert_eq!(tree.frame(b).left, 50.0);

        tree.remove_child(root, a).unwrap();
        assert!(tree.contains(a));
        tree.make_layout(root);
        assert_eq!(tree.frame(b), Rect::new(0.0, 0.0, 40.0, 20.0));
        assert_eq!(tree.sibling_refer(b, Some(a)), None);
    }

    #[test]
    fn test_reference_into_other_parent_is_ignored() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 200.0, 100.0);
        let column = |tree: &mut ViewTree, frame: Rect| {
            let id = tree.create_group();
            tree.set_frame(id, frame, false);
            tree.add_child(root, id).unwrap();
            id
        };
        let left = column(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0));
        let right = column(&mut tree, Rect::new(100.0, 0.0, 200.0, 100.0));
        let anchor = child(&mut tree, left, Rect::new(0.0, 0.0, 60.0, 20.0));
        let b = child(&mut tree, right, Rect::new(0.0, 0.0, 30.0, 20.0));
        tree.set_right_of(b, anchor);
        assert_eq!(tree.layout_left_refer(b), Some(anchor));
        tree.make_layout(root);
        assert_eq!(tree.frame(b).left, 0.0);
        assert_eq!(tree.measure_relative_bound_width(b), Some(30.0));
    }

    #[test]
    fn test_reference_setter_ignores_missing_view() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 200.0, 100.0);
        let a = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 20.0));
        let gone = tree.create_view();
        tree.destroy_view(gone);
        tree.set_above(a, gone);
        assert_eq!(tree.layout_bottom_mode(a), PositionMode::Fixed);
        let b = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 20.0));
        tree.set_above(a, b);
        assert_eq!(tree.layout_bottom_mode(a), PositionMode::OtherStart);
        assert_eq!(tree.layout_bottom_refer(a), Some(b));
    }

    #[test]
    fn test_margin_setter_promotes_fixed_left_edge() {
        let mut tree = ViewTree::new();
        let v = tree.create_view();
        tree.set_margin_left(v, 8.0);
        assert_eq!(tree.layout_left_mode(v), PositionMode::ParentEdge);
        assert_eq!(tree.absolute_margin_left(v), 8.0);
        tree.set_margin_right(v, 3.0);
        assert_eq!(tree.layout_right_mode(v), PositionMode::Fixed);
        tree.set_relative_margin_left(v, 0.1);
        assert_eq!(tree.absolute_margin_left(v), 0.0);
        assert_eq!(tree.relative_margin_left(v), Some(0.1));
    }

    #[test]
    fn test_relative_margin_resolves_against_parent() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 200.0, 100.0);
        let c = child(&mut tree, root, Rect::new(0.0, 0.0, 20.0, 20.0));
        tree.set_relative_margin_left(c, 0.25);
        tree.make_layout(root);
        assert_eq!(tree.frame(c).left, 50.0);
        assert_eq!(tree.margin(c).left, 50.0);
    }

    #[test]
    fn test_wrapping_root_measures_children() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 10.0, 10.0);
        tree.set_size_wrapping(root);
        tree.set_padding(root, Edges::uniform(5.0));
        let a = tree.create_view();
        tree.set_frame(a, Rect::new(0.0, 0.0, 40.0, 30.0), false);
        tree.add_child(root, a).unwrap();
        tree.set_align_parent_left(a);
        tree.set_align_parent_top(a);
        tree.make_layout(root);
        assert_eq!(tree.width(root), 50.0);
        assert_eq!(tree.height(root), 40.0);
        assert_eq!(tree.frame(a), Rect::new(5.0, 5.0, 45.0, 35.0));
    }

    #[test]
    fn test_wrapping_root_keeps_its_position() {
        let mut tree = ViewTree::new();
        let root = tree.create_group();
        tree.set_size_wrapping(root);
        tree.set_frame(root, Rect::new(100.0, 50.0, 110.0, 60.0), false);
        let a = child(&mut tree, root, Rect::new(0.0, 0.0, 40.0, 30.0));
        tree.set_align_parent_left(a);
        tree.set_align_parent_top(a);
        tree.make_layout(root);
        assert_eq!(tree.frame(root), Rect::new(100.0, 50.0, 140.0, 80.0));
    }

    #[test]
    fn test_gone_child_shrinks_wrapping_parent() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 10.0, 10.0);
        tree.set_size_wrapping(root);
        let a = child(&mut tree, root, Rect::new(0.0, 0.0, 40.0, 30.0));
        let b = child(&mut tree, root, Rect::new(0.0, 0.0, 60.0, 20.0));
        tree.set_align_parent_left(a);
        tree.set_align_parent_top(a);
        tree.set_align_parent_left(b);
        tree.set_below(b, a);
        tree.make_layout(root);
        assert_eq!((tree.width(root), tree.height(root)), (60.0, 50.0));
        assert_eq!(tree.frame(b), Rect::new(0.0, 30.0, 60.0, 50.0));

        tree.set_visibility(b, Visibility::Gone, false);
        tree.make_layout(root);
        assert_eq!((tree.width(root), tree.height(root)), (40.0, 30.0));

        tree.set_visibility(b, Visibility::Visible, false);
        tree.make_layout(root);
        assert_eq!((tree.width(root), tree.height(root)), (60.0, 50.0));
    }

    #[test]
    fn test_partial_filling_weight_anchors_by_sign() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 200.0, 100.0);
        let start = child(&mut tree, root, Rect::new(0.0, 0.0, 10.0, 10.0));
        let end = child(&mut tree, root, Rect::new(0.0, 20.0, 10.0, 30.0));
        tree.set_width_filling(start, 0.5);
        tree.set_width_filling(end, -0.5);
        tree.make_layout(root);
        assert_eq!((tree.frame(start).left, tree.frame(start).right), (0.0, 100.0));
        assert_eq!((tree.frame(end).left, tree.frame(end).right), (100.0, 200.0));

        // A weight that asks for more than the span just fills it.
        tree.set_width_filling(start, 1.5);
        tree.make_layout(root);
        assert_eq!((tree.frame(start).left, tree.frame(start).right), (0.0, 200.0));
    }

    #[test]
    fn test_on_make_layout_places_child() {
        struct Stack;
        impl super::super::ViewHandler for Stack {
            fn on_make_layout(&mut self, tree: &mut ViewTree, id: ViewId) {
                let mut y = 0.0;
                for child in tree.children(id) {
                    let h = tree.height(child);
                    tree.set_layout_frame(child, Rect::new(0.0, y, tree.width(child), y + h));
                    y += h;
                }
            }
        }
        let mut tree = ViewTree::new();
        let root = tree.create_view_with_handler(Box::new(Stack));
        tree.set_frame(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        tree.set_making_layout(root, true);
        tree.set_on_make_layout_enabled(root, true);
        let a = child(&mut tree, root, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = child(&mut tree, root, Rect::new(0.0, 0.0, 10.0, 15.0));
        tree.set_align_parent_left(a);
        tree.set_align_parent_left(b);
        tree.make_layout(root);
        assert_eq!(tree.frame(a), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(tree.frame(b), Rect::new(0.0, 10.0, 10.0, 25.0));
    }

    #[test]
    fn test_set_frame_marks_parent_layout_dirty() {
        let mut tree = ViewTree::new();
        let root = group(&mut tree, 100.0, 100.0);
        tree.make_layout(root);
        assert!(!tree.layout_attrs(root).unwrap().invalid_layout);
        let c = child(&mut tree, root, Rect::new(0.0, 0.0, 10.0, 10.0));
        tree.make_layout(root);
        tree.set_frame(c, Rect::new(0.0, 0.0, 20.0, 10.0), false);
        assert!(tree.layout_attrs(root).unwrap().invalid_layout);
    }
}
