//! Relative bounds: how much room a child needs inside a wrapping parent.
//!
//! The relative bound of a child on one axis is its measured extent plus its
//! absolute margins plus whatever the sibling it is anchored to needs in
//! front of it. Anchoring through a sibling whose own extent depends on the
//! parent (centered, or pinned at the far edge) makes the bound ambiguous;
//! such children are marked bad and left out of the parent's measurement.
//! So is any chain of anchors that loops back onto itself.

use horizon_trellis_render::Rect;
use tracing::debug;

use horizon_trellis_core::logging::targets;

use super::layout::normalize_axis;
use super::node::{Edges, LayoutAttributes, PositionMode, SizeMode, ViewId};
use super::tree::ViewTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn start(self, rect: &Rect) -> f32 {
        match self {
            Axis::Horizontal => rect.left,
            Axis::Vertical => rect.top,
        }
    }

    fn end(self, rect: &Rect) -> f32 {
        match self {
            Axis::Horizontal => rect.right,
            Axis::Vertical => rect.bottom,
        }
    }

    fn start_edge(self, edges: &Edges) -> f32 {
        match self {
            Axis::Horizontal => edges.left,
            Axis::Vertical => edges.top,
        }
    }
}

impl LayoutAttributes {
    fn axis_modes(&self, axis: Axis) -> (SizeMode, PositionMode, PositionMode) {
        match axis {
            Axis::Horizontal => (self.width_mode, self.left_mode, self.right_mode),
            Axis::Vertical => (self.height_mode, self.top_mode, self.bottom_mode),
        }
    }

    fn axis_refers(&self, axis: Axis) -> (Option<ViewId>, Option<ViewId>) {
        match axis {
            Axis::Horizontal => (self.left_refer, self.right_refer),
            Axis::Vertical => (self.top_refer, self.bottom_refer),
        }
    }

    /// Start and end margins; relative margins count as zero.
    fn axis_margins(&self, axis: Axis) -> (f32, f32) {
        let (start, end, relative_start, relative_end) = match axis {
            Axis::Horizontal => (
                self.margin.left,
                self.margin.right,
                self.relative_margin_left,
                self.relative_margin_right,
            ),
            Axis::Vertical => (
                self.margin.top,
                self.margin.bottom,
                self.relative_margin_top,
                self.relative_margin_bottom,
            ),
        };
        (
            if relative_start.is_some() { 0.0 } else { start },
            if relative_end.is_some() { 0.0 } else { end },
        )
    }

    fn axis_measured(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.measured_width,
            Axis::Vertical => self.measured_height,
        }
    }

    fn bound_value(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.measured_relative_bound_width,
            Axis::Vertical => self.measured_relative_bound_height,
        }
    }

    fn is_bad_bound(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.bad_relative_bound_width,
            Axis::Vertical => self.bad_relative_bound_height,
        }
    }

    fn bound_flags_mut(&mut self, axis: Axis) -> BoundFlags<'_> {
        match axis {
            Axis::Horizontal => BoundFlags {
                value: &mut self.measured_relative_bound_width,
                invalid: &mut self.invalid_relative_bound_width,
                bad: &mut self.bad_relative_bound_width,
                measuring: &mut self.measuring_relative_bound_width,
            },
            Axis::Vertical => BoundFlags {
                value: &mut self.measured_relative_bound_height,
                invalid: &mut self.invalid_relative_bound_height,
                bad: &mut self.bad_relative_bound_height,
                measuring: &mut self.measuring_relative_bound_height,
            },
        }
    }
}

struct BoundFlags<'a> {
    value: &'a mut f32,
    invalid: &'a mut bool,
    bad: &'a mut bool,
    measuring: &'a mut bool,
}

impl ViewTree {
    /// Horizontal room the view needs in its parent, or `None` when it is
    /// ambiguous. Cached until the parent re-measures.
    pub fn measure_relative_bound_width(&mut self, id: ViewId) -> Option<f32> {
        self.measure_relative_bound(id, Axis::Horizontal)
    }

    pub fn measure_relative_bound_height(&mut self, id: ViewId) -> Option<f32> {
        self.measure_relative_bound(id, Axis::Vertical)
    }

    fn measure_relative_bound(&mut self, id: ViewId, axis: Axis) -> Option<f32> {
        self.walk_relative_bound(id, axis);
        let attrs = self.layout_attrs(id)?;
        (!attrs.is_bad_bound(axis)).then(|| attrs.bound_value(axis))
    }

    fn walk_relative_bound(&mut self, id: ViewId, axis: Axis) {
        let Some(attrs) = self.layout_attrs_mut(id) else {
            return;
        };
        let flags = attrs.bound_flags_mut(axis);
        if *flags.measuring {
            debug!(target: targets::LAYOUT, ?id, ?axis, "relative bound anchors form a cycle");
            *flags.bad = true;
            return;
        }
        if !*flags.invalid {
            return;
        }
        *flags.invalid = false;
        *flags.value = 0.0;
        *flags.bad = false;
        *flags.measuring = true;

        self.measure_layout(id);
        let outcome = self.compute_relative_bound(id, axis);

        if let Some(attrs) = self.layout_attrs_mut(id) {
            let flags = attrs.bound_flags_mut(axis);
            *flags.measuring = false;
            match outcome {
                Some(value) => *flags.value = value.max(0.0),
                None => *flags.bad = true,
            }
        }
    }

    fn compute_relative_bound(&mut self, id: ViewId, axis: Axis) -> Option<f32> {
        let node = self.nodes.get(id)?;
        let attrs = node.layout.as_deref()?;
        let (size_mode, start_mode, end_mode) = attrs.axis_modes(axis);
        let (_, start_mode, mut end_mode) = normalize_axis(size_mode, start_mode, end_mode);
        if start_mode != PositionMode::Fixed {
            end_mode = PositionMode::Fixed;
        }
        let (mut margin_start, margin_end) = attrs.axis_margins(axis);
        let (start_refer, end_refer) = attrs.axis_refers(axis);
        let measured = attrs.axis_measured(axis);
        let parent_padding = node
            .parent
            .map_or(0.0, |parent| axis.start_edge(&self.padding(parent)));
        if start_mode == PositionMode::Fixed && end_mode == PositionMode::Fixed {
            margin_start = axis.start(&node.frame) - parent_padding;
        }

        let mut outer = measured + margin_start + margin_end;

        if matches!(start_mode, PositionMode::OtherStart | PositionMode::OtherEnd) {
            if let Some(refer) = self.sibling_refer(id, start_refer) {
                match self.layout_attrs(refer).map(|a| a.axis_modes(axis)) {
                    None => {
                        let frame = self.frame(refer);
                        let edge = if start_mode == PositionMode::OtherStart {
                            axis.start(&frame)
                        } else {
                            axis.end(&frame)
                        };
                        outer += edge - parent_padding;
                    }
                    Some((_, refer_start, refer_end)) => {
                        if refer_end != PositionMode::Fixed
                            || matches!(refer_start, PositionMode::CenterInParent | PositionMode::CenterInOther)
                        {
                            return None;
                        }
                        let bound = self.measure_relative_bound(refer, axis)?;
                        let mut extra = bound - self.absolute_margin_end(refer, axis);
                        if start_mode == PositionMode::OtherStart {
                            extra -= self.measured_extent(refer, axis);
                        }
                        outer += extra.max(0.0);
                    }
                }
            }
        }

        if matches!(end_mode, PositionMode::OtherStart | PositionMode::OtherEnd) {
            if let Some(refer) = self.sibling_refer(id, end_refer) {
                let (_, refer_start, refer_end) = self.layout_attrs(refer)?.axis_modes(axis);
                if refer_end == PositionMode::Fixed || refer_start != PositionMode::Fixed {
                    return None;
                }
                let bound = self.measure_relative_bound(refer, axis)?;
                let mut extra = bound - self.absolute_margin_start(refer, axis);
                if end_mode == PositionMode::OtherEnd {
                    extra -= self.measured_extent(refer, axis);
                }
                outer += extra.max(0.0);
            }
        }

        Some(outer)
    }

    fn measured_extent(&self, id: ViewId, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.measured_width(id),
            Axis::Vertical => self.measured_height(id),
        }
    }

    fn absolute_margin_start(&self, id: ViewId, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.absolute_margin_left(id),
            Axis::Vertical => self.absolute_margin_top(id),
        }
    }

    fn absolute_margin_end(&self, id: ViewId, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.absolute_margin_right(id),
            Axis::Vertical => self.absolute_margin_bottom(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(tree: &mut ViewTree, parent: ViewId, w: f32, h: f32) -> ViewId {
        let id = tree.create_view();
        tree.set_frame(id, Rect::new(0.0, 0.0, w, h), false);
        tree.add_child(parent, id).unwrap();
        id
    }

    #[test]
    fn test_bound_includes_margins() {
        let mut tree = ViewTree::new();
        let root = tree.create_group();
        let a = sized(&mut tree, root, 40.0, 10.0);
        tree.set_align_parent_left(a);
        tree.set_margin_left(a, 5.0);
        tree.set_margin_right(a, 3.0);
        assert_eq!(tree.measure_relative_bound_width(a), Some(48.0));
    }

    #[test]
    fn test_chain_adds_sibling_bound() {
        let mut tree = ViewTree::new();
        let root = tree.create_group();
        let a = sized(&mut tree, root, 40.0, 10.0);
        let b = sized(&mut tree, root, 30.0, 10.0);
        tree.set_align_parent_left(a);
        tree.set_margin_right(a, 2.0);
        tree.set_right_of(b, a);
        // a: 40 + 2; b after a: 30 + (42 - 2) with a's end margin folded in.
        assert_eq!(tree.measure_relative_bound_width(b), Some(70.0));
    }

    #[test]
    fn test_centered_reference_is_bad() {
        let mut tree = ViewTree::new();
        let root = tree.create_group();
        let a = sized(&mut tree, root, 40.0, 10.0);
        let b = sized(&mut tree, root, 30.0, 10.0);
        tree.set_center_horizontal(a);
        tree.set_right_of(b, a);
        assert_eq!(tree.measure_relative_bound_width(b), None);
    }

    #[test]
    fn test_cycle_is_bad_and_terminates() {
        let mut tree = ViewTree::new();
        let root = tree.create_group();
        let a = sized(&mut tree, root, 40.0, 10.0);
        let b = sized(&mut tree, root, 30.0, 10.0);
        tree.set_right_of(a, b);
        tree.set_right_of(b, a);
        assert_eq!(tree.measure_relative_bound_width(a), None);
        assert_eq!(tree.measure_relative_bound_width(b), None);
    }

    #[test]
    fn test_three_view_cycle_is_bad_for_every_member() {
        let mut tree = ViewTree::new();
        let root = tree.create_group();
        let a = sized(&mut tree, root, 40.0, 10.0);
        let b = sized(&mut tree, root, 30.0, 10.0);
        let c = sized(&mut tree, root, 20.0, 10.0);
        let tail = sized(&mut tree, root, 10.0, 10.0);
        tree.set_right_of(a, c);
        tree.set_right_of(b, a);
        tree.set_right_of(c, b);
        tree.set_right_of(tail, a);
        for id in [a, b, c, tail] {
            assert_eq!(tree.measure_relative_bound_width(id), None);
        }
        // The vertical axis has no references and stays measurable.
        assert_eq!(tree.measure_relative_bound_height(b), Some(10.0));
    }

    #[test]
    fn test_fixed_view_uses_offset_from_parent_padding() {
        let mut tree = ViewTree::new();
        let root = tree.create_group();
        tree.set_padding(root, Edges::uniform(4.0));
        let a = tree.create_view();
        tree.set_frame(a, Rect::new(10.0, 14.0, 30.0, 24.0), false);
        tree.add_child(root, a).unwrap();
        tree.set_width_fixed(a);
        assert_eq!(tree.measure_relative_bound_width(a), Some(6.0 + 20.0));
        assert_eq!(tree.measure_relative_bound_height(a), Some(10.0 + 10.0));
    }
}
