//! Tab-stop traversal.
//!
//! Without explicit links the tab order is a depth-first walk of the tree in
//! child order, wrapping around at the root. Only views that are focusable,
//! visible and enabled can be stops.

use horizon_trellis_core::logging::targets;
use tracing::trace;

use super::node::ViewId;
use super::tree::ViewTree;

impl ViewTree {
    fn is_tab_stop_candidate(&self, id: ViewId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|node| node.focusable && node.is_visible() && node.enabled)
    }

    /// First stop in `id`'s subtree in tab order, `id` included.
    pub fn first_focusable_descendant(&self, id: ViewId) -> Option<ViewId> {
        if self.is_tab_stop_candidate(id) {
            return Some(id);
        }
        let node = self.nodes.get(id)?;
        if !node.is_visible() || !node.enabled {
            return None;
        }
        node.children
            .iter()
            .find_map(|&child| self.first_focusable_descendant(child))
    }

    /// Last stop in `id`'s subtree in tab order, `id` included.
    pub fn last_focusable_descendant(&self, id: ViewId) -> Option<ViewId> {
        let node = self.nodes.get(id)?;
        if !node.is_visible() || !node.enabled {
            return None;
        }
        node.children
            .iter()
            .rev()
            .find_map(|&child| self.last_focusable_descendant(child))
            .or_else(|| self.is_tab_stop_candidate(id).then_some(id))
    }

    /// The stop after `id` in tree order.
    pub fn next_focusable_view(&self, id: ViewId) -> Option<ViewId> {
        let node = self.nodes.get(id)?;
        if let Some(found) = node
            .children
            .iter()
            .find_map(|&child| self.first_focusable_descendant(child))
        {
            return Some(found);
        }
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let siblings = &self.nodes.get(parent)?.children;
            let index = siblings.iter().position(|&s| s == current)?;
            if let Some(found) = siblings[index + 1..]
                .iter()
                .find_map(|&sibling| self.first_focusable_descendant(sibling))
            {
                return Some(found);
            }
            current = parent;
        }
        self.first_focusable_descendant(current)
    }

    /// The stop before `id` in tree order.
    pub fn previous_focusable_view(&self, id: ViewId) -> Option<ViewId> {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let siblings = &self.nodes.get(parent)?.children;
            let index = siblings.iter().position(|&s| s == current)?;
            if let Some(found) = siblings[..index]
                .iter()
                .rev()
                .find_map(|&sibling| self.last_focusable_descendant(sibling))
            {
                return Some(found);
            }
            if self.is_tab_stop_candidate(parent) {
                return Some(parent);
            }
            current = parent;
        }
        self.last_focusable_descendant(current)
    }

    /// Where Tab moves the focus from `id`: the explicit link if it is still
    /// alive, otherwise the next view in tree order.
    pub fn next_tab_stop(&self, id: ViewId) -> Option<ViewId> {
        let linked = self.nodes.get(id)?.next_tab_stop.filter(|&next| self.contains(next));
        let stop = linked.or_else(|| self.next_focusable_view(id));
        trace!(target: targets::EVENT, ?id, ?stop, linked = linked.is_some(), "next tab stop");
        stop
    }

    pub fn set_next_tab_stop(&mut self, id: ViewId, next: Option<ViewId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.next_tab_stop = next;
        }
    }

    /// Where Shift+Tab moves the focus from `id`.
    pub fn previous_tab_stop(&self, id: ViewId) -> Option<ViewId> {
        self.nodes
            .get(id)?
            .previous_tab_stop
            .filter(|&previous| self.contains(previous))
            .or_else(|| self.previous_focusable_view(id))
    }

    pub fn set_previous_tab_stop(&mut self, id: ViewId, previous: Option<ViewId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.previous_tab_stop = previous;
        }
    }

    pub fn is_processing_tab_stop(&self, id: ViewId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.processing_tab_stop)
    }

    /// Views that consume Tab themselves (text editors) turn this off.
    pub fn set_processing_tab_stop(&mut self, id: ViewId, processing: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.processing_tab_stop = processing;
        }
    }
}
