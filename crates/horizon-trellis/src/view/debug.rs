//! Text dumps of a view subtree.
//!
//! ```
//! use horizon_trellis::{ViewTree, ViewTreeDebug};
//! use horizon_trellis_core::TreeFormatOptions;
//!
//! let mut tree = ViewTree::new();
//! let root = tree.create_view();
//! let child = tree.create_view();
//! tree.set_name(root, "root");
//! tree.set_name(child, "label");
//! tree.add_child(root, child).unwrap();
//!
//! let dump = ViewTreeDebug::with_options(TreeFormatOptions::minimal()).format_subtree(&tree, root);
//! assert_eq!(dump, "root\n\u{2514}\u{2500}\u{2500} label\n");
//! ```

use std::fmt::Write as FmtWrite;

use horizon_trellis_core::TreeFormatOptions;

use super::node::{ViewId, Visibility};
use super::tree::ViewTree;

/// Formats view subtrees according to [`TreeFormatOptions`].
#[derive(Debug, Clone, Default)]
pub struct ViewTreeDebug {
    options: TreeFormatOptions,
}

impl ViewTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// One line per view, children indented under their parent. Scroll
    /// bars are listed under their owner after its children.
    pub fn format_subtree(&self, tree: &ViewTree, root: ViewId) -> String {
        let mut output = String::new();
        if tree.contains(root) {
            self.format_into(tree, root, 0, true, &mut output);
        } else {
            let _ = writeln!(output, "(missing view {root:?})");
        }
        output
    }

    fn format_into(&self, tree: &ViewTree, id: ViewId, depth: usize, is_last: bool, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let Some(node) = tree.nodes.get(id) else {
            return;
        };

        output.push_str(&self.options.prefix(depth, is_last));
        output.push_str(node.name.as_deref().unwrap_or("(unnamed)"));
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        if self.options.show_frames {
            let f = node.frame;
            let _ = write!(output, " ({}, {}, {}, {})", f.left, f.top, f.right, f.bottom);
        }
        match node.visibility {
            Visibility::Visible => {}
            Visibility::Hidden => output.push_str(" hidden"),
            Visibility::Gone => output.push_str(" gone"),
        }
        if !node.enabled {
            output.push_str(" disabled");
        }
        if node.focused {
            output.push_str(" focused");
        }
        if self.options.show_attributes {
            let blocks = [
                ("layout", node.layout.is_some()),
                ("transform", node.transform.is_some()),
                ("draw", node.draw.is_some()),
                ("scroll", node.scroll.is_some()),
                ("scroll-bar", node.scroll_bar.is_some()),
                ("animation", node.animation.is_some()),
                ("instance", node.instance.is_some()),
            ];
            let present: Vec<&str> = blocks.iter().filter(|(_, on)| *on).map(|(name, _)| *name).collect();
            if !present.is_empty() {
                let _ = write!(output, " {{{}}}", present.join(", "));
            }
        }
        output.push('\n');

        let mut children = node.children.clone();
        children.extend(tree.scroll_bars(id));
        let count = children.len();
        for (index, child) in children.into_iter().enumerate() {
            self.format_into(tree, child, depth + 1, index + 1 == count, output);
        }
    }
}

#[cfg(test)]
mod tests {
    use horizon_trellis_core::TreeStyle;
    use horizon_trellis_render::Rect;

    use super::*;

    fn sample() -> (ViewTree, ViewId, ViewId) {
        let mut tree = ViewTree::new();
        let root = tree.create_view();
        let a = tree.create_view();
        let b = tree.create_view();
        tree.set_name(root, "root");
        tree.set_name(a, "a");
        tree.set_name(b, "b");
        tree.set_frame(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        tree.add_child(root, a).unwrap();
        tree.add_child(a, b).unwrap();
        (tree, root, b)
    }

    #[test]
    fn test_ascii_dump() {
        let (mut tree, root, b) = sample();
        tree.set_enabled(b, false, false);
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        };
        let dump = ViewTreeDebug::with_options(options).format_subtree(&tree, root);
        assert_eq!(dump, "root\n`-- a\n|  `-- b disabled\n");
    }

    #[test]
    fn test_max_depth_and_frames() {
        let (tree, root, _) = sample();
        let options = TreeFormatOptions {
            show_ids: false,
            max_depth: Some(0),
            ..Default::default()
        };
        let dump = ViewTreeDebug::with_options(options).format_subtree(&tree, root);
        assert_eq!(dump, "root (0, 0, 100, 100)\n");
    }

    #[test]
    fn test_attributes_listed() {
        let (mut tree, root, _) = sample();
        tree.set_content_size(root, 100.0, 400.0, false);
        let dump = ViewTreeDebug::with_options(TreeFormatOptions::detailed()).format_subtree(&tree, root);
        let first = dump.lines().next().unwrap_or_default();
        assert!(first.contains("scroll"), "{first}");
    }
}
