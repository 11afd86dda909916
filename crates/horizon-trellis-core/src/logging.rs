//! Logging and debugging facilities for Horizon Trellis.
//!
//! The engine is instrumented with the `tracing` crate. Nothing is printed
//! unless the host installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_trellis::layout=trace")
//!     .init();
//! ```
//!
//! Per-subsystem targets live in [`targets`]. Tree dumps are configured with
//! [`TreeFormatOptions`] and produced by the view crate's `ViewTreeDebug`.

/// Span names used by the instrumented passes.
pub mod span_names {
    /// A make-layout pass over a subtree.
    pub const MAKE_LAYOUT: &str = "horizon_trellis::make_layout";
    /// A paint pass over a subtree.
    pub const DISPATCH_DRAW: &str = "horizon_trellis::dispatch_draw";
    /// Routing of one input event.
    pub const DISPATCH_EVENT: &str = "horizon_trellis::dispatch_event";
}

/// Target names for log filtering.
pub mod targets {
    /// Core services.
    pub const CORE: &str = "horizon_trellis_core";
    /// UI-thread dispatch queue.
    pub const DISPATCH: &str = "horizon_trellis::dispatch";
    /// Tree structure: creation, children, destruction.
    pub const TREE: &str = "horizon_trellis::tree";
    /// Layout solver.
    pub const LAYOUT: &str = "horizon_trellis::layout";
    /// Draw pipeline and invalidation.
    pub const DRAW: &str = "horizon_trellis::draw";
    /// Input routing.
    pub const EVENT: &str = "horizon_trellis::event";
    /// Scroll controller.
    pub const SCROLL: &str = "horizon_trellis::scroll";
    /// Platform instance attachment.
    pub const ATTACH: &str = "horizon_trellis::attach";
    /// Timing spans.
    pub const PERF: &str = "horizon_trellis::perf";
}

/// Branch characters used by tree dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// `|` and `+--`.
    Ascii,
    /// Box-drawing characters.
    #[default]
    Unicode,
    /// A dash per level, no vertical rules.
    Compact,
}

impl TreeStyle {
    /// The (vertical rule, branch, last branch) strings for this style.
    pub fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Ascii => ("|", "+-- ", "`-- "),
            Self::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            Self::Compact => ("", "- ", "- "),
        }
    }
}

/// What a tree dump shows for each node.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// Branch style.
    pub style: TreeStyle,
    /// Show the arena id.
    pub show_ids: bool,
    /// Show the frame rectangle.
    pub show_frames: bool,
    /// Show which optional attribute blocks are allocated.
    pub show_attributes: bool,
    /// Stop descending below this depth.
    pub max_depth: Option<usize>,
    /// Spaces per nesting level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_frames: true,
            show_attributes: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Everything switched on.
    pub fn detailed() -> Self {
        Self {
            show_attributes: true,
            ..Default::default()
        }
    }

    /// Names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_frames: false,
            show_attributes: false,
            ..Default::default()
        }
    }

    /// The prefix drawn before a node at `depth`.
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }
        let (rule, branch, last) = self.style.glyphs();
        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(rule);
            prefix.extend(std::iter::repeat_n(' ', self.indent_size));
        }
        prefix.push_str(if is_last { last } else { branch });
        prefix
    }
}

/// Emits an `info` span for as long as the guard lives.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a span named after `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_trellis::perf", "perf", operation);
        Self {
            _span: span.entered(),
        }
    }
}

#[macro_export]
macro_rules! trellis_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_trellis_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! trellis_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_trellis_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! trellis_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "horizon_trellis_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! trellis_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_trellis_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! trellis_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "horizon_trellis_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_root_is_empty() {
        let options = TreeFormatOptions::default();
        assert_eq!(options.prefix(0, true), "");
    }

    #[test]
    fn test_prefix_ascii() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        assert_eq!(options.prefix(1, false), "+-- ");
        assert_eq!(options.prefix(1, true), "`-- ");
        assert_eq!(options.prefix(2, true), "|  `-- ");
    }

    #[test]
    fn test_minimal_options() {
        let options = TreeFormatOptions::minimal();
        assert!(!options.show_ids);
        assert!(!options.show_frames);
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
        trellis_trace!("inside perf span");
    }
}
