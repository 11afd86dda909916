//! Horizon Trellis - a retained-mode view engine.
//!
//! The engine keeps a hierarchy of rectangular views and does four things
//! with it:
//!
//! - **Layout**: a relative solver that sizes views as fixed, filling or
//!   wrapping, and pins edges to the parent or to siblings
//! - **Transforms**: translation, scale and rotation around the view's
//!   center, layered as static and animated components
//! - **Drawing**: painting subtrees onto a [`Canvas`](render::Canvas) with
//!   dirty-rectangle invalidation and optional off-screen layers
//! - **Input**: hit-tested pointer and touch routing with capture, hover and
//!   multi-touch; key routing along the focus chain; content scrolling
//!
//! Windows, native widgets and rasterization belong to the host. It plugs in
//! through [`ViewInstance`] and [`PlatformFactory`], and through the
//! [`Canvas`](render::Canvas) trait.
//!
//! # Example
//!
//! ```
//! use horizon_trellis::{UiAction, UiEvent, ViewTree};
//! use horizon_trellis::render::Rect;
//!
//! let mut tree = ViewTree::new();
//! let root = tree.create_group();
//! tree.set_frame(root, Rect::new(0.0, 0.0, 320.0, 240.0), false);
//!
//! let button = tree.create_view();
//! tree.set_size(button, 80.0, 24.0, false);
//! tree.set_center_in_parent(button);
//! tree.add_child(root, button).unwrap();
//! tree.make_layout(root);
//! assert_eq!(tree.frame(button), Rect::new(120.0, 108.0, 200.0, 132.0));
//!
//! tree.set_occurring_click(button, true);
//! tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::LeftButtonDown, 150.0, 120.0));
//! assert!(tree.is_pressed_state(button));
//! ```
//!
//! # Threading
//!
//! A [`ViewTree`] belongs to the UI thread. Other threads post closures
//! through [`ViewTree::ui_handle`]; they run when the UI thread calls
//! [`ViewTree::process_pending`].
//!
//! # Logging
//!
//! Subsystems log through `tracing` under the targets in
//! [`horizon_trellis_core::logging::targets`]. [`ViewTreeDebug`] renders a
//! subtree as text.

pub mod config;
pub mod error;
pub mod prelude;
pub mod view;

/// The geometry and canvas types the engine draws with.
pub mod render {
    pub use horizon_trellis_render::*;
}

pub use config::ViewTreeConfig;
pub use error::{ViewError, ViewResult};
pub use horizon_trellis_core::{
    PerfSpan, ThreadAffinity, TreeFormatOptions, TreeStyle, UiHandle, is_ui_thread, set_ui_thread,
};
pub use view::{
    AnimationDriver, AnimationProperty, AnimationTarget, AnimationTargetList, AnimationValue, AttachMode,
    BoundShape, ClickCallback, DefaultHandler, Edges, HeadlessInstance, HeadlessPlatform, KeyboardModifiers,
    Keycode, PlatformFactory, PositionMode, PrepareLayoutParam, ScrollBarHandler, SizeMode, TouchPhase,
    TouchPoint, UiAction, UiEvent, ViewHandler, ViewId, ViewInstance, ViewListener, ViewTree, ViewTreeDebug,
    Visibility, same_instance,
};
