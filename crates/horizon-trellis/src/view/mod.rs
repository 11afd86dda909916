//! The view engine.
//!
//! Everything lives in a [`ViewTree`]: an arena of views addressed by
//! [`ViewId`]. A view starts small, just a name, a frame, flags and its
//! hierarchy links. Optional attribute blocks are allocated the first time a
//! concern is touched:
//!
//! - layout: size modes, relative edges, margins and the measured size
//! - transform: static and animated translation, scale, rotation and anchor
//! - draw: background, border, bound shape, alpha and off-screen layer
//! - scroll: content size, scroll offset and scroll bars
//! - animation: the drivers currently animating the view
//!
//! # Behavior
//!
//! Views customize behavior through a [`ViewHandler`] (hooks that run with
//! `&mut ViewTree`) and applications observe them through a
//! [`ViewListener`]. The handler runs first.
//!
//! ```
//! use horizon_trellis::{ViewHandler, ViewId, ViewTree};
//! use horizon_trellis_render::{Canvas, Color, Rect};
//!
//! struct Swatch(Color);
//!
//! impl ViewHandler for Swatch {
//!     fn on_draw(&mut self, tree: &mut ViewTree, id: ViewId, canvas: &mut dyn Canvas) {
//!         canvas.fill_rect(tree.bounds(id), self.0);
//!     }
//! }
//!
//! let mut tree = ViewTree::new();
//! let swatch = tree.create_view_with_handler(Box::new(Swatch(Color::RED)));
//! tree.set_frame(swatch, Rect::new(0.0, 0.0, 16.0, 16.0), false);
//! ```
//!
//! # Coordinate systems
//!
//! - **Local**: origin at the view's top-left corner
//! - **Parent**: the parent's local space; the view's frame offset and its
//!   transform (about the view's center) map between the two
//! - **Screen**: resolved through the nearest platform instance
//!
//! # Platform instances
//!
//! A view can be bound to a [`ViewInstance`] supplied by the host. Such a
//! view is drawn and invalidated by its instance, and its subtree is skipped
//! by the parent's drawing and input routing. [`HeadlessInstance`] and
//! [`HeadlessPlatform`] keep everything in memory.

mod animation;
mod attach;
mod debug;
mod draw;
mod events;
mod focus;
mod hooks;
mod instance;
mod layout;
mod node;
mod relative_bound;
mod router;
mod scroll;
mod transform;
mod tree;

#[cfg(test)]
mod tests;

pub use animation::{AnimationDriver, AnimationProperty, AnimationTarget, AnimationTargetList, AnimationValue};
pub use debug::ViewTreeDebug;
pub use events::{KeyboardModifiers, Keycode, TouchPhase, TouchPoint, UiAction, UiEvent};
pub use hooks::{ClickCallback, DefaultHandler, ViewHandler, ViewListener};
pub use instance::{HeadlessInstance, HeadlessPlatform, PlatformFactory, ViewInstance, same_instance};
pub use layout::PrepareLayoutParam;
pub use node::{AttachMode, BoundShape, Edges, PositionMode, SizeMode, ViewId, Visibility};
pub use scroll::ScrollBarHandler;
pub use tree::ViewTree;
