//! Prelude module for Horizon Trellis.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use horizon_trellis::prelude::*;
//!
//! let mut tree = ViewTree::new();
//! let root = tree.create_group();
//! tree.set_frame(root, Rect::new(0.0, 0.0, 64.0, 64.0), false);
//! tree.set_background_color(root, Color::GRAY, false);
//! tree.dispatch_mouse_event(root, &mut UiEvent::mouse(UiAction::MouseMove, 1.0, 1.0));
//! ```
//!
//! This provides access to:
//! - The view arena (`ViewTree`, `ViewId`) and its configuration
//! - Behavior hooks (`ViewHandler`, `ViewListener`)
//! - Input events (`UiEvent`, `UiAction`, `Keycode`)
//! - Geometry and painting types (`Point`, `Size`, `Rect`, `Color`, `Canvas`)

// ============================================================================
// View Arena
// ============================================================================

pub use crate::config::ViewTreeConfig;
pub use crate::error::{ViewError, ViewResult};
pub use crate::view::{ViewId, ViewTree, ViewTreeDebug};

// ============================================================================
// Behavior
// ============================================================================

pub use crate::view::{ClickCallback, ViewHandler, ViewListener};

// ============================================================================
// Layout and Appearance
// ============================================================================

pub use crate::view::{BoundShape, Edges, PositionMode, SizeMode, Visibility};

// ============================================================================
// Input
// ============================================================================

pub use crate::view::{KeyboardModifiers, Keycode, TouchPoint, UiAction, UiEvent};

// ============================================================================
// Platform
// ============================================================================

pub use crate::view::{AttachMode, PlatformFactory, ViewInstance};

// ============================================================================
// Geometry and Painting
// ============================================================================

pub use horizon_trellis_render::{Canvas, Color, Point, Rect, Size, Transform2D};
