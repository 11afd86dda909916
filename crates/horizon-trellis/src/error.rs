//! Error types for structural view tree operations.
//!
//! Most of the engine degrades silently: getters on a stale id return the
//! documented default and setters do nothing. Only the operations a caller
//! may reasonably want to check report a [`ViewError`].

use thiserror::Error;

use crate::view::ViewId;

/// Errors reported by child management.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// The id does not name a live view.
    #[error("view {0:?} does not exist")]
    ViewNotFound(ViewId),

    /// `child` is not in `parent`'s child list.
    #[error("view {child:?} is not a child of {parent:?}")]
    NotAChild { parent: ViewId, child: ViewId },

    /// Adding `child` under `parent` would make a view its own ancestor.
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { parent: ViewId, child: ViewId },

    /// The view already belongs to another parent.
    #[error("view {0:?} already has a parent")]
    AlreadyHasParent(ViewId),
}

/// Result type for view tree operations.
pub type ViewResult<T> = Result<T, ViewError>;
