//! Error types for the render crate.

use thiserror::Error;

/// Errors that can occur while allocating or using drawing surfaces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Zero width or height.
    #[error("invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Larger than the surface limit.
    #[error("layer of {width}x{height} exceeds the {max}x{max} limit")]
    LayerTooLarge { width: u32, height: u32, max: u32 },

    /// The pixel buffer could not be allocated.
    #[error("failed to allocate {width}x{height} pixel buffer")]
    AllocationFailed { width: u32, height: u32 },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
