//! Error types for Horizon Trellis core services.

use std::fmt;

/// Errors raised by the core services.
///
/// The view engine itself degrades silently; these errors only surface from
/// the plumbing around it. Calls from the wrong thread are re-posted or
/// panic, they never come back as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrellisError {
    /// The UI queue that a handle posts into has been dropped.
    QueueDisconnected,
}

impl fmt::Display for TrellisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueDisconnected => {
                write!(f, "The UI queue has been dropped; the task was discarded")
            }
        }
    }
}

impl std::error::Error for TrellisError {}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, TrellisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(TrellisError::QueueDisconnected.to_string().contains("UI queue"));
    }
}
