//! Error types.

use thiserror::Error;

/// Gestures the controller rejects or downgrades.
///
/// None of these reach the caller: the controller logs them and reports
/// only the redraw they imply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("invalid gesture: {0}")]
    InvalidGesture(&'static str),
    #[error("text session finalized with no content")]
    EmptyCommit,
    #[error("no background loaded; using natural coordinates from the origin")]
    MissingBackground,
}

/// Errors raised while validating input handed to the core by a loader.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("background has zero size ({width}x{height})")]
    EmptyBackground { width: u32, height: u32 },
    #[error("background buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
