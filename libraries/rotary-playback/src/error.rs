//! Error types for queue management

use thiserror::Error;

/// Queue and scheduler errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Index does not address a queue entry
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// A collaborator fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] rotary_core::CoreError),
}

impl PlaybackError {
    /// Whether a later retry of the same fetch can succeed
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::Fetch(e) => e.is_transient(),
            PlaybackError::IndexOutOfBounds(_) => false,
        }
    }
}

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
