/// Core error types for Rotary Player
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors reported by collaborators (fetchers, reporters)
#[derive(Error, Debug)]
pub enum CoreError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Playlist has no track matching the filters
    #[error("No eligible track in playlist: {0}")]
    EmptyPlaylist(String),

    /// Transport-level failure (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Backend answered with something we could not interpret
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Collaborator is not available (e.g. missing credentials)
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl CoreError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Whether retrying the same request later can succeed
    ///
    /// The scheduler retries every failed fill, but only keeps a forced
    /// playlist pick across the retry when the failure is transient.
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Network(_) => true,
            CoreError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
