//! Error types for the Rotary backend client.

use rotary_core::CoreError;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Server answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required but no (valid) token configured
    #[error("Authentication required")]
    AuthRequired,

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl ServerClientError {
    /// Classify a transport error
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::ServerUnreachable(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

impl From<ServerClientError> for CoreError {
    fn from(e: ServerClientError) -> Self {
        match e {
            ServerClientError::Request(e) => CoreError::network(e.to_string()),
            ServerClientError::ServerUnreachable(msg) => CoreError::network(msg),
            ServerClientError::ServerError { status, message } => {
                CoreError::Status { status, message }
            }
            ServerClientError::NotFound(what) => CoreError::not_found("resource", what),
            ServerClientError::AuthRequired => {
                CoreError::Unavailable("authentication required".into())
            }
            ServerClientError::InvalidUrl(msg) => CoreError::Unavailable(msg),
            ServerClientError::ParseError(msg) => CoreError::InvalidData(msg),
        }
    }
}

/// Result type for server client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;
