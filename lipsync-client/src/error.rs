//! Error types for the studio client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the studio backend
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection refused, timeout, TLS, ...)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Best available description of the failure
        message: String,
        /// The `detail` field of the error body, when the backend sent one
        detail: Option<String>,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request was rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code, message and optional detail
    pub fn api_error(status: u16, message: impl Into<String>, detail: Option<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
            detail,
        }
    }

    /// The backend's own explanation of the failure, if it gave one
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::ApiError { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}
