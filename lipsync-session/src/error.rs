//! Error types for the session layer

use lipsync_client::ClientError;
use thiserror::Error;

use crate::scheduler::SchedulerError;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// A request rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please write a script before generating a video")]
    EmptyScript,

    #[error("Unknown presenter '{0}'")]
    UnknownPresenter(String),
}

/// Errors returned by [`crate::SessionController`]
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a submission is already in flight")]
    AlreadyInFlight,

    /// The backend could not be reached or refused the submission
    #[error("{message}")]
    Submission {
        /// User-facing message, also stored as the session's last error
        message: String,
        #[source]
        source: ClientError,
    },

    /// The session was reset while the submission was in flight
    #[error("session was reset before the submission completed")]
    Superseded,

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Errors found while validating [`crate::Config`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("api_url cannot be empty")]
    EmptyApiUrl,

    #[error("api_url must start with http:// or https://")]
    InvalidApiUrl,

    #[error("{0} must be greater than 0")]
    ZeroDuration(&'static str),
}
