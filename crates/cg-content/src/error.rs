//! Error types for the content adapter.

use std::time::Duration;

use thiserror::Error;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Why a generative call produced no usable content.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// No provider is configured.
    #[error("no content provider configured")]
    Unavailable,

    /// The provider did not answer in time.
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    /// The provider refused the request because of rate limits.
    #[error("provider rate limited: {0}")]
    RateLimited(String),

    /// The provider failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// The response was not the expected JSON document.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A required field was absent.
    #[error("response missing field '{0}'")]
    MissingField(&'static str),

    /// A field was present but out of range or unknown.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}
