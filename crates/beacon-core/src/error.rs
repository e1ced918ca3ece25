//! Error types for the Beacon backend

use thiserror::Error;

/// Main error type for all Beacon operations
#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{service} API error (status {status}): {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected {service} response: {message}")]
    UnexpectedResponse {
        service: &'static str,
        message: String,
    },

    /// A two-phase operation failed and its compensating step failed too
    #[error("{original}; rollback also failed: {rollback}")]
    RollbackFailed { original: String, rollback: String },
}

impl BeaconError {
    pub(crate) fn unexpected(service: &'static str, message: impl Into<String>) -> Self {
        BeaconError::UnexpectedResponse {
            service,
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for BeaconError {
    fn from(e: config::ConfigError) -> Self {
        BeaconError::Config(e.to_string())
    }
}

/// Result type for Beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;
