//! Error types for the household assistant client
//!
//! This module defines the error kinds the client can raise, using
//! `thiserror` for the enum and `anyhow` for propagation.

use thiserror::Error;

/// Main error type for household assistant operations
///
/// Gateway failures (`Transport`, `Server`, `UnexpectedStage`) are recovered
/// by the controllers into a visible message. `Validation` is raised before
/// any request is sent.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced a usable response (connection refused,
    /// DNS failure, body could not be read or decoded)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status
    #[error("Server error {status}: {message}")]
    Server {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// A step response carried a stage the client does not know
    #[error("Unexpected stage: {0}")]
    UnexpectedStage(String),

    /// Client-side validation refused to submit
    #[error("Validation error: {0}")]
    Validation(String),

    /// A controller operation was called in a state that does not allow it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Line editor errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl AssistantError {
    /// Returns true for failures that happened on the way to or from the backend
    pub fn is_gateway_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Server { .. } | Self::UnexpectedStage(_)
        )
    }
}

/// Result type alias for household assistant operations
///
/// Uses `anyhow::Error` so callers can attach context while the
/// `AssistantError` kind stays available through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

/// Render an error for the user, preferring the `AssistantError` message
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AssistantError>() {
        Some(AssistantError::Server { message, .. }) if !message.is_empty() => message.clone(),
        Some(kind) => kind.to_string(),
        None => err.to_string(),
    }
}
