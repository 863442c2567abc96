//! Error types for the query workbench.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for workbench operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkbenchError {
    /// User input rejected before anything is sent (e.g. empty query text).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The query service could not be reached or answered with a failure status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered, but the payload has none of the recognized shapes.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// An execution is already running.
    #[error("Busy: {0}")]
    Busy(String),

    /// Configuration errors (invalid config file, bad service URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (terminal setup, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkbenchError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a malformed-response error with the given message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Creates a busy error with the given message.
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Transport(_) => "Transport Error",
            Self::MalformedResponse(_) => "Malformed Response",
            Self::Busy(_) => "Busy",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::Transport(m)
            | Self::MalformedResponse(m)
            | Self::Busy(m)
            | Self::Config(m)
            | Self::Internal(m) => m,
        }
    }

    /// Returns true if this error ends an execution with a synthetic error result.
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::MalformedResponse(_))
    }
}

/// Result type alias using WorkbenchError.
pub type Result<T> = std::result::Result<T, WorkbenchError>;
