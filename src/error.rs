//! Error types for the tool validator

use std::io;

use thiserror::Error;

/// Result type alias for the tool validator
pub type Result<T> = std::result::Result<T, Error>;

/// Tool validator errors
///
/// The validation path itself never produces these: every outcome of
/// checking a call is carried by a [`crate::ValidationVerdict`]. Errors only
/// surface from configuration, rule compilation and the inspection entry
/// points.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed arguments supplied to an inspection entry point
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Host tool not registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns `true` if the error was caused by caller-supplied input rather
    /// than by the validator or its environment.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidArguments(_) | Self::Json(_))
    }
}
