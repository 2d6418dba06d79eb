//! Result and error types for Sospechar.

use thiserror::Error;

/// Result type for Sospechar operations
pub type SospecharResult<T> = Result<T, SospecharError>;

/// Errors that can occur in Sospechar
#[derive(Debug, Error)]
pub enum SospecharError {
    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// A run id was committed twice
    #[error("Duplicate run: run id {run_id} is already committed")]
    DuplicateRun {
        /// The offending run id
        run_id: u32,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SospecharError {
    /// Create an invalid-state error with the given message
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}
