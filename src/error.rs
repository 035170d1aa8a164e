//! Error types for allocation, training, and model storage.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The error type for all u-allot operations.
#[derive(Debug, Error)]
pub enum AllotError {
    /// No classifier artifact exists yet. Retryable.
    #[error("Model not ready: no artifact at {} (waited {waited_ms}ms)", path.display())]
    NotReady { path: PathBuf, waited_ms: u64 },

    /// Task data or artifact is incompatible with the feature schema.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Caller-supplied input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The classifier could not produce a prediction.
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// The persisted artifact could not be read or is corrupt.
    #[error("Artifact error at {}: {reason}", path.display())]
    Artifact { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AllotError {
    /// Whether the caller may retry the same request later and expect success.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}

/// Result type alias using [`AllotError`].
pub type Result<T> = std::result::Result<T, AllotError>;
