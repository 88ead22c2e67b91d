//! Error types for railfare

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for railfare operations
pub type Result<T> = std::result::Result<T, RailfareError>;

/// Main error type shared by the file-side pipeline
#[derive(Error, Debug)]
pub enum RailfareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot access '{path}': {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File name is not a yyyy-mm-dd date: {0}")]
    InvalidFileName(String),

    #[error("Route '{route}' cannot be used as a table name: {reason}")]
    InvalidRoute { route: String, reason: String },

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RailfareError {
    /// Wrap an I/O error with the path it happened on
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Create a response shape error
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
