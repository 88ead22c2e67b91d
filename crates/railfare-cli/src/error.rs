//! Error types for the railfare CLI
//!
//! Messages are user-facing and say what to check next.

use railfare_common::RailfareError;
use railfare_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Pipeline configuration is missing or invalid
    #[error("Configuration error: {0}. Check RAILFARE_* environment variables and the routes file.")]
    Config(String),

    /// File-side pipeline failed before any file was processed
    #[error("Pipeline error: {0}")]
    Pipeline(#[source] RailfareError),

    /// Database configuration is missing or the database is unreachable
    #[error("Database error: {0}. Check DATABASE_URL and that PostgreSQL is running.")]
    Database(#[from] StoreError),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<RailfareError> for CliError {
    fn from(err: RailfareError) -> Self {
        match err {
            RailfareError::Config(msg) => Self::Config(msg),
            e @ RailfareError::InvalidRoute { .. } => Self::Config(e.to_string()),
            other => Self::Pipeline(other),
        }
    }
}
