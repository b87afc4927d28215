//! Error types for nocti-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid error kind: {0}")]
    InvalidErrorKind(String),

    #[error("Invalid live mode: {0}")]
    InvalidLiveMode(String),

    #[error("Invalid view mode: {0}")]
    InvalidViewMode(String),

    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    #[error("Invalid sort field: {0}")]
    InvalidSortField(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
