//! API error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401/403 on an authenticated call.
    #[error("Unauthorized: invalid or missing admin token")]
    Unauthorized,

    /// An authenticated call was attempted with no token configured.
    /// Raised before any network I/O.
    #[error("Admin token required")]
    MissingToken,

    /// Non-2xx response outside the unauthorized cases.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Client-side input validation, rejected before any network call.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
