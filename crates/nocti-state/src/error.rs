//! State container error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Api(#[from] nocti_api::ApiError),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type StateResult<T> = Result<T, StateError>;
