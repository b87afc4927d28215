//! Monitor application errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    State(#[from] nocti_state::StateError),
}

pub type AppResult<T> = Result<T, AppError>;
