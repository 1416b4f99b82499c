//! Process-level error type shared by startup, the runner and infrastructure setup.
//!
//! Request-scoped failures live in the service layer (`ServiceError`) and are
//! mapped to HTTP responses there; `AppError` is what `runner::run` returns.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(BoxError),

    #[error("Migration error: {0}")]
    Migration(BoxError),

    #[error("Media store error: {0}")]
    Media(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
