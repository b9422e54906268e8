//! Application errors.

use inkboard_core::StorageError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Script line {line}: {message}")]
    Script { line: usize, message: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Session is no longer running")]
    SessionClosed,
}

pub type AppResult<T> = Result<T, AppError>;
