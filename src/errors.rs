use axum::http::StatusCode;
use thiserror::Error;

pub const UNAVAILABLE_MESSAGE: &str =
    "Error connecting to the database. Run `demand_planner seed` first.";

#[derive(Debug, Error)]
pub enum StorageError {
    /// Missing file, failed connection or missing table.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(reason) => {
                tracing::warn!(%reason, "storage unavailable");
                Self::unavailable()
            }
            other => {
                tracing::error!(error = %other, "storage failure");
                Self::internal(other)
            }
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
