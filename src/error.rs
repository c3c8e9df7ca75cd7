use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("weather request failed: {0}")]
    Weather(#[from] reqwest::Error),

    #[error("weather response is missing {0}")]
    IncompleteWeather(&'static str),

    #[error("record not found")]
    NotFound,

    #[error("authentication required")]
    Unauthenticated,

    #[error("snapshot io failed: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    SnapshotEncoding(#[from] serde_json::Error),

    /// Generic failure surfaced to clients once the cause has been logged.
    #[error("{message}")]
    Failed { message: &'static str, upstream: bool },
}

impl AppError {
    /// Collapses internal failures into a generic message. Client errors pass through.
    pub fn generalize(self, message: &'static str) -> Self {
        match self {
            AppError::InvalidInput(_)
            | AppError::NotFound
            | AppError::Unauthenticated
            | AppError::Failed { .. } => self,
            AppError::Weather(_) | AppError::IncompleteWeather(_) => {
                AppError::Failed { message, upstream: true }
            }
            AppError::SnapshotIo(_) | AppError::SnapshotEncoding(_) => {
                AppError::Failed { message, upstream: false }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Weather(_) | AppError::IncompleteWeather(_) => StatusCode::BAD_GATEWAY,
            AppError::Failed { upstream: true, .. } => StatusCode::BAD_GATEWAY,
            AppError::Failed { upstream: false, .. }
            | AppError::SnapshotIo(_)
            | AppError::SnapshotEncoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
