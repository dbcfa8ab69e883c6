use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::ProductId;

/// AppError
///
/// Every failure a request can end in. Each variant maps to exactly one HTTP status.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    /// Token missing, malformed, or failing verification.
    #[error("invalid or missing access token")]
    InvalidToken,

    /// Token verified, but the subject lacks the role the operation requires.
    #[error("insufficient role for this operation")]
    Forbidden,

    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Persistence failure from a backing database.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            // 401 covers the missing-role case as well.
            AppError::InvalidToken | AppError::Forbidden => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Database details stay in the logs.
            AppError::Storage(detail) => {
                tracing::error!(error = %detail, "storage failure");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
