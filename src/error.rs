use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level error taxonomy. Everything renders as a structured
/// `{"error": true, "message": ...}` body; no variant is fatal to the process.
///
/// `Conflict` and `InvalidCredentials` answer 400 rather than 409/401 to keep
/// the wire contract the frontend already speaks.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Unauthorized.")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::Conflict(_)
            | ApiError::InvalidCredentials(_)
            | ApiError::UnsupportedMediaType(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Internals are logged, never leaked.
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "Something went wrong.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": true, "message": message }))).into_response()
    }
}
