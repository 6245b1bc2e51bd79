//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::discovery::DiscoveryError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Discovery(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Discovery(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn retryable(&self) -> bool {
        matches!(self, AppError::Discovery(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Gateway details stay in the logs.
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Discovery(e) => {
                tracing::error!(error = %e, source = %e.gateway_error(), "venue listing failed");
                "failed to load venues".to_string()
            }
            AppError::BadRequest(_) => self.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "retryable": self.retryable(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
