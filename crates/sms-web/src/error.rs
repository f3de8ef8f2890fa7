//! Error types for the SMS web server.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use compliance::ComplianceError;
use thiserror::Error;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum WebError {
    /// Compliance layer error.
    #[error(transparent)]
    Compliance(#[from] ComplianceError),

    /// Caller input was unusable.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or wrong bearer token.
    #[error("Unauthorized")]
    Unauthorized,
}

impl WebError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Compliance(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            WebError::Compliance(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            WebError::Unauthorized => {
                tracing::warn!("Unauthorized request");
                self.to_string()
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "Request failed");
                // Internals stay in the log.
                "Something went wrong. Please try again.".to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        WebError::BadRequest(rejection.body_text())
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, WebError>;
