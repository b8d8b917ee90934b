//! Maps domain `AppError` to HTTP responses.
//!
//! Authentication failures surface uniformly as 401 with a constant body
//! so callers cannot distinguish which check failed; the specific kind is
//! kept in internal logs only. Configuration errors surface as 500; they
//! indicate a deployment bug, not client behavior.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use guardpost_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;

        if err.kind.is_authentication() {
            // Signature failures may indicate tampering or a stale key
            // rollout and are logged distinctly from routine rejections.
            if err.kind == ErrorKind::InvalidSignature {
                tracing::warn!(kind = %err.kind, error = %err.message, "Token signature rejected");
            } else {
                tracing::debug!(kind = %err.kind, error = %err.message, "Authentication rejected");
            }

            let body = ApiErrorResponse {
                error: "UNAUTHENTICATED".to_string(),
                message: "Authentication required".to_string(),
            };
            return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        }

        let (status, code) = match err.kind {
            ErrorKind::UnknownGuard | ErrorKind::NoActiveGuard | ErrorKind::Configuration => {
                tracing::error!(kind = %err.kind, error = %err.message, "Guard misconfiguration");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            ErrorKind::Store => {
                tracing::error!(error = %err.message, "Revocation store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            _ => {
                tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ApiErrorResponse {
            error: code.to_string(),
            message: "Request could not be processed".to_string(),
        };
        (status, Json(body)).into_response()
    }
}
