//! API error types and JSON error response formatting.
//!
//! ApiError gives the generic endpoints a consistent JSON error body.
//! The dashboard endpoints that report `status` in their payload use
//! [`StatusError`] instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tradewatch_core::error::TradewatchError;
use tradewatch_insight::InsightError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code ("bad_request", "internal_error").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<TradewatchError> for ApiError {
    fn from(err: TradewatchError) -> Self {
        match err {
            TradewatchError::Config(msg) => ApiError::BadRequest(msg),
            TradewatchError::Storage(msg) => ApiError::Internal(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// 500 response with a `{status: "error", message}` body.
#[derive(Debug)]
pub struct StatusError(pub String);

#[derive(Debug, Serialize)]
struct StatusErrorBody<'a> {
    status: &'static str,
    message: &'a str,
}

impl IntoResponse for StatusError {
    fn into_response(self) -> Response {
        let body = StatusErrorBody {
            status: "error",
            message: &self.0,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl From<TradewatchError> for StatusError {
    fn from(err: TradewatchError) -> Self {
        StatusError(err.to_string())
    }
}
