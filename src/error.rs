//! Sync error types with HTTP status code mapping.
//!
//! [`SyncError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and a structured JSON error body,
//! so trigger callers always receive JSON, never a bare transport failure.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses from the trigger endpoints follow this shape:
/// ```json
/// {
///   "success": false,
///   "error": "upstream returned HTTP 503 for bootstrap-static/",
///   "code": 5001
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false` for error bodies.
    pub success: bool,
    /// Human-readable error message.
    pub error: String,
    /// Numeric error code (see code ranges on [`SyncError`]).
    pub code: u32,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                 |
/// |-----------|------------|-----------------------------|
/// | 1000–1999 | Request    | 400 Bad Request / 401       |
/// | 2000–2999 | Not Found  | 404 Not Found               |
/// | 3000–3999 | Server     | 500 Internal Server Error   |
/// | 5000–5999 | Upstream   | 500 Internal Server Error   |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The upstream API answered with a non-success status.
    #[error("upstream returned HTTP {status} for {path}")]
    UpstreamHttp {
        /// HTTP status code returned by the upstream.
        status: u16,
        /// Relative resource path that was requested.
        path: String,
    },

    /// The upstream body was not valid JSON or did not match the expected shape.
    #[error("malformed upstream body for {path}: {message}")]
    UpstreamParse {
        /// Relative resource path that was requested.
        path: String,
        /// Parser error message.
        message: String,
    },

    /// The request never produced a response (connect failure, timeout, reset).
    #[error("upstream request for {path} failed: {message}")]
    UpstreamTransport {
        /// Relative resource path that was requested.
        path: String,
        /// Transport error message.
        message: String,
    },

    /// Read or write failure against the data store.
    #[error("storage error: {0}")]
    Storage(String),

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller-supplied secret did not match the configured one.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested stored data does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The whole sync did not finish within the configured deadline.
    #[error("sync did not complete within {0:?}")]
    DeadlineExceeded(Duration),
}

impl SyncError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized(_) => 1401,
            Self::NotFound(_) => 2001,
            Self::Storage(_) => 3001,
            Self::Config(_) => 3002,
            Self::DeadlineExceeded(_) => 3003,
            Self::UpstreamHttp { .. } => 5001,
            Self::UpstreamParse { .. } => 5002,
            Self::UpstreamTransport { .. } => 5003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamHttp { .. }
            | Self::UpstreamParse { .. }
            | Self::UpstreamTransport { .. }
            | Self::Storage(_)
            | Self::Config(_)
            | Self::DeadlineExceeded(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.error_code(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
