//! Error types for genzen-server
//!
//! Defines the service error type using thiserror and maps the taxonomy onto
//! HTTP statuses for the API layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Main error type for genzen-server
#[derive(Error, Debug)]
pub enum Error {
    /// Backing-store failure; retryable by the caller, never retried here
    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller does not own the target
    #[error("Access denied: {0}")]
    PermissionDenied(String),

    /// Malformed request input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing or unverifiable bearer token
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Upstream script generation failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Speech synthesis failed or unsupported
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the genzen-server Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<genzen_common::Error> for Error {
    fn from(err: genzen_common::Error) -> Self {
        use genzen_common::Error as Common;
        match err {
            Common::Database(e) => Error::Database(e),
            Common::Io(e) => Error::Io(e),
            Common::Config(msg) => Error::Config(msg),
            Common::NotFound(msg) => Error::NotFound(msg),
            Common::PermissionDenied(msg) => Error::PermissionDenied(msg),
            Common::InvalidArgument(msg) => Error::InvalidArgument(msg),
            Common::Unauthenticated(msg) => Error::Unauthenticated(msg),
            Common::Generation(msg) => Error::Generation(msg),
            Common::Synthesis(msg) => Error::Synthesis(msg),
            Common::Internal(msg) => Error::Internal(msg),
        }
    }
}

/// JSON error body returned to clients
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Database(_)
            | Error::Io(_)
            | Error::Config(_)
            | Error::Generation(_)
            | Error::Synthesis(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                Error::PermissionDenied("x".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                Error::InvalidArgument("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::Unauthenticated("x".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                Error::Generation("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::Synthesis("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
