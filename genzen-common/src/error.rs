//! Common error types for GenZen

use thiserror::Error;

/// Common result type for GenZen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the GenZen crates
///
/// Every failure is scoped to the triggering request; nothing here is fatal
/// to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// Backing-store operation failed (wraps sqlx::Error, retryable by caller)
    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller does not own the target
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Malformed input, e.g. an out-of-range rating
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing or unverifiable bearer token
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Script generation failed (upstream model error)
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Speech synthesis failed or unsupported
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
