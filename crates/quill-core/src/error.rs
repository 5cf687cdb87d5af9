//! # AppError
//!
//! Centralized error handling for the Quill ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all quill-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found, or hidden by the visibility tier. The message is
    /// what the caller sees; it never reveals which of the two applied.
    #[error("{0}")]
    NotFound(String),

    /// Validation failure (e.g., title too long, missing openId)
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller lacks the role an operation requires
    #[error("{0}")]
    Forbidden(String),

    /// A mutation was attempted with no database configured
    #[error("database not available")]
    StoreUnavailable,

    /// Infrastructure failure (e.g., DB down mid-query)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Quill logic.
pub type Result<T> = std::result::Result<T, AppError>;
