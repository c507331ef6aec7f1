//! # AppError
//!
//! Centralized error handling for the Tabula ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all tb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post, Task, View)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., empty view name)
    #[error("validation error: {0}")]
    Validation(String),

    /// A view with this name already exists. Kept as its own variant so the
    /// action boundary can surface a targeted message instead of a generic one.
    #[error("a view with the name \"{0}\" already exists")]
    DuplicateName(String),

    /// Infrastructure failure (e.g., DB down, constraint violation)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Tabula logic.
pub type Result<T> = std::result::Result<T, AppError>;
