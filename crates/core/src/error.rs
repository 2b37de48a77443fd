//! Deterministic business failures shared by every domain module.

use thiserror::Error;

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// A business-rule failure raised by an aggregate or value object.
///
/// Infrastructure failures (storage, concurrency at the stream level,
/// dispatch) have their own error types; this enum never wraps them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or out-of-range input (bad code, blank name, oversized sku).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A state transition would break a domain invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The aggregate does not exist (or has been deleted).
    #[error("not found")]
    NotFound,

    /// The operation clashes with current state (duplicate child, mutation
    /// of a deleted aggregate, stale expected version).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
