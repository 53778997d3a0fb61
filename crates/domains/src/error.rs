//! # DomainError
//!
//! Centralized error handling for the Meritboard ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Missing/malformed required field, missing mandatory comment,
    /// missing required document.
    #[error("validation error: {0}")]
    Validation(String),

    /// Actor is not the owner/advisor/admin the operation requires.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Record id does not resolve, or does not resolve in the expected
    /// state for the requested transition.
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Concurrency-token mismatch: the record changed under the caller.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Upload/storage failure, opaque to the core.
    #[error("transport error: {0}")]
    Transport(String),

    /// Infrastructure failure (DB down, pool exhausted).
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// A specialized Result type for Meritboard logic.
pub type Result<T> = std::result::Result<T, DomainError>;
