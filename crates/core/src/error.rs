//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// stock invariants, ownership). Persistence failures belong to the store layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: missing fields, bad references, bundle composition errors.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A product (or bundle component) does not hold enough stock for a deduction.
    #[error("insufficient stock for '{product}': required {required}, available {available}")]
    InsufficientStock {
        product: String,
        required: u64,
        available: u64,
    },

    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A bundle-only operation targeted a simple product.
    #[error("product '{0}' is not a bundle")]
    NotABundle(String),

    /// The principal may not perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation conflicts with existing state (uniqueness, references).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_stock(product: impl Into<String>, required: u64, available: u64) -> Self {
        Self::InsufficientStock {
            product: product.into(),
            required,
            available,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn not_a_bundle(product: impl Into<String>) -> Self {
        Self::NotABundle(product.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
