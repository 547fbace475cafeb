//! Service-level error model (domain failures + persistence failures).

use thiserror::Error;

use stockroom_auth::AuthzError;
use stockroom_core::DomainError;

use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a service operation.
///
/// Every stock-mutating operation that returns an error has left committed
/// state unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::Domain(value.into())
    }
}

impl ServiceError {
    /// Stable machine-readable code for the hosting layer.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Domain(e) => match e {
                DomainError::Validation(_) => "validation_error",
                DomainError::InsufficientStock { .. } => "insufficient_stock",
                DomainError::NotFound(_) => "not_found",
                DomainError::NotABundle(_) => "not_a_bundle",
                DomainError::Forbidden(_) => "forbidden",
                DomainError::Conflict(_) => "conflict",
                DomainError::InvalidId(_) => "invalid_id",
            },
            ServiceError::Persistence(_) => "persistence_failure",
        }
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, ServiceError::Persistence(_))
    }
}
