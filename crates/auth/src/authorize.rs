use thiserror::Error;
use tracing::debug;

use stockroom_core::{DomainError, UserId};

use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("admin role required to {0}")]
    AdminRequired(String),

    #[error("not the owner of this {0}")]
    NotOwner(String),
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::Forbidden(value.to_string())
    }
}

/// Require the admin role for `action` (e.g. "change order status").
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn ensure_admin(principal: &Principal, action: &str) -> Result<(), AuthzError> {
    if principal.is_admin() {
        return Ok(());
    }
    debug!(principal = %principal.id, action, "denied: admin role required");
    Err(AuthzError::AdminRequired(action.to_string()))
}

/// Require that the principal owns the record (`owner`), or is an admin.
///
/// Records with no owner (admin-created, global) are only mutable by admins.
pub fn ensure_owner_or_admin(
    principal: &Principal,
    owner: Option<UserId>,
    what: &str,
) -> Result<(), AuthzError> {
    if principal.can_access(owner) {
        return Ok(());
    }
    debug!(principal = %principal.id, what, "denied: not owner");
    Err(AuthzError::NotOwner(what.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_guard() {
        let admin = Principal::admin(UserId::new());
        assert!(ensure_admin(&admin, "edit products").is_ok());
        assert!(ensure_owner_or_admin(&admin, Some(UserId::new()), "order").is_ok());
        assert!(ensure_owner_or_admin(&admin, None, "supplier").is_ok());
    }

    #[test]
    fn client_only_reaches_own_records() {
        let me = UserId::new();
        let client = Principal::client(me);
        assert!(ensure_owner_or_admin(&client, Some(me), "order").is_ok());
        assert_eq!(
            ensure_owner_or_admin(&client, Some(UserId::new()), "order"),
            Err(AuthzError::NotOwner("order".to_string()))
        );
        assert!(ensure_owner_or_admin(&client, None, "supplier").is_err());
    }

    #[test]
    fn client_denied_admin_action_maps_to_forbidden() {
        let client = Principal::client(UserId::new());
        let err: DomainError = ensure_admin(&client, "change order status").unwrap_err().into();
        assert_eq!(
            err,
            DomainError::Forbidden("admin role required to change order status".to_string())
        );
    }
}
