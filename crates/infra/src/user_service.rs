//! User registration and alert preferences.
//!
//! Password hashing happens in the authentication layer; only the hash
//! reaches this service.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use stockroom_auth::{NotificationPreferences, Principal, Role, User, ensure_owner_or_admin};
use stockroom_core::{DomainError, UserId};

use crate::error::ServiceResult;
use crate::store::InventoryStore;

pub struct UserService<S> {
    store: Arc<S>,
}

impl<S> Clone for UserService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: InventoryStore> UserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register an account. The first account becomes the admin.
    pub fn register_user(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> ServiceResult<User> {
        let now = Utc::now();
        let user = self.store.transaction(|tx| -> ServiceResult<User> {
            let existing = tx.users()?;
            let role = if existing.is_empty() { Role::Admin } else { Role::Client };
            let user = User::new(email, display_name, password_hash, role, now)?;
            if existing.iter().any(|u| u.email == user.email) {
                return Err(DomainError::conflict(format!(
                    "an account for '{}' already exists",
                    user.email
                ))
                .into());
            }
            tx.put_user(user.clone())?;
            Ok(user)
        })?;

        info!(user = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub fn get_user(&self, principal: &Principal, id: UserId) -> ServiceResult<User> {
        self.store.read(|tx| -> ServiceResult<User> {
            ensure_owner_or_admin(principal, Some(id), "user account")?;
            Ok(tx
                .user(id)?
                .ok_or_else(|| DomainError::not_found(format!("user {id}")))?)
        })
    }

    /// Users edit their own preferences; admins may edit anyone's.
    pub fn update_notification_preferences(
        &self,
        principal: &Principal,
        id: UserId,
        preferences: NotificationPreferences,
    ) -> ServiceResult<User> {
        self.store.transaction(|tx| -> ServiceResult<User> {
            ensure_owner_or_admin(principal, Some(id), "user account")?;
            let mut user = tx
                .user(id)?
                .ok_or_else(|| DomainError::not_found(format!("user {id}")))?;
            user.set_notification_preferences(preferences)?;
            tx.put_user(user.clone())?;
            Ok(user)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::InMemoryInventoryStore;

    fn service() -> UserService<InMemoryInventoryStore> {
        UserService::new(Arc::new(InMemoryInventoryStore::new()))
    }

    #[test]
    fn first_user_is_admin_and_emails_are_unique() {
        let svc = service();
        let first = svc.register_user("root@example.com", "Root", "h").unwrap();
        let second = svc.register_user("ada@example.com", "Ada", "h").unwrap();
        assert_eq!(first.role, Role::Admin);
        assert_eq!(second.role, Role::Client);

        let err = svc.register_user("ADA@example.com", "Ada again", "h").unwrap_err();
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn preferences_are_self_or_admin() {
        let svc = service();
        let admin = svc.register_user("root@example.com", "Root", "h").unwrap();
        let ada = svc.register_user("ada@example.com", "Ada", "h").unwrap();
        let grace = svc.register_user("grace@example.com", "Grace", "h").unwrap();

        let opt_in = NotificationPreferences {
            receive_low_stock_alerts: true,
            low_stock_alert_email: None,
        };
        let updated = svc
            .update_notification_preferences(&ada.principal(), ada.id, opt_in.clone())
            .unwrap();
        assert_eq!(updated.alert_address(), Some("ada@example.com"));

        let err = svc
            .update_notification_preferences(&grace.principal(), ada.id, opt_in.clone())
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");

        assert!(svc
            .update_notification_preferences(&admin.principal(), grace.id, opt_in)
            .is_ok());
        assert_eq!(svc.get_user(&grace.principal(), grace.id).unwrap().alert_address(), Some("grace@example.com"));
    }
}
