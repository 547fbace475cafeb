//! User accounts and their alert preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, UserId};

use crate::{Principal, Role};

/// Per-user low-stock alert settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub receive_low_stock_alerts: bool,
    /// Overrides the account email as the alert destination when set.
    pub low_stock_alert_email: Option<String>,
}

impl NotificationPreferences {
    fn validate(&self) -> DomainResult<()> {
        if let Some(email) = &self.low_stock_alert_email {
            validate_email(email)?;
        }
        Ok(())
    }
}

/// A user account.
///
/// Credentials are hashed by the authentication layer before they reach this
/// type; only the opaque hash is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub notification_preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: &str,
        display_name: &str,
        password_hash: &str,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = email.trim().to_lowercase();
        validate_email(&email)?;
        if display_name.trim().is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }
        if password_hash.is_empty() {
            return Err(DomainError::validation("password hash cannot be empty"));
        }

        Ok(Self {
            id: UserId::new(),
            email,
            display_name: display_name.trim().to_string(),
            password_hash: password_hash.to_string(),
            role,
            notification_preferences: NotificationPreferences::default(),
            created_at,
        })
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.role)
    }

    pub fn set_notification_preferences(
        &mut self,
        preferences: NotificationPreferences,
    ) -> DomainResult<()> {
        preferences.validate()?;
        self.notification_preferences = NotificationPreferences {
            receive_low_stock_alerts: preferences.receive_low_stock_alerts,
            low_stock_alert_email: preferences
                .low_stock_alert_email
                .map(|e| e.trim().to_lowercase()),
        };
        Ok(())
    }

    /// Where low-stock alerts go, or `None` if the user opted out.
    pub fn alert_address(&self) -> Option<&str> {
        let prefs = &self.notification_preferences;
        if !prefs.receive_low_stock_alerts {
            return None;
        }
        Some(prefs.low_stock_alert_email.as_deref().unwrap_or(&self.email))
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::validation(format!("invalid email address '{email}'"))),
    }
}
