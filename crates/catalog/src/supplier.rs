use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, SupplierId, UserId};

use crate::naming::normalize_name;

/// Supplier contact details (all optional).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierContact {
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A supplier record.
///
/// `owner` is the creating user; `None` marks an admin-created record that is
/// visible to everyone. Names are unique per owner (compared case-insensitively).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    owner: Option<UserId>,
    name: String,
    contact: SupplierContact,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact: Option<SupplierContact>,
}

impl Supplier {
    pub fn new(
        owner: Option<UserId>,
        name: &str,
        contact: SupplierContact,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("supplier name cannot be empty"));
        }
        Ok(Self {
            id: SupplierId::new(),
            owner,
            name: name.to_string(),
            contact,
            created_at,
        })
    }

    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &SupplierContact {
        &self.contact
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Key used for the per-owner uniqueness check.
    pub fn name_key(&self) -> String {
        normalize_name(&self.name).unwrap_or_default()
    }

    /// Whether `other` would collide with this record's name in the same ownership scope.
    pub fn conflicts_with(&self, owner: Option<UserId>, name: &str) -> bool {
        self.owner == owner && normalize_name(name).is_ok_and(|key| key == self.name_key())
    }

    /// Visible to a viewer that owns it, to everyone when global.
    pub fn is_visible_to(&self, viewer: UserId) -> bool {
        self.owner.is_none() || self.owner == Some(viewer)
    }

    pub fn apply_patch(&mut self, patch: SupplierPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("supplier name cannot be empty"));
            }
            self.name = name.to_string();
        }
        if let Some(contact) = patch.contact {
            self.contact = contact;
        }
        Ok(())
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> SupplierId {
        self.id
    }
}
