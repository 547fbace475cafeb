use serde::{Deserialize, Serialize};

use stockroom_core::UserId;

use crate::Role;

/// The authenticated caller of a core operation.
///
/// Built by the hosting layer from its session/token and passed explicitly;
/// the core never reads an ambient request object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn admin(id: UserId) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn client(id: UserId) -> Self {
        Self::new(id, Role::Client)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this principal owns (or, as admin, may act on) a record owned by `owner`.
    pub fn can_access(&self, owner: Option<UserId>) -> bool {
        self.is_admin() || owner == Some(self.id)
    }
}
