use serde::{Deserialize, Serialize};

use stockroom_auth::{Principal, ensure_admin, ensure_owner_or_admin};
use stockroom_core::{DomainResult, ProductId};

use crate::order::Order;
use crate::status::OrderStatus;

/// One requested line of a new order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequestItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Partial update of an order. `client_address: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub client_name: Option<String>,
    pub client_address: Option<Option<String>>,
    pub status: Option<OrderStatus>,
}

impl OrderUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether this update asks for a status different from the current one.
    pub fn changes_status(&self, current: OrderStatus) -> bool {
        self.status.is_some_and(|s| s != current)
    }
}

/// Owners and admins may edit client details; only admins change status.
pub fn authorize_update(principal: &Principal, order: &Order, update: &OrderUpdate) -> DomainResult<()> {
    ensure_owner_or_admin(principal, Some(order.owner()), "order")?;
    if update.changes_status(order.status()) {
        ensure_admin(principal, "change order status")?;
    }
    Ok(())
}
