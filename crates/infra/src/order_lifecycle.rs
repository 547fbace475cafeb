//! Order placement, status transitions, and deletion, with their stock effects.
//!
//! Each public operation is one store transaction: the order write and every
//! stock movement it implies commit together or not at all.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use stockroom_auth::{Principal, ensure_owner_or_admin};
use stockroom_core::{DomainError, Entity, OrderId};
use stockroom_orders::{
    LineItem, Order, OrderRequestItem, OrderStatus, OrderUpdate, StockEffect, authorize_update,
};

use crate::bundle_stock::{deduct_components, refresh_bundles_containing, revert_components};
use crate::error::ServiceResult;
use crate::store::{InventoryStore, StoreTx};

pub struct OrderService<S> {
    store: Arc<S>,
}

impl<S> Clone for OrderService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: InventoryStore> OrderService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Place a Pending order owned by `principal`.
    ///
    /// Every line is a snapshot of the product as it is now. No stock moves.
    /// If any product is missing, no order is created.
    pub fn place_order(
        &self,
        principal: &Principal,
        client_name: &str,
        client_address: Option<String>,
        items: &[OrderRequestItem],
    ) -> ServiceResult<Order> {
        if client_name.trim().is_empty() {
            return Err(DomainError::validation("client name cannot be empty").into());
        }
        if items.is_empty() {
            return Err(DomainError::validation("an order needs at least one item").into());
        }
        if items.iter().any(|i| i.quantity < 1) {
            return Err(DomainError::validation("item quantity must be at least 1").into());
        }

        let now = Utc::now();
        let order = self
            .store
            .transaction(|tx| -> ServiceResult<Order> {
                let mut lines = Vec::with_capacity(items.len());
                for item in items {
                    let product = tx.product(item.product_id)?.ok_or_else(|| {
                        DomainError::not_found(format!("product {}", item.product_id))
                    })?;
                    let category = match product.category_id() {
                        Some(id) => tx.category(id)?,
                        None => None,
                    };
                    lines.push(LineItem::snapshot(&product, category.as_ref(), item.quantity)?);
                }
                let order = Order::place(principal.id, client_name, client_address, lines, now)?;
                tx.put_order(order.clone())?;
                Ok(order)
            })
            .inspect_err(|e| warn!(owner = %principal.id, error = %e, "order placement rejected"))?;

        info!(
            order = %order.id(),
            owner = %order.owner(),
            lines = order.items().len(),
            total = %order.total_price(),
            "order placed"
        );
        Ok(order)
    }

    pub fn get_order(&self, principal: &Principal, id: OrderId) -> ServiceResult<Order> {
        self.store.read(|tx| -> ServiceResult<Order> {
            let order = load_order(tx, id)?;
            ensure_owner_or_admin(principal, Some(order.owner()), "order")?;
            Ok(order)
        })
    }

    /// Admins see every order; clients see their own.
    pub fn list_orders(&self, principal: &Principal) -> ServiceResult<Vec<Order>> {
        self.store.read(|tx| -> ServiceResult<Vec<Order>> {
            let mut orders: Vec<Order> = tx
                .orders()?
                .into_iter()
                .filter(|o| principal.can_access(Some(o.owner())))
                .collect();
            orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
            Ok(orders)
        })
    }

    /// Edit client details and/or move the order to a new status.
    ///
    /// Status changes are admin-only. Entering Shipped/Delivered deducts the
    /// line quantities; cancelling a fulfilled order puts them back. A failed
    /// stock movement aborts the whole update.
    pub fn update_order(
        &self,
        principal: &Principal,
        id: OrderId,
        update: OrderUpdate,
    ) -> ServiceResult<Order> {
        let now = Utc::now();
        let (order, from, effect) = self
            .store
            .transaction(|tx| -> ServiceResult<(Order, OrderStatus, StockEffect)> {
                let mut order = load_order(tx, id)?;
                authorize_update(principal, &order, &update)?;
                let from = order.status();

                if let Some(name) = update.client_name.as_deref() {
                    order.set_client_name(name, now)?;
                }
                if let Some(address) = update.client_address.clone() {
                    order.set_client_address(address, now);
                }
                let effect = match update.status {
                    Some(to) => order.transition(to, now),
                    None => StockEffect::None,
                };

                apply_stock_effect(tx, order.items(), effect, now)?;
                tx.put_order(order.clone())?;
                Ok((order, from, effect))
            })
            .inspect_err(|e| warn!(order = %id, error = %e, "order update aborted"))?;

        if from != order.status() {
            info!(
                order = %id,
                from = %from,
                to = %order.status(),
                stock = ?effect,
                "order status changed"
            );
        }
        Ok(order)
    }

    pub fn update_order_status(
        &self,
        principal: &Principal,
        id: OrderId,
        status: OrderStatus,
    ) -> ServiceResult<Order> {
        self.update_order(principal, id, OrderUpdate::status(status))
    }

    /// Delete an order, returning committed stock first.
    pub fn delete_order(&self, principal: &Principal, id: OrderId) -> ServiceResult<()> {
        let now = Utc::now();
        let effect = self
            .store
            .transaction(|tx| -> ServiceResult<StockEffect> {
                let order = load_order(tx, id)?;
                ensure_owner_or_admin(principal, Some(order.owner()), "order")?;
                let effect = order.release_on_delete();
                apply_stock_effect(tx, order.items(), effect, now)?;
                tx.remove_order(id)?;
                Ok(effect)
            })
            .inspect_err(|e| warn!(order = %id, error = %e, "order deletion aborted"))?;

        info!(order = %id, stock = ?effect, "order deleted");
        Ok(())
    }
}

fn load_order(tx: &dyn StoreTx, id: OrderId) -> ServiceResult<Order> {
    Ok(tx
        .order(id)?
        .ok_or_else(|| DomainError::not_found(format!("order {id}")))?)
}

/// Move stock for every line: bundles through their components, simple
/// products directly.
///
/// Branches on the product as stored, not on the line snapshot.
pub(crate) fn apply_stock_effect(
    tx: &mut dyn StoreTx,
    lines: &[LineItem],
    effect: StockEffect,
    now: DateTime<Utc>,
) -> ServiceResult<()> {
    if effect == StockEffect::None {
        return Ok(());
    }

    for line in lines {
        let quantity = u64::from(line.quantity);
        let mut product = tx
            .product(line.product_id)?
            .ok_or_else(|| DomainError::not_found(format!("product '{}'", line.name)))?;

        if product.is_bundle() {
            match effect {
                StockEffect::Deduct => deduct_components(tx, product.id(), quantity, now)?,
                StockEffect::Revert => revert_components(tx, product.id(), quantity, now)?,
                StockEffect::None => {}
            }
        } else {
            match effect {
                StockEffect::Deduct => product.deduct_stock(quantity, now)?,
                StockEffect::Revert => product.add_stock(quantity, now)?,
                StockEffect::None => {}
            }
            let id = product.id();
            tx.put_product(product)?;
            refresh_bundles_containing(tx, &[id], now)?;
        }
        debug!(product = %line.product_id, quantity, ?effect, "line stock applied");
    }
    Ok(())
}
