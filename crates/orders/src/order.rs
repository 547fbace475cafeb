use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_catalog::{Category, Product};
use stockroom_core::{CategoryId, DomainError, DomainResult, Entity, Money, OrderId, ProductId, UserId};

use crate::status::{OrderStatus, StockEffect, plan_stock_effect};

/// Category as it was named when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// Order line: a snapshot of the product taken at placement time.
///
/// Later product edits never change `name`, `category` or `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub category: Option<CategoryRef>,
    pub quantity: u32,
    pub price: Money,
    pub is_bundle: bool,
}

impl LineItem {
    pub fn snapshot(
        product: &Product,
        category: Option<&Category>,
        quantity: u32,
    ) -> DomainResult<Self> {
        if quantity < 1 {
            return Err(DomainError::validation("item quantity must be at least 1"));
        }
        Ok(Self {
            product_id: product.id(),
            name: product.name().to_string(),
            category: category.map(|c| CategoryRef {
                id: c.id(),
                name: c.name().to_string(),
            }),
            quantity,
            price: product.price(),
            is_bundle: product.is_bundle(),
        })
    }

    pub fn line_total(&self) -> Money {
        self.price.times(u64::from(self.quantity))
    }
}

/// A customer order.
///
/// `stock_committed` is true while the line quantities are deducted from
/// stock; it changes only through [`Order::transition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    owner: UserId,
    client_name: String,
    client_address: Option<String>,
    items: Vec<LineItem>,
    status: OrderStatus,
    stock_committed: bool,
    total_price: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a Pending order. No stock is touched at placement.
    pub fn place(
        owner: UserId,
        client_name: &str,
        client_address: Option<String>,
        items: Vec<LineItem>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let client_name = clean_client_name(client_name)?;
        if items.is_empty() {
            return Err(DomainError::validation("an order needs at least one item"));
        }
        if items.iter().any(|i| i.quantity < 1) {
            return Err(DomainError::validation("item quantity must be at least 1"));
        }

        let mut order = Self {
            id: OrderId::new(),
            owner,
            client_name,
            client_address: clean(client_address),
            items,
            status: OrderStatus::Pending,
            stock_committed: false,
            total_price: Money::ZERO,
            created_at: now,
            updated_at: now,
        };
        order.touch(now);
        Ok(order)
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_address(&self) -> Option<&str> {
        self.client_address.as_deref()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn stock_committed(&self) -> bool {
        self.stock_committed
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_client_name(&mut self, name: &str, now: DateTime<Utc>) -> DomainResult<()> {
        self.client_name = clean_client_name(name)?;
        self.touch(now);
        Ok(())
    }

    /// `None` clears the address.
    pub fn set_client_address(&mut self, address: Option<String>, now: DateTime<Utc>) {
        self.client_address = clean(address);
        self.touch(now);
    }

    /// Move to `to` and return the stock effect the caller must apply in the
    /// same transaction. Moving to the current status is a no-op.
    pub fn transition(&mut self, to: OrderStatus, now: DateTime<Utc>) -> StockEffect {
        if to == self.status {
            return StockEffect::None;
        }
        let effect = plan_stock_effect(to, self.stock_committed);
        match effect {
            StockEffect::Deduct => self.stock_committed = true,
            StockEffect::Revert => self.stock_committed = false,
            StockEffect::None => {}
        }
        self.status = to;
        self.touch(now);
        effect
    }

    /// Stock effect of deleting the order: committed stock goes back.
    pub fn release_on_delete(&self) -> StockEffect {
        if self.stock_committed {
            StockEffect::Revert
        } else {
            StockEffect::None
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.total_price = self.items.iter().map(LineItem::line_total).sum();
        self.updated_at = now;
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> OrderId {
        self.id
    }
}

fn clean_client_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("client name cannot be empty"));
    }
    Ok(name.to_string())
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_catalog::{DEFAULT_LOW_STOCK_THRESHOLD, ProductDraft};

    fn product(name: &str, cents: u64) -> Product {
        Product::from_draft(
            ProductDraft {
                name: name.to_string(),
                sku: format!("SKU-{name}"),
                stock: Some(10),
                price: Some(Money::from_cents(cents)),
                ..ProductDraft::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn order(lines: &[(u64, u32)]) -> Order {
        let items = lines
            .iter()
            .enumerate()
            .map(|(i, (cents, qty))| {
                LineItem::snapshot(&product(&format!("p{i}"), *cents), None, *qty).unwrap()
            })
            .collect();
        Order::place(UserId::new(), "Ada", None, items, Utc::now()).unwrap()
    }

    #[test]
    fn snapshot_copies_product_and_category() {
        let tools =
            Category::new("Tools", None, None, DEFAULT_LOW_STOCK_THRESHOLD, Utc::now()).unwrap();
        let drill = product("Drill", 4999);
        let line = LineItem::snapshot(&drill, Some(&tools), 2).unwrap();

        assert_eq!(line.product_id, drill.id());
        assert_eq!(line.name, "drill");
        assert_eq!(line.category.as_ref().map(|c| c.name.as_str()), Some("tools"));
        assert_eq!(line.price, Money::from_cents(4999));
        assert!(!line.is_bundle);
        assert_eq!(line.line_total(), Money::from_cents(9998));
    }

    #[test]
    fn snapshot_rejects_zero_quantity() {
        let err = LineItem::snapshot(&product("Drill", 1), None, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn place_starts_pending_with_derived_total() {
        let o = order(&[(500, 2), (1000, 1)]);
        assert_eq!(o.status(), OrderStatus::Pending);
        assert!(!o.stock_committed());
        assert_eq!(o.total_price(), Money::from_cents(2000));
    }

    #[test]
    fn place_validates_inputs() {
        let line = LineItem::snapshot(&product("Drill", 1), None, 1).unwrap();
        assert!(Order::place(UserId::new(), "  ", None, vec![line], Utc::now()).is_err());
        assert!(Order::place(UserId::new(), "Ada", None, vec![], Utc::now()).is_err());
    }

    #[test]
    fn transition_tracks_committed_stock() {
        let mut o = order(&[(100, 1)]);
        let now = Utc::now();

        assert_eq!(o.transition(OrderStatus::Processing, now), StockEffect::None);
        assert_eq!(o.transition(OrderStatus::Shipped, now), StockEffect::Deduct);
        assert!(o.stock_committed());
        assert_eq!(o.transition(OrderStatus::Shipped, now), StockEffect::None);
        assert_eq!(o.transition(OrderStatus::Delivered, now), StockEffect::None);
        assert_eq!(o.release_on_delete(), StockEffect::Revert);
        assert_eq!(o.transition(OrderStatus::Cancelled, now), StockEffect::Revert);
        assert!(!o.stock_committed());
        assert_eq!(o.release_on_delete(), StockEffect::None);
    }

    #[test]
    fn leaving_fulfilment_for_pending_keeps_stock_committed() {
        let mut o = order(&[(100, 1)]);
        let now = Utc::now();
        o.transition(OrderStatus::Shipped, now);
        assert_eq!(o.transition(OrderStatus::Pending, now), StockEffect::None);
        assert_eq!(o.transition(OrderStatus::Shipped, now), StockEffect::None);
        assert_eq!(o.transition(OrderStatus::Cancelled, now), StockEffect::Revert);
    }

    #[test]
    fn client_details_are_editable() {
        let mut o = order(&[(100, 3)]);
        let edited_at = o.created_at() + chrono::Duration::minutes(1);
        o.set_client_name(" Grace ", edited_at).unwrap();
        assert_eq!(o.updated_at(), edited_at);
        o.set_client_address(Some("1 Loop Rd".to_string()), Utc::now());
        assert_eq!(o.client_name(), "Grace");
        assert_eq!(o.client_address(), Some("1 Loop Rd"));
        assert_eq!(o.total_price(), Money::from_cents(300));
        assert!(o.set_client_name("", Utc::now()).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_status() -> impl Strategy<Value = OrderStatus> {
            prop::sample::select(OrderStatus::ALL.to_vec())
        }

        proptest! {
            /// Property: over any status walk, deductions minus reversions is 0 or 1
            /// and matches `stock_committed`.
            #[test]
            fn deductions_and_reversions_balance(walk in prop::collection::vec(any_status(), 0..40)) {
                let mut o = order(&[(100, 2)]);
                let mut outstanding: i32 = 0;
                for to in walk {
                    match o.transition(to, Utc::now()) {
                        StockEffect::Deduct => outstanding += 1,
                        StockEffect::Revert => outstanding -= 1,
                        StockEffect::None => {}
                    }
                    prop_assert!(outstanding == 0 || outstanding == 1);
                    prop_assert_eq!(outstanding == 1, o.stock_committed());
                }
            }
        }
    }
}
