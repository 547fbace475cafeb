use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryId, DomainError, DomainResult, Entity, Money, ProductId, SupplierId};

use crate::naming::normalize_name;

/// One line of a bundle's bill of materials: `quantity` units of a simple
/// product per bundle unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleComponent {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl BundleComponent {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Simple products carry authored stock/price; bundles derive both from their
/// components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Bundle { components: Vec<BundleComponent> },
}

/// Catalog product (simple or bundle).
///
/// Invariant: `stock` is never negative (unsigned) and, for bundles, is only
/// written through [`Product::set_derived`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    sku: String,
    category_id: Option<CategoryId>,
    supplier_id: Option<SupplierId>,
    stock: u64,
    price: Money,
    low_stock_threshold: Option<u32>,
    bin_location: Option<String>,
    kind: ProductKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Input for creating a product.
///
/// `bundle_components: Some(..)` creates a bundle, which must not author
/// `stock` or `price`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub sku: String,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub stock: Option<u64>,
    pub price: Option<Money>,
    pub low_stock_threshold: Option<u32>,
    pub bin_location: Option<String>,
    pub bundle_components: Option<Vec<BundleComponent>>,
}

/// Partial update of a product. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub supplier_id: Option<Option<SupplierId>>,
    pub stock: Option<u64>,
    pub price: Option<Money>,
    pub low_stock_threshold: Option<Option<u32>>,
    pub bin_location: Option<Option<String>>,
    pub bundle_components: Option<Vec<BundleComponent>>,
}

impl ProductPatch {
    /// Whether applying this patch can change the stock or price other bundles derive from.
    pub fn touches_stock_or_price(&self) -> bool {
        self.stock.is_some() || self.price.is_some()
    }
}

impl Product {
    /// Build a product from a draft (local checks only).
    ///
    /// Bundles start at zero stock/price; the caller derives the real values
    /// once composition has been validated against the store.
    pub fn from_draft(draft: ProductDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = normalize_name(&draft.name)?;
        let sku = clean_sku(&draft.sku)?;

        let (kind, stock, price) = match draft.bundle_components {
            Some(components) => {
                if draft.stock.is_some() || draft.price.is_some() {
                    return Err(DomainError::validation(
                        "stock and price of a bundle are derived from its components",
                    ));
                }
                (ProductKind::Bundle { components }, 0, Money::ZERO)
            }
            None => (
                ProductKind::Simple,
                draft.stock.unwrap_or(0),
                draft.price.unwrap_or(Money::ZERO),
            ),
        };

        Ok(Self {
            id: ProductId::new(),
            name,
            sku,
            category_id: draft.category_id,
            supplier_id: draft.supplier_id,
            stock,
            price,
            low_stock_threshold: draft.low_stock_threshold,
            bin_location: clean(draft.bin_location),
            kind,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn low_stock_threshold(&self) -> Option<u32> {
        self.low_stock_threshold
    }

    pub fn bin_location(&self) -> Option<&str> {
        self.bin_location.as_deref()
    }

    pub fn kind(&self) -> &ProductKind {
        &self.kind
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self.kind, ProductKind::Bundle { .. })
    }

    /// Bundle components; empty for simple products.
    pub fn components(&self) -> &[BundleComponent] {
        match &self.kind {
            ProductKind::Bundle { components } => components,
            ProductKind::Simple => &[],
        }
    }

    pub fn contains_component(&self, product_id: ProductId) -> bool {
        self.components().iter().any(|c| c.product_id == product_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Remove `quantity` units from a simple product's stock.
    pub fn deduct_stock(&mut self, quantity: u64, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_simple()?;
        if self.stock < quantity {
            return Err(DomainError::insufficient_stock(&self.name, quantity, self.stock));
        }
        self.stock -= quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Return `quantity` units to a simple product's stock.
    pub fn add_stock(&mut self, quantity: u64, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_simple()?;
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation(format!("stock overflow for '{}'", self.name)))?;
        self.updated_at = now;
        Ok(())
    }

    /// Signed manual adjustment (receiving, shrinkage) of a simple product.
    pub fn adjust_stock(&mut self, delta: i64, now: DateTime<Utc>) -> DomainResult<()> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }
        if delta > 0 {
            self.add_stock(delta.unsigned_abs(), now)
        } else {
            self.deduct_stock(delta.unsigned_abs(), now)
        }
    }

    /// Store the derived stock and price of a bundle.
    pub fn set_derived(&mut self, stock: u64, price: Money, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_bundle() {
            return Err(DomainError::not_a_bundle(&self.name));
        }
        if self.stock != stock || self.price != price {
            self.stock = stock;
            self.price = price;
            self.updated_at = now;
        }
        Ok(())
    }

    /// Apply local field changes. Component lists must already be validated by
    /// the caller; derived values are recomputed afterwards by the caller.
    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_bundle() && patch.touches_stock_or_price() {
            return Err(DomainError::validation(
                "stock and price of a bundle are derived from its components",
            ));
        }
        if !self.is_bundle() && patch.bundle_components.is_some() {
            return Err(DomainError::validation(
                "components can only be set on a bundle product",
            ));
        }

        if let Some(name) = patch.name {
            self.name = normalize_name(&name)?;
        }
        if let Some(sku) = patch.sku {
            self.sku = clean_sku(&sku)?;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(supplier_id) = patch.supplier_id {
            self.supplier_id = supplier_id;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            self.low_stock_threshold = threshold;
        }
        if let Some(bin_location) = patch.bin_location {
            self.bin_location = clean(bin_location);
        }
        if let Some(components) = patch.bundle_components {
            self.kind = ProductKind::Bundle { components };
        }

        self.updated_at = now;
        Ok(())
    }

    fn ensure_simple(&self) -> DomainResult<()> {
        if self.is_bundle() {
            return Err(DomainError::validation(format!(
                "stock of bundle '{}' is derived from its components",
                self.name
            )));
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

fn clean_sku(raw: &str) -> DomainResult<String> {
    let sku = raw.trim();
    if sku.is_empty() {
        return Err(DomainError::validation("SKU cannot be empty"));
    }
    Ok(sku.to_string())
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
