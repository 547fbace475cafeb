//! Bundle stock/price derivation and bundle composition rules.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use stockroom_catalog::{BundleComponent, Product};
use stockroom_core::{DomainError, DomainResult, Money, ProductId};

/// Fixed discount applied to the summed list price of a bundle's components.
pub const BUNDLE_DISCOUNT_PERCENT: u64 = 10;

/// Current figures of one component product, as seen by the ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComponentQuote {
    pub stock: u64,
    pub price: Money,
    pub is_bundle: bool,
}

impl From<&Product> for ComponentQuote {
    fn from(product: &Product) -> Self {
        Self {
            stock: product.stock(),
            price: product.price(),
            is_bundle: product.is_bundle(),
        }
    }
}

/// Derived stock and price of a bundle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleAggregate {
    pub stock: u64,
    pub price: Money,
}

/// Derive a bundle's stock and price from its components.
///
/// - stock: the smallest `floor(component_stock / quantity)` across components;
///   0 when the list is empty or any component is missing
/// - price: `(100 - BUNDLE_DISCOUNT_PERCENT)%` of `sum(price * quantity)` over
///   the components that exist
pub fn compute_bundle_aggregate<F>(components: &[BundleComponent], mut quote: F) -> BundleAggregate
where
    F: FnMut(ProductId) -> Option<ComponentQuote>,
{
    let mut buildable: Option<u64> = None;
    let mut missing = components.is_empty();
    let mut list_price = Money::ZERO;

    for component in components {
        let Some(q) = quote(component.product_id) else {
            missing = true;
            continue;
        };
        let per_unit = u64::from(component.quantity);
        let contribution = q.stock.checked_div(per_unit).unwrap_or(0);
        buildable = Some(buildable.map_or(contribution, |b| b.min(contribution)));
        list_price = list_price.plus(q.price.times(per_unit));
    }

    BundleAggregate {
        stock: if missing { 0 } else { buildable.unwrap_or(0) },
        price: list_price.percent_of(100 - BUNDLE_DISCOUNT_PERCENT),
    }
}

/// Check a bundle's component list against the catalog.
///
/// Fails (in this order) on: an empty list, a quantity below 1, a duplicate
/// component, a reference to `exclude` (the bundle itself), a missing
/// component, or a component that is itself a bundle (one level of nesting).
pub fn validate_bundle_components<F>(
    components: &[BundleComponent],
    exclude: Option<ProductId>,
    mut quote: F,
) -> DomainResult<()>
where
    F: FnMut(ProductId) -> Option<ComponentQuote>,
{
    if components.is_empty() {
        return Err(DomainError::validation(
            "a bundle must have at least one component",
        ));
    }

    if let Some(c) = components.iter().find(|c| c.quantity < 1) {
        return Err(DomainError::validation(format!(
            "component {} quantity must be at least 1",
            c.product_id
        )));
    }

    let mut seen = HashSet::with_capacity(components.len());
    for c in components {
        if !seen.insert(c.product_id) {
            return Err(DomainError::validation(format!(
                "component {} is listed more than once",
                c.product_id
            )));
        }
    }

    if let Some(own_id) = exclude {
        if seen.contains(&own_id) {
            return Err(DomainError::validation(
                "a bundle cannot contain itself",
            ));
        }
    }

    for c in components {
        match quote(c.product_id) {
            None => {
                return Err(DomainError::validation(format!(
                    "component {} does not exist",
                    c.product_id
                )));
            }
            Some(q) if q.is_bundle => {
                return Err(DomainError::validation(format!(
                    "component {} is a bundle; bundles cannot be nested",
                    c.product_id
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}
