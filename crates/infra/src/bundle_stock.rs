//! Component-level stock movements for bundles, run inside a store transaction.
//!
//! Every function here takes the open transaction; atomicity comes from the
//! caller's `InventoryStore::transaction`. Nothing in this module commits.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tracing::debug;

use stockroom_catalog::{BundleComponent, Product};
use stockroom_core::{DomainError, Entity, ProductId};
use stockroom_inventory::{ComponentQuote, compute_bundle_aggregate};

use crate::error::ServiceResult;
use crate::store::{StoreError, StoreTx};

/// Deduct `quantity` bundle units worth of component stock.
///
/// Every component is checked before any is touched: if one lacks stock the
/// call fails with `InsufficientStock` and no component has been written.
/// Afterwards every bundle sharing a changed component is re-derived.
pub fn deduct_components(
    tx: &mut dyn StoreTx,
    bundle_id: ProductId,
    quantity: u64,
    now: DateTime<Utc>,
) -> ServiceResult<()> {
    let bundle = load_bundle(tx, bundle_id)?;

    let mut planned = Vec::with_capacity(bundle.components().len());
    for component in bundle.components() {
        let product = load_component(tx, &bundle, component)?;
        let required = required_units(component, quantity)?;
        if product.stock() < required {
            return Err(
                DomainError::insufficient_stock(product.name(), required, product.stock()).into(),
            );
        }
        planned.push((product, required));
    }

    let mut changed = Vec::with_capacity(planned.len());
    for (mut product, required) in planned {
        product.deduct_stock(required, now)?;
        debug!(bundle = %bundle_id, component = %product.id(), units = required, "component deducted");
        changed.push(product.id());
        tx.put_product(product)?;
    }

    refresh_bundles_containing(tx, &changed, now)?;
    Ok(())
}

/// Return `quantity` bundle units worth of component stock, then re-derive.
pub fn revert_components(
    tx: &mut dyn StoreTx,
    bundle_id: ProductId,
    quantity: u64,
    now: DateTime<Utc>,
) -> ServiceResult<()> {
    let bundle = load_bundle(tx, bundle_id)?;

    let mut changed = Vec::with_capacity(bundle.components().len());
    for component in bundle.components() {
        let mut product = load_component(tx, &bundle, component)?;
        let units = required_units(component, quantity)?;
        product.add_stock(units, now)?;
        debug!(bundle = %bundle_id, component = %product.id(), units, "component restored");
        changed.push(product.id());
        tx.put_product(product)?;
    }

    refresh_bundles_containing(tx, &changed, now)?;
    Ok(())
}

/// Recompute and persist one bundle's derived stock and price.
pub fn refresh_bundle(
    tx: &mut dyn StoreTx,
    bundle_id: ProductId,
    now: DateTime<Utc>,
) -> ServiceResult<Product> {
    let mut bundle = load_bundle(tx, bundle_id)?;
    let quotes = quotes_for(tx, bundle.components())?;
    let aggregate = compute_bundle_aggregate(bundle.components(), |id| quotes.get(&id).copied());
    bundle.set_derived(aggregate.stock, aggregate.price, now)?;
    tx.put_product(bundle.clone())?;
    Ok(bundle)
}

/// Re-derive every bundle that lists any of `changed` as a component.
///
/// Returns the ids of the bundles that were refreshed.
pub fn refresh_bundles_containing(
    tx: &mut dyn StoreTx,
    changed: &[ProductId],
    now: DateTime<Utc>,
) -> ServiceResult<Vec<ProductId>> {
    if changed.is_empty() {
        return Ok(Vec::new());
    }

    let affected: BTreeSet<ProductId> = tx
        .products()?
        .iter()
        .filter(|p| p.is_bundle() && changed.iter().any(|id| p.contains_component(*id)))
        .map(Entity::id)
        .collect();

    for bundle_id in &affected {
        refresh_bundle(tx, *bundle_id, now)?;
    }
    Ok(affected.into_iter().collect())
}

/// Current figures for each listed component that exists.
pub(crate) fn quotes_for(
    tx: &dyn StoreTx,
    components: &[BundleComponent],
) -> Result<HashMap<ProductId, ComponentQuote>, StoreError> {
    let mut quotes = HashMap::with_capacity(components.len());
    for component in components {
        if let Some(product) = tx.product(component.product_id)? {
            quotes.insert(component.product_id, ComponentQuote::from(&product));
        }
    }
    Ok(quotes)
}

fn load_bundle(tx: &dyn StoreTx, bundle_id: ProductId) -> ServiceResult<Product> {
    let bundle = tx
        .product(bundle_id)?
        .ok_or_else(|| DomainError::not_found(format!("product {bundle_id}")))?;
    if !bundle.is_bundle() {
        return Err(DomainError::not_a_bundle(bundle.name()).into());
    }
    Ok(bundle)
}

fn load_component(
    tx: &dyn StoreTx,
    bundle: &Product,
    component: &BundleComponent,
) -> ServiceResult<Product> {
    Ok(tx.product(component.product_id)?.ok_or_else(|| {
        DomainError::not_found(format!(
            "component {} of bundle '{}'",
            component.product_id,
            bundle.name()
        ))
    })?)
}

fn required_units(component: &BundleComponent, quantity: u64) -> ServiceResult<u64> {
    u64::from(component.quantity).checked_mul(quantity).ok_or_else(|| {
        DomainError::validation(format!(
            "quantity {quantity} overflows component {}",
            component.product_id
        ))
        .into()
    })
}
