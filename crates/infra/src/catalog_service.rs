//! Category and product administration.
//!
//! Mutations are admin-only; reads are open to any principal. Every change to
//! a simple product's stock or price re-derives the bundles that contain it in
//! the same transaction.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use stockroom_auth::{Principal, ensure_admin};
use stockroom_catalog::{
    Category, CategoryPatch, Product, ProductDraft, ProductPatch, normalize_name,
};
use stockroom_core::{CategoryId, DomainError, Entity, ProductId, SupplierId};
use stockroom_inventory::{ThresholdPolicy, validate_bundle_components};
use stockroom_orders::OrderStatus;

use crate::bundle_stock::{quotes_for, refresh_bundle, refresh_bundles_containing};
use crate::error::ServiceResult;
use crate::store::{InventoryStore, StoreTx};

pub struct CatalogService<S> {
    store: Arc<S>,
    policy: ThresholdPolicy,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: InventoryStore> CatalogService<S> {
    /// `policy.global_default` also seeds categories created without a threshold.
    pub fn new(store: Arc<S>, policy: ThresholdPolicy) -> Self {
        Self { store, policy }
    }

    // ---- categories ----

    pub fn create_category(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<String>,
        default_threshold: Option<u32>,
    ) -> ServiceResult<Category> {
        ensure_admin(principal, "create categories")?;
        let category = Category::new(
            name,
            description,
            default_threshold,
            self.policy.global_default,
            Utc::now(),
        )?;

        self.store.transaction(|tx| -> ServiceResult<()> {
            ensure_category_name_free(tx, category.name(), None)?;
            tx.put_category(category.clone())?;
            Ok(())
        })?;

        info!(category = %category.id(), name = category.name(), "category created");
        Ok(category)
    }

    pub fn update_category(
        &self,
        principal: &Principal,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> ServiceResult<Category> {
        ensure_admin(principal, "edit categories")?;
        self.store.transaction(|tx| -> ServiceResult<Category> {
            let mut category = tx
                .category(id)?
                .ok_or_else(|| DomainError::not_found(format!("category {id}")))?;
            category.apply_patch(patch)?;
            ensure_category_name_free(tx, category.name(), Some(id))?;
            tx.put_category(category.clone())?;
            Ok(category)
        })
    }

    /// Refused while any product still references the category.
    pub fn delete_category(&self, principal: &Principal, id: CategoryId) -> ServiceResult<()> {
        ensure_admin(principal, "delete categories")?;
        self.store.transaction(|tx| -> ServiceResult<()> {
            let category = tx
                .category(id)?
                .ok_or_else(|| DomainError::not_found(format!("category {id}")))?;
            let in_use = tx.products()?.iter().filter(|p| p.category_id() == Some(id)).count();
            if in_use > 0 {
                return Err(DomainError::conflict(format!(
                    "category '{}' is used by {in_use} product(s)",
                    category.name()
                ))
                .into());
            }
            tx.remove_category(id)?;
            Ok(())
        })?;
        info!(category = %id, "category deleted");
        Ok(())
    }

    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        self.store.read(|tx| -> ServiceResult<Vec<Category>> {
            let mut categories = tx.categories()?;
            categories.sort_by(|a, b| a.name().cmp(b.name()));
            Ok(categories)
        })
    }

    // ---- products ----

    /// Create a simple product or a bundle.
    ///
    /// Bundles are validated against the catalog and get derived stock/price.
    pub fn create_product(&self, principal: &Principal, draft: ProductDraft) -> ServiceResult<Product> {
        ensure_admin(principal, "create products")?;
        let product = Product::from_draft(draft, Utc::now())?;

        let product = self
            .store
            .transaction(|tx| -> ServiceResult<Product> {
                ensure_product_name_free(tx, product.name(), None)?;
                ensure_references(tx, product.category_id(), product.supplier_id())?;

                if !product.is_bundle() {
                    tx.put_product(product.clone())?;
                    return Ok(product);
                }

                let quotes = quotes_for(tx, product.components())?;
                validate_bundle_components(product.components(), Some(product.id()), |id| {
                    quotes.get(&id).copied()
                })?;
                let id = product.id();
                tx.put_product(product)?;
                refresh_bundle(tx, id, Utc::now())
            })
            .inspect_err(|e| warn!(error = %e, "product creation rejected"))?;

        info!(
            product = %product.id(),
            name = product.name(),
            bundle = product.is_bundle(),
            stock = product.stock(),
            "product created"
        );
        Ok(product)
    }

    /// Apply a patch.
    ///
    /// Bundles reject direct stock/price edits; new component lists are
    /// validated (the bundle may not list itself) and the bundle is re-derived.
    pub fn update_product(
        &self,
        principal: &Principal,
        id: ProductId,
        patch: ProductPatch,
    ) -> ServiceResult<Product> {
        ensure_admin(principal, "edit products")?;
        let now = Utc::now();

        self.store
            .transaction(|tx| -> ServiceResult<Product> {
                let mut product = load_product(tx, id)?;
                let moves_stock_or_price = patch.touches_stock_or_price();

                if let Some(components) = &patch.bundle_components {
                    let quotes = quotes_for(tx, components)?;
                    validate_bundle_components(components, Some(id), |c| quotes.get(&c).copied())?;
                    if product.components() != components.as_slice() {
                        ensure_no_committed_orders(tx, &product)?;
                    }
                }

                product.apply_patch(patch, now)?;
                ensure_product_name_free(tx, product.name(), Some(id))?;
                ensure_references(tx, product.category_id(), product.supplier_id())?;

                let is_bundle = product.is_bundle();
                tx.put_product(product)?;

                if is_bundle {
                    return refresh_bundle(tx, id, now);
                }
                if moves_stock_or_price {
                    refresh_bundles_containing(tx, &[id], now)?;
                }
                load_product(tx, id)
            })
            .inspect_err(|e| warn!(product = %id, error = %e, "product update rejected"))
    }

    /// Signed manual stock correction for a simple product. Stock never goes
    /// below zero.
    pub fn adjust_stock(
        &self,
        principal: &Principal,
        id: ProductId,
        delta: i64,
    ) -> ServiceResult<Product> {
        ensure_admin(principal, "adjust stock")?;
        let now = Utc::now();

        let (product, bundles) = self
            .store
            .transaction(|tx| -> ServiceResult<(Product, Vec<ProductId>)> {
                let mut product = load_product(tx, id)?;
                product.adjust_stock(delta, now)?;
                tx.put_product(product.clone())?;
                let bundles = refresh_bundles_containing(tx, &[id], now)?;
                Ok((product, bundles))
            })
            .inspect_err(|e| warn!(product = %id, delta, error = %e, "stock adjustment rejected"))?;

        info!(
            product = %id,
            delta,
            stock = product.stock(),
            bundles_refreshed = bundles.len(),
            "stock adjusted"
        );
        Ok(product)
    }

    /// Refused while a bundle lists the product or an open order references it.
    pub fn delete_product(&self, principal: &Principal, id: ProductId) -> ServiceResult<()> {
        ensure_admin(principal, "delete products")?;
        self.store.transaction(|tx| -> ServiceResult<()> {
            let product = load_product(tx, id)?;

            if let Some(bundle) = tx.products()?.iter().find(|p| p.contains_component(id)) {
                return Err(DomainError::conflict(format!(
                    "product '{}' is a component of bundle '{}'",
                    product.name(),
                    bundle.name()
                ))
                .into());
            }
            let open_orders = tx
                .orders()?
                .iter()
                .filter(|o| o.status() != OrderStatus::Cancelled)
                .filter(|o| o.items().iter().any(|l| l.product_id == id))
                .count();
            if open_orders > 0 {
                return Err(DomainError::conflict(format!(
                    "product '{}' is referenced by {open_orders} open order(s)",
                    product.name()
                ))
                .into());
            }

            tx.remove_product(id)?;
            Ok(())
        })?;
        info!(product = %id, "product deleted");
        Ok(())
    }

    pub fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        self.store.read(|tx| load_product(tx, id))
    }

    pub fn list_products(&self) -> ServiceResult<Vec<Product>> {
        self.store.read(|tx| -> ServiceResult<Vec<Product>> {
            let mut products = tx.products()?;
            products.sort_by(|a, b| a.name().cmp(b.name()));
            Ok(products)
        })
    }
}

pub(crate) fn load_product(tx: &dyn StoreTx, id: ProductId) -> ServiceResult<Product> {
    Ok(tx
        .product(id)?
        .ok_or_else(|| DomainError::not_found(format!("product {id}")))?)
}

fn ensure_category_name_free(
    tx: &dyn StoreTx,
    name: &str,
    except: Option<CategoryId>,
) -> ServiceResult<()> {
    let key = normalize_name(name)?;
    let taken = tx
        .categories()?
        .iter()
        .any(|c| Some(c.id()) != except && c.name() == key);
    if taken {
        return Err(DomainError::conflict(format!("category '{key}' already exists")).into());
    }
    Ok(())
}

fn ensure_product_name_free(
    tx: &dyn StoreTx,
    name: &str,
    except: Option<ProductId>,
) -> ServiceResult<()> {
    let key = normalize_name(name)?;
    let taken = tx
        .products()?
        .iter()
        .any(|p| Some(p.id()) != except && p.name() == key);
    if taken {
        return Err(DomainError::conflict(format!("product '{key}' already exists")).into());
    }
    Ok(())
}

/// A bundle's component list is frozen while an order holds stock through it;
/// reversion reads the current list.
fn ensure_no_committed_orders(tx: &dyn StoreTx, bundle: &Product) -> ServiceResult<()> {
    let committed = tx
        .orders()?
        .iter()
        .filter(|o| o.stock_committed())
        .filter(|o| o.items().iter().any(|l| l.product_id == bundle.id()))
        .count();
    if committed > 0 {
        return Err(DomainError::conflict(format!(
            "components of bundle '{}' are held by {committed} fulfilled order(s)",
            bundle.name()
        ))
        .into());
    }
    Ok(())
}

fn ensure_references(
    tx: &dyn StoreTx,
    category: Option<CategoryId>,
    supplier: Option<SupplierId>,
) -> ServiceResult<()> {
    if let Some(id) = category {
        if tx.category(id)?.is_none() {
            return Err(DomainError::validation(format!("category {id} does not exist")).into());
        }
    }
    if let Some(id) = supplier {
        if tx.supplier(id)?.is_none() {
            return Err(DomainError::validation(format!("supplier {id} does not exist")).into());
        }
    }
    Ok(())
}
