//! Low-stock reporting over the committed catalog.

use std::collections::HashMap;
use std::sync::Arc;

use stockroom_alerts::LowStockItem;
use stockroom_catalog::Category;
use stockroom_core::{CategoryId, Entity, ProductId};
use stockroom_inventory::{StockLevel, ThresholdPolicy, classify_product, effective_threshold};

use crate::catalog_service::load_product;
use crate::error::ServiceResult;
use crate::store::{InventoryStore, StoreError, StoreTx};

pub struct ReportService<S> {
    store: Arc<S>,
    policy: ThresholdPolicy,
}

impl<S> Clone for ReportService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: InventoryStore> ReportService<S> {
    pub fn new(store: Arc<S>, policy: ThresholdPolicy) -> Self {
        Self { store, policy }
    }

    /// Every product at or below its effective threshold, lowest stock first.
    pub fn list_low_stock_items(&self) -> ServiceResult<Vec<LowStockItem>> {
        Ok(self.store.read(|tx| low_stock_items(tx, &self.policy))?)
    }

    pub fn classify_stock(&self, product_id: ProductId) -> ServiceResult<StockLevel> {
        self.store.read(|tx| -> ServiceResult<StockLevel> {
            let product = load_product(tx, product_id)?;
            let category = category_of(tx, product.category_id())?;
            Ok(classify_product(&product, category.as_ref(), &self.policy))
        })
    }

    pub fn get_effective_threshold(&self, product_id: ProductId) -> ServiceResult<u32> {
        self.store.read(|tx| -> ServiceResult<u32> {
            let product = load_product(tx, product_id)?;
            let category = category_of(tx, product.category_id())?;
            Ok(effective_threshold(&product, category.as_ref(), &self.policy))
        })
    }
}

/// Low and out-of-stock items, sorted by ascending stock then name.
pub fn low_stock_items(
    tx: &dyn StoreTx,
    policy: &ThresholdPolicy,
) -> Result<Vec<LowStockItem>, StoreError> {
    let categories: HashMap<CategoryId, Category> =
        tx.categories()?.into_iter().map(|c| (c.id(), c)).collect();

    let mut items: Vec<LowStockItem> = tx
        .products()?
        .iter()
        .filter_map(|product| {
            let category = product.category_id().and_then(|id| categories.get(&id));
            let threshold = effective_threshold(product, category, policy);
            let level = classify_product(product, category, policy);
            level.needs_attention().then(|| LowStockItem {
                name: product.name().to_string(),
                sku: product.sku().to_string(),
                current_stock: product.stock(),
                threshold,
                category: category.map(|c| c.name().to_string()),
                bin_location: product.bin_location().map(str::to_string),
                level,
            })
        })
        .collect();

    items.sort_by(|a, b| {
        a.current_stock
            .cmp(&b.current_stock)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(items)
}

fn category_of(tx: &dyn StoreTx, id: Option<CategoryId>) -> Result<Option<Category>, StoreError> {
    match id {
        Some(id) => tx.category(id),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_auth::Principal;
    use stockroom_catalog::{BundleComponent, ProductDraft};
    use stockroom_core::{Money, UserId};

    use crate::catalog_service::CatalogService;
    use crate::store::InMemoryInventoryStore;

    struct Fixture {
        catalog: CatalogService<InMemoryInventoryStore>,
        reports: ReportService<InMemoryInventoryStore>,
        admin: Principal,
    }

    fn fixture(global_default: u32) -> Fixture {
        let store = Arc::new(InMemoryInventoryStore::new());
        let policy = ThresholdPolicy { global_default };
        Fixture {
            catalog: CatalogService::new(Arc::clone(&store), policy),
            reports: ReportService::new(store, policy),
            admin: Principal::admin(UserId::new()),
        }
    }

    fn draft(name: &str, stock: u64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            sku: name.to_uppercase(),
            stock: Some(stock),
            price: Some(Money::from_cents(100)),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn threshold_resolution_scenarios() {
        let f = fixture(50);
        let tools = f
            .catalog
            .create_category(&f.admin, "Tools", None, Some(100))
            .unwrap();

        let plain = f
            .catalog
            .create_product(&f.admin, ProductDraft { category_id: Some(tools.id()), ..draft("saw", 1) })
            .unwrap();
        let overridden = f
            .catalog
            .create_product(
                &f.admin,
                ProductDraft {
                    category_id: Some(tools.id()),
                    low_stock_threshold: Some(5),
                    ..draft("drill", 1)
                },
            )
            .unwrap();
        let loose = f.catalog.create_product(&f.admin, draft("glue", 1)).unwrap();

        assert_eq!(f.reports.get_effective_threshold(plain.id()).unwrap(), 100);
        assert_eq!(f.reports.get_effective_threshold(overridden.id()).unwrap(), 5);
        assert_eq!(f.reports.get_effective_threshold(loose.id()).unwrap(), 50);
    }

    #[test]
    fn classify_stock_reports_levels() {
        let f = fixture(10);
        let empty = f.catalog.create_product(&f.admin, draft("empty", 0)).unwrap();
        let low = f.catalog.create_product(&f.admin, draft("low", 10)).unwrap();
        let fine = f.catalog.create_product(&f.admin, draft("fine", 11)).unwrap();

        assert_eq!(f.reports.classify_stock(empty.id()).unwrap(), StockLevel::Out);
        assert_eq!(f.reports.classify_stock(low.id()).unwrap(), StockLevel::Low);
        assert_eq!(f.reports.classify_stock(fine.id()).unwrap(), StockLevel::Normal);
        assert_eq!(f.reports.classify_stock(ProductId::new()).unwrap_err().code(), "not_found");
    }

    #[test]
    fn low_stock_list_is_sorted_and_includes_bundles() {
        let f = fixture(10);
        let a = f.catalog.create_product(&f.admin, draft("bolt", 4)).unwrap();
        f.catalog.create_product(&f.admin, draft("anchor", 4)).unwrap();
        f.catalog.create_product(&f.admin, draft("washer", 0)).unwrap();
        f.catalog.create_product(&f.admin, draft("plenty", 500)).unwrap();
        f.catalog
            .create_product(
                &f.admin,
                ProductDraft {
                    name: "bolt kit".to_string(),
                    sku: "BK".to_string(),
                    bundle_components: Some(vec![BundleComponent::new(a.id(), 2)]),
                    ..ProductDraft::default()
                },
            )
            .unwrap();

        let items = f.reports.list_low_stock_items().unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["washer", "bolt kit", "anchor", "bolt"]);
        assert_eq!(items[0].level, StockLevel::Out);
        assert_eq!(items[1].current_stock, 2);
        assert!(items.iter().all(|i| i.threshold == 10));
    }
}
