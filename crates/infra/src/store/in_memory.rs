use std::collections::BTreeMap;
use std::sync::Mutex;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::warn;

use stockroom_auth::User;
use stockroom_catalog::{Category, Product, Supplier};
use stockroom_core::{CategoryId, Entity, OrderId, ProductId, SupplierId, UserId};
use stockroom_orders::Order;

use super::r#trait::{InventoryStore, StoreError, StoreTx};

#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    categories: BTreeMap<CategoryId, Category>,
    orders: BTreeMap<OrderId, Order>,
    suppliers: BTreeMap<SupplierId, Supplier>,
    users: BTreeMap<UserId, User>,
}

impl StoreTx for Tables {
    fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(&id).cloned())
    }

    fn put_product(&mut self, product: Product) -> Result<(), StoreError> {
        self.products.insert(product.id(), product);
        Ok(())
    }

    fn remove_product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.remove(&id))
    }

    fn products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.values().cloned().collect())
    }

    fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.categories.get(&id).cloned())
    }

    fn put_category(&mut self, category: Category) -> Result<(), StoreError> {
        self.categories.insert(category.id(), category);
        Ok(())
    }

    fn remove_category(&mut self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.categories.remove(&id))
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.values().cloned().collect())
    }

    fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(&id).cloned())
    }

    fn put_order(&mut self, order: Order) -> Result<(), StoreError> {
        self.orders.insert(order.id(), order);
        Ok(())
    }

    fn remove_order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.remove(&id))
    }

    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.values().cloned().collect())
    }

    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        Ok(self.suppliers.get(&id).cloned())
    }

    fn put_supplier(&mut self, supplier: Supplier) -> Result<(), StoreError> {
        self.suppliers.insert(supplier.id(), supplier);
        Ok(())
    }

    fn remove_supplier(&mut self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        Ok(self.suppliers.remove(&id))
    }

    fn suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        Ok(self.suppliers.values().cloned().collect())
    }

    fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).cloned())
    }

    fn put_user(&mut self, user: User) -> Result<(), StoreError> {
        self.users.insert(user.id, user);
        Ok(())
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.values().cloned().collect())
    }
}

/// In-memory transactional store.
///
/// Intended for tests/dev. A transaction holds the store lock for its whole
/// duration and works on a copy of the tables, which replaces the committed
/// tables only on success.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    tables: Mutex<Tables>,
    tx_timeout: Option<Duration>,
    #[cfg(test)]
    fail_next_commit: AtomicBool,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort any transaction whose body runs longer than `timeout`.
    pub fn with_tx_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tx_timeout = timeout;
        self
    }

    /// Make the next commit fail after its body has succeeded.
    #[cfg(test)]
    pub(crate) fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut committed = self.lock()?;
        let started = Instant::now();
        let mut working = committed.clone();

        let out = f(&mut working)?;

        if let Some(limit) = self.tx_timeout {
            let elapsed = started.elapsed();
            if elapsed > limit {
                warn!(?elapsed, ?limit, "transaction overran its deadline; rolled back");
                return Err(StoreError::Timeout(limit).into());
            }
        }

        #[cfg(test)]
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::CommitFailed("injected commit failure".to_string()).into());
        }

        *committed = working;
        Ok(out)
    }

    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let committed = self.lock()?;
        f(&*committed)
    }
}
