use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use stockroom_auth::User;
use stockroom_catalog::{Category, Product, Supplier};
use stockroom_core::{CategoryId, OrderId, ProductId, SupplierId, UserId};
use stockroom_orders::Order;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The transaction body overran its deadline; nothing was committed.
    #[error("transaction exceeded its deadline of {0:?}")]
    Timeout(Duration),

    #[error("commit failed: {0}")]
    CommitFailed(String),
}

/// Reads and writes available inside one transaction.
///
/// Reads observe every write made earlier in the same transaction.
/// `put_*` inserts or replaces by id; `remove_*` returns the removed record.
pub trait StoreTx {
    fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    fn put_product(&mut self, product: Product) -> Result<(), StoreError>;
    fn remove_product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError>;
    fn products(&self) -> Result<Vec<Product>, StoreError>;

    fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;
    fn put_category(&mut self, category: Category) -> Result<(), StoreError>;
    fn remove_category(&mut self, id: CategoryId) -> Result<Option<Category>, StoreError>;
    fn categories(&self) -> Result<Vec<Category>, StoreError>;

    fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    fn put_order(&mut self, order: Order) -> Result<(), StoreError>;
    fn remove_order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError>;
    fn orders(&self) -> Result<Vec<Order>, StoreError>;

    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError>;
    fn put_supplier(&mut self, supplier: Supplier) -> Result<(), StoreError>;
    fn remove_supplier(&mut self, id: SupplierId) -> Result<Option<Supplier>, StoreError>;
    fn suppliers(&self) -> Result<Vec<Supplier>, StoreError>;

    fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    fn put_user(&mut self, user: User) -> Result<(), StoreError>;
    fn users(&self) -> Result<Vec<User>, StoreError>;
}

/// Transactional inventory persistence.
///
/// - `transaction`: `f` runs against an isolated view; its writes commit
///   atomically when it returns `Ok` and are discarded when it returns `Err`.
///   Transactions on one store never interleave.
/// - `read`: a consistent read-only view of committed state.
pub trait InventoryStore: Send + Sync {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>;

    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore,
{
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).transaction(f)
    }

    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).read(f)
    }
}
