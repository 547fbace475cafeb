//! Service wiring for a hosting process.

use std::sync::Arc;

use stockroom_alerts::AlertTransport;

use crate::alerts::LowStockAlertRunnerHandle;
use crate::catalog_service::CatalogService;
use crate::config::StockroomConfig;
use crate::order_lifecycle::OrderService;
use crate::reports::ReportService;
use crate::store::{InMemoryInventoryStore, InventoryStore};
use crate::supplier_service::SupplierService;
use crate::user_service::UserService;

/// All services over one shared store.
pub struct Stockroom<S> {
    pub config: StockroomConfig,
    pub store: Arc<S>,
    pub catalog: CatalogService<S>,
    pub orders: OrderService<S>,
    pub suppliers: SupplierService<S>,
    pub users: UserService<S>,
    pub reports: ReportService<S>,
}

impl<S: InventoryStore + 'static> Stockroom<S> {
    pub fn new(store: Arc<S>, config: StockroomConfig) -> Self {
        let policy = config.threshold_policy;
        Self {
            catalog: CatalogService::new(Arc::clone(&store), policy),
            orders: OrderService::new(Arc::clone(&store)),
            suppliers: SupplierService::new(Arc::clone(&store)),
            users: UserService::new(Arc::clone(&store)),
            reports: ReportService::new(Arc::clone(&store), policy),
            store,
            config,
        }
    }

    /// Start the scheduled low-stock alert job.
    pub fn spawn_alert_runner<T: AlertTransport>(
        &self,
        transport: Arc<T>,
    ) -> std::io::Result<LowStockAlertRunnerHandle> {
        self.config.alerts.spawn(
            "low-stock-alerts",
            Arc::clone(&self.store),
            self.config.threshold_policy,
            transport,
        )
    }
}

impl Stockroom<InMemoryInventoryStore> {
    /// In-memory wiring for tests/dev, honoring the configured transaction deadline.
    pub fn in_memory(config: StockroomConfig) -> Self {
        let store = InMemoryInventoryStore::new().with_tx_timeout(config.store.tx_timeout);
        Self::new(Arc::new(store), config)
    }
}
