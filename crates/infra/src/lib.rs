//! Infrastructure layer: the inventory store, the services that run domain
//! rules inside store transactions, the alert job, and configuration.

pub mod alerts;
pub mod app;
pub mod bundle_stock;
pub mod catalog_service;
pub mod config;
pub mod error;
pub mod order_lifecycle;
pub mod reports;
pub mod store;
pub mod supplier_service;
pub mod user_service;

pub use alerts::{AlertOutcome, LowStockAlertRunner, LowStockAlertRunnerHandle, run_low_stock_check};
pub use app::Stockroom;
pub use catalog_service::CatalogService;
pub use config::{ConfigError, StockroomConfig, StoreConfig};
pub use error::{ServiceError, ServiceResult};
pub use order_lifecycle::OrderService;
pub use reports::ReportService;
pub use store::{InMemoryInventoryStore, InventoryStore, StoreError, StoreTx};
pub use supplier_service::SupplierService;
pub use user_service::UserService;
