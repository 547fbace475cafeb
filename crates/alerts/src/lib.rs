//! `stockroom-alerts`
//!
//! Low-stock alert composition and the ports the alert job talks through.
//!
//! This crate never reads or mutates stock. It turns a list of
//! [`LowStockItem`]s into an [`AlertMessage`] and hands it to an
//! [`AlertTransport`]; timing is owned by an [`AlertScheduler`].

pub mod item;
pub mod message;
pub mod scheduler;
pub mod transport;

pub use item::LowStockItem;
pub use message::{AlertMessage, compose_alert};
pub use scheduler::AlertScheduler;
pub use transport::{AlertTransport, InMemoryAlertTransport};
