//! Customer orders: line-item snapshots, the status lifecycle, and the stock
//! effect each status change implies.
//!
//! This crate contains deterministic domain logic only (no IO, no storage).
//! Applying the stock effects is the job of the hosting service.

pub mod order;
pub mod status;
pub mod update;

pub use order::{CategoryRef, LineItem, Order};
pub use status::{OrderStatus, StockEffect, plan_stock_effect};
pub use update::{OrderRequestItem, OrderUpdate, authorize_update};
