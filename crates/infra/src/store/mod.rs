//! Inventory persistence port and the in-memory transactional adapter.

mod in_memory;
mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use r#trait::{InventoryStore, StoreError, StoreTx};
