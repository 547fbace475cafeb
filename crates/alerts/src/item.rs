use serde::{Deserialize, Serialize};

use stockroom_inventory::StockLevel;

/// One row of the low-stock report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub name: String,
    pub sku: String,
    pub current_stock: u64,
    pub threshold: u32,
    /// Category name, if the product has one.
    pub category: Option<String>,
    pub bin_location: Option<String>,
    pub level: StockLevel,
}

impl LowStockItem {
    pub fn is_out_of_stock(&self) -> bool {
        self.level == StockLevel::Out
    }
}
