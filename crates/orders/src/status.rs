use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::DomainError;

/// Order status lifecycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Shipped and Delivered: the states at which stock has left the shelf.
    pub fn is_fulfilled(self) -> bool {
        matches!(self, OrderStatus::Shipped | OrderStatus::Delivered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation(format!("unknown order status '{wanted}'")))
    }
}

/// What a status change must do to stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockEffect {
    None,
    Deduct,
    Revert,
}

/// Decide the stock effect of moving to `to`, given whether the order's
/// line quantities are currently deducted from stock (`committed`).
///
/// - into Shipped/Delivered while uncommitted: deduct
/// - into Cancelled while committed: revert
/// - anything else: no effect
///
/// Deductions and reversions of one order strictly alternate, starting with
/// a deduction.
pub fn plan_stock_effect(to: OrderStatus, committed: bool) -> StockEffect {
    match (to, committed) {
        (to, false) if to.is_fulfilled() => StockEffect::Deduct,
        (OrderStatus::Cancelled, true) => StockEffect::Revert,
        _ => StockEffect::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn only_shipped_and_delivered_are_fulfilled() {
        let fulfilled: Vec<_> = OrderStatus::ALL.into_iter().filter(|s| s.is_fulfilled()).collect();
        assert_eq!(fulfilled, vec![Shipped, Delivered]);
    }

    #[test]
    fn entering_fulfilment_deducts_once() {
        assert_eq!(plan_stock_effect(Shipped, false), StockEffect::Deduct);
        assert_eq!(plan_stock_effect(Delivered, false), StockEffect::Deduct);
        assert_eq!(plan_stock_effect(Shipped, true), StockEffect::None);
        assert_eq!(plan_stock_effect(Delivered, true), StockEffect::None);
    }

    #[test]
    fn cancelling_reverts_only_committed_stock() {
        assert_eq!(plan_stock_effect(Cancelled, true), StockEffect::Revert);
        assert_eq!(plan_stock_effect(Cancelled, false), StockEffect::None);
    }

    #[test]
    fn pending_and_processing_have_no_effect() {
        for committed in [false, true] {
            assert_eq!(plan_stock_effect(Pending, committed), StockEffect::None);
            assert_eq!(plan_stock_effect(Processing, committed), StockEffect::None);
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), Shipped);
        assert!(matches!("lost".parse::<OrderStatus>(), Err(DomainError::Validation(_))));
        assert_eq!(serde_json::to_string(&Delivered).unwrap(), "\"delivered\"");
    }
}
