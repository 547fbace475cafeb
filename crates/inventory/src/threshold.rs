//! Low-stock threshold resolution and stock classification.

use serde::{Deserialize, Serialize};

use stockroom_catalog::{Category, DEFAULT_LOW_STOCK_THRESHOLD, Product};

/// Global low-stock fallback, used when neither product nor category sets one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub global_default: u32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            global_default: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// Stock classification against the effective threshold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Out,
    Low,
    Normal,
}

impl StockLevel {
    pub fn needs_attention(self) -> bool {
        !matches!(self, StockLevel::Normal)
    }
}

/// Product override, else the category default, else the global fallback.
///
/// `category` is the product's referenced category, if it still exists.
pub fn effective_threshold(
    product: &Product,
    category: Option<&Category>,
    policy: &ThresholdPolicy,
) -> u32 {
    product
        .low_stock_threshold()
        .or_else(|| category.map(Category::default_low_stock_threshold))
        .unwrap_or(policy.global_default)
}

/// `Out` at zero, `Low` when `0 < stock <= threshold`, else `Normal`.
pub fn classify(stock: u64, threshold: u32) -> StockLevel {
    if stock == 0 {
        StockLevel::Out
    } else if stock <= u64::from(threshold) {
        StockLevel::Low
    } else {
        StockLevel::Normal
    }
}

pub fn classify_product(
    product: &Product,
    category: Option<&Category>,
    policy: &ThresholdPolicy,
) -> StockLevel {
    classify(product.stock(), effective_threshold(product, category, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use stockroom_catalog::ProductDraft;
    use stockroom_core::Money;

    fn product(stock: u64, threshold: Option<u32>) -> Product {
        Product::from_draft(
            ProductDraft {
                name: "Drill".to_string(),
                sku: "D-1".to_string(),
                stock: Some(stock),
                price: Some(Money::from_cents(100)),
                low_stock_threshold: threshold,
                ..ProductDraft::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn category(threshold: u32) -> Category {
        Category::new("Tools", None, Some(threshold), DEFAULT_LOW_STOCK_THRESHOLD, Utc::now())
            .unwrap()
    }

    #[test]
    fn category_default_applies_without_override() {
        let c = category(100);
        assert_eq!(effective_threshold(&product(1, None), Some(&c), &ThresholdPolicy::default()), 100);
    }

    #[test]
    fn product_override_wins_over_category() {
        let c = category(100);
        assert_eq!(effective_threshold(&product(1, Some(5)), Some(&c), &ThresholdPolicy::default()), 5);
    }

    #[test]
    fn global_fallback_without_category_or_override() {
        let policy = ThresholdPolicy { global_default: 12 };
        assert_eq!(effective_threshold(&product(1, None), None, &policy), 12);
        assert_eq!(
            effective_threshold(&product(1, None), None, &ThresholdPolicy::default()),
            DEFAULT_LOW_STOCK_THRESHOLD
        );
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(0, 10), StockLevel::Out);
        assert_eq!(classify(1, 10), StockLevel::Low);
        assert_eq!(classify(10, 10), StockLevel::Low);
        assert_eq!(classify(11, 10), StockLevel::Normal);
        assert_eq!(classify(0, 0), StockLevel::Out);
        assert_eq!(classify(1, 0), StockLevel::Normal);
    }

    #[test]
    fn classify_product_uses_effective_threshold() {
        let c = category(20);
        let policy = ThresholdPolicy::default();
        assert_eq!(classify_product(&product(20, None), Some(&c), &policy), StockLevel::Low);
        assert_eq!(classify_product(&product(20, Some(5)), Some(&c), &policy), StockLevel::Normal);
        assert!(!StockLevel::Normal.needs_attention());
        assert!(StockLevel::Out.needs_attention());
    }

    proptest! {
        /// Property: an explicit product override always decides the threshold.
        #[test]
        fn override_always_wins(over in 0u32..10_000, cat in 0u32..10_000, global in 0u32..10_000) {
            let c = category(cat);
            let policy = ThresholdPolicy { global_default: global };
            prop_assert_eq!(effective_threshold(&product(1, Some(over)), Some(&c), &policy), over);
        }

        /// Property: exactly one level applies to any stock figure.
        #[test]
        fn levels_partition_stock(stock in 0u64..100_000, threshold in 0u32..1_000) {
            let level = classify(stock, threshold);
            let expected = match stock {
                0 => StockLevel::Out,
                s if s <= u64::from(threshold) => StockLevel::Low,
                _ => StockLevel::Normal,
            };
            prop_assert_eq!(level, expected);
        }
    }
}
