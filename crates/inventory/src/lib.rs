//! Inventory domain module: bundle stock derivation and low-stock evaluation.
//!
//! Pure, deterministic functions (no IO, no storage). Callers supply current
//! component figures through a lookup closure.

pub mod ledger;
pub mod threshold;

pub use ledger::{
    BUNDLE_DISCOUNT_PERCENT, BundleAggregate, ComponentQuote, compute_bundle_aggregate,
    validate_bundle_components,
};
pub use threshold::{StockLevel, ThresholdPolicy, classify, classify_product, effective_threshold};
