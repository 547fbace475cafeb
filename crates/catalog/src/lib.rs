//! Catalog domain module: categories, products (simple and bundle), suppliers.
//!
//! Pure domain types and local validation only (no IO, no storage). Rules that
//! need other records (bundle composition, uniqueness) are enforced by callers
//! that hold a store transaction.

pub mod category;
pub mod naming;
pub mod product;
pub mod supplier;

pub use category::{Category, CategoryPatch, DEFAULT_LOW_STOCK_THRESHOLD};
pub use naming::normalize_name;
pub use product::{BundleComponent, Product, ProductDraft, ProductKind, ProductPatch};
pub use supplier::{Supplier, SupplierContact, SupplierPatch};
