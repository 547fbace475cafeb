//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stored records (products, categories, orders, suppliers, users) are keyed by
/// this identifier in the inventory store.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
