//! `stockroom-auth`: principals, roles, and authorization guards.
//!
//! This crate is decoupled from HTTP and storage: the hosting layer resolves the
//! caller into a [`Principal`] and passes it explicitly into every operation.

pub mod authorize;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, ensure_admin, ensure_owner_or_admin};
pub use principal::Principal;
pub use roles::Role;
pub use user::{NotificationPreferences, User};
