//! Tracing and logging setup shared by every process that hosts the services.

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filter, output format).
pub mod tracing;

pub use crate::tracing::{ENV_LOG_FORMAT, LogFormat};
