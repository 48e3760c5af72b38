//! Logging setup shared by storefront binaries and tests.

pub mod tracing;

pub use crate::tracing::{LogFormat, init_with};

/// Install the process-wide log subscriber. Safe to call more than once.
pub fn init() {
    tracing::init();
}
