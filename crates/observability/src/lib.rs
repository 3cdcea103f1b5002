//! Tracing/logging setup shared by binaries and tests.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide tracing with the format taken from `LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
