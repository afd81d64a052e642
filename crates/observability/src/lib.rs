//! Tracing/logging setup shared by the binaries.

/// Initialize process-wide logging with the format taken from `LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, formats).
pub mod tracing;

pub use self::tracing::LogFormat;
