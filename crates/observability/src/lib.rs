//! Tracing/logging setup shared by bordertally binaries.

/// Tracing configuration (filters, formats).
pub mod tracing;

pub use tracing::LogFormat;

/// Initialize process-wide logging with the format named by
/// `BORDERTALLY_LOG_FORMAT` (`json` by default, or `pretty`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var(tracing::LOG_FORMAT_VAR)
        .ok()
        .and_then(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    tracing::init(format);
}
