//! Error types for femtoaod-core.

use thiserror::Error;

/// Result type alias for femtoaod operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types.
///
/// Event conversion itself never fails; these errors come from building
/// configuration objects (tables, curves, option values).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Binned table axis with no bins or an empty range.
    #[error("invalid table axis: {bins} bins over [{low}, {high})")]
    InvalidAxis { bins: usize, low: f64, high: f64 },

    /// Table contents do not match the axis layout.
    #[error("table shape mismatch: expected {expected} bin contents, got {actual}")]
    TableShape { expected: usize, actual: usize },

    /// Legacy 15o pass-2 pile-up year label outside {2, 3}.
    #[error("unknown legacy pile-up year label: {0}")]
    UnknownLegacyYear(i32),

    /// Unrecognised option value.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
