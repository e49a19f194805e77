//! Reader error types.

use thiserror::Error;

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or configuring a reader.
///
/// Event conversion itself never fails; rejected events are reported through
/// [`Conversion::Rejected`](crate::Conversion::Rejected).
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid reader configuration.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] femtoaod_core::Error),
}
