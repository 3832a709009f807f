//! Crate-level error types.
//!
//! [`CorrwatchError`] unifies every failure source (configuration, market
//! data retrieval, insufficient samples) behind a single enum so callers can
//! match on the variant they care about while still using the `?` operator
//! for easy propagation.

use crate::provider::ProviderError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CorrwatchError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum CorrwatchError {
    /// A configuration value is missing, unparseable, or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Historical or live price retrieval failed.
    #[error("data provider error: {0}")]
    DataProvider(#[from] ProviderError),

    /// Too few samples to compute a regression or a price change.
    #[error("insufficient data: need at least {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },
}
