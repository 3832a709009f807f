//! Market data provider abstraction.
//!
//! [`MarketDataProvider`] is the seam between the statistics/monitoring code
//! and the exchange REST API. [`binance::BinanceClient`] is the HTTP
//! implementation; tests substitute scripted in-memory providers.

pub mod binance;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::CandleRequest;
use crate::models::candle::Candle;

pub use binance::BinanceClient;

/// Source of historical candles and live prices.
///
/// The trait is object safe so monitors can share a `dyn` provider.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches every candle whose open time lies in the request's range,
    /// ordered by open time.
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, ProviderError>;

    /// Fetches the latest traded price for `symbol`.
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, ProviderError>;
}

/// Errors that can occur within a [`MarketDataProvider`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request failed (connection, timeout, body decoding).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    /// The response parsed but its content is unusable.
    #[error("malformed response: {0}")]
    Malformed(String),
}
