//! OHLC candle models returned by the klines endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// A single OHLC candlestick bar.
///
/// The endpoint encodes each candle as a 12-element JSON array rather than
/// an object; serde's derived sequence visitor maps the elements onto these
/// fields in declaration order. Prices and volumes arrive as quoted decimal
/// strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candle {
    /// Start timestamp of this candle's time window.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub open_time: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub volume: Decimal,
    /// Last millisecond covered by this candle.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub close_time: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub quote_volume: Decimal,
    pub trades: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub taker_buy_base_volume: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub taker_buy_quote_volume: Decimal,
    /// Unused by the exchange; always `"0"`.
    pub ignore: serde_json::Value,
}
