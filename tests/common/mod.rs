//! Shared test utilities: candle builders and a scripted provider.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use corrwatch::models::CandleRequest;
use corrwatch::models::candle::Candle;
use corrwatch::provider::{MarketDataProvider, ProviderError};

/// 2021-01-01T00:00:00Z, the default range start.
pub const START_MS: i64 = 1_609_459_200_000;
pub const DAY_MS: i64 = 86_400_000;

pub fn day(n: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(START_MS + n * DAY_MS).expect("valid timestamp")
}

/// Builds a daily candle opening on `day(n)` with the given close.
pub fn daily_candle(n: i64, close: Decimal) -> Candle {
    Candle {
        open_time: day(n),
        open: close,
        high: close,
        low: close,
        close,
        volume: Decimal::ONE,
        close_time: day(n) + Duration::milliseconds(DAY_MS - 1),
        quote_volume: close,
        trades: 1,
        taker_buy_base_volume: Decimal::ZERO,
        taker_buy_quote_volume: Decimal::ZERO,
        ignore: serde_json::Value::String("0".into()),
    }
}

/// Consecutive daily candles starting at day 0.
pub fn daily_candles(closes: &[Decimal]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| daily_candle(i as i64, *close))
        .collect()
}

/// In-memory provider returning canned candles and a queue of prices.
///
/// Price entries are consumed in order; an `Err` entry becomes a
/// [`ProviderError::Api`] with status 503. An exhausted queue repeats the
/// last price.
#[derive(Default)]
pub struct ScriptedProvider {
    candles: HashMap<String, Vec<Candle>>,
    prices: Mutex<VecDeque<Result<Decimal, String>>>,
    last_price: Mutex<Option<Decimal>>,
    pub candle_requests: Mutex<Vec<CandleRequest>>,
    pub price_polls: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.candles.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_prices(self, prices: impl IntoIterator<Item = Result<Decimal, String>>) -> Self {
        self.prices.lock().unwrap().extend(prices);
        self
    }

    pub fn polls(&self) -> usize {
        *self.price_polls.lock().unwrap()
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, ProviderError> {
        self.candle_requests.lock().unwrap().push(request.clone());
        self.candles
            .get(&request.symbol)
            .map(|candles| {
                candles
                    .iter()
                    .filter(|c| c.open_time >= request.start && c.open_time <= request.end)
                    .cloned()
                    .collect()
            })
            .ok_or_else(|| ProviderError::Api {
                status: 400,
                code: -1121,
                message: "Invalid symbol.".to_string(),
            })
    }

    async fn fetch_price(&self, _symbol: &str) -> Result<Decimal, ProviderError> {
        *self.price_polls.lock().unwrap() += 1;

        let next = self.prices.lock().unwrap().pop_front();
        let mut last = self.last_price.lock().unwrap();
        match next {
            Some(Ok(price)) => {
                *last = Some(price);
                Ok(price)
            }
            Some(Err(message)) => Err(ProviderError::Api {
                status: 503,
                code: 0,
                message,
            }),
            None => last.ok_or_else(|| ProviderError::Malformed("no scripted price".into())),
        }
    }
}

/// Provider whose requests never complete, like a stalled connection.
pub struct HungProvider;

#[async_trait]
impl MarketDataProvider for HungProvider {
    async fn fetch_candles(&self, _request: &CandleRequest) -> Result<Vec<Candle>, ProviderError> {
        std::future::pending().await
    }

    async fn fetch_price(&self, _symbol: &str) -> Result<Decimal, ProviderError> {
        std::future::pending().await
    }
}
