//! REST client for the Binance spot market data endpoints.
//!
//! Only public, unauthenticated endpoints are used:
//! [`klines`](https://developers.binance.com/docs/binance-spot-api-docs/rest-api/market-data-endpoints#klinecandlestick-data)
//! for historical candles and
//! [`ticker/price`](https://developers.binance.com/docs/binance-spot-api-docs/rest-api/market-data-endpoints#symbol-price-ticker)
//! for the latest price.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{MarketDataProvider, ProviderError};
use crate::models::CandleRequest;
use crate::models::candle::Candle;
use crate::models::ticker::PriceTicker;

/// Default public REST endpoint.
pub const DEFAULT_REST_URL: &str = "https://api.binance.com";

const KLINES_PATH: &str = "/api/v3/klines";
const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

/// HTTP market data provider backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    /// Creates a client rooted at `base_url` (e.g. [`DEFAULT_REST_URL`]).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issues a GET request and decodes the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, ?query, "Sending GET request");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_slice(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    /// Fetches one klines page beginning at `start`.
    async fn fetch_candle_page(
        &self,
        request: &CandleRequest,
        start: DateTime<Utc>,
    ) -> Result<Vec<Candle>, ProviderError> {
        let query = [
            ("symbol", request.symbol.clone()),
            ("interval", request.interval.as_str().to_string()),
            ("startTime", start.timestamp_millis().to_string()),
            ("endTime", request.end.timestamp_millis().to_string()),
            ("limit", request.limit.to_string()),
        ];
        let page: Vec<Candle> = self.get(KLINES_PATH, &query).await?;
        debug!(symbol = %request.symbol, count = page.len(), "Received candle page");
        Ok(page)
    }
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, ProviderError> {
        let candles = collect_pages(request, |start| self.fetch_candle_page(request, start)).await?;

        info!(
            symbol = %request.symbol,
            interval = request.interval.as_str(),
            count = candles.len(),
            "Fetched historical candles"
        );
        Ok(candles)
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, ProviderError> {
        let ticker: PriceTicker = self
            .get(TICKER_PRICE_PATH, &[("symbol", symbol.to_string())])
            .await?;

        if ticker.symbol != symbol {
            return Err(ProviderError::Malformed(format!(
                "requested price for {symbol}, received {}",
                ticker.symbol
            )));
        }

        Ok(ticker.price)
    }
}

/// Requests pages from `fetch_page` until the range is exhausted.
async fn collect_pages<F, Fut>(
    request: &CandleRequest,
    mut fetch_page: F,
) -> Result<Vec<Candle>, ProviderError>
where
    F: FnMut(DateTime<Utc>) -> Fut,
    Fut: Future<Output = Result<Vec<Candle>, ProviderError>>,
{
    let mut candles = Vec::new();
    let mut start = request.start;

    loop {
        let page = fetch_page(start).await?;
        let next = next_page_start(&page, start, request)?;
        candles.extend(page);

        match next {
            Some(next) => start = next,
            None => return Ok(candles),
        }
    }
}

/// Decides where the next klines page starts.
///
/// A short page means the range is exhausted. A full page continues one
/// millisecond after its last open time, unless that passes the range end.
fn next_page_start(
    page: &[Candle],
    start: DateTime<Utc>,
    request: &CandleRequest,
) -> Result<Option<DateTime<Utc>>, ProviderError> {
    let Some(last) = page.last() else {
        return Ok(None);
    };
    if page.len() < usize::from(request.limit) {
        return Ok(None);
    }

    let next = last.open_time + Duration::milliseconds(1);
    if next <= start {
        return Err(ProviderError::Malformed(format!(
            "candle page for {} did not advance past {start}",
            request.symbol
        )));
    }

    Ok((next <= request.end).then_some(next))
}

/// Builds an [`ProviderError::Api`] from a non-success response body.
fn api_error(status: u16, body: &[u8]) -> ProviderError {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(err) => ProviderError::Api {
            status,
            code: err.code,
            message: err.msg,
        },
        Err(_) => ProviderError::Api {
            status,
            code: 0,
            message: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}
