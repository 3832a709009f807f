//! Correlation estimation between two assets' returns.
//!
//! Fetches both assets' candles over the same range and interval, derives
//! per-candle returns, aligns them on timestamp and regresses the dependent
//! asset's returns on the independent asset's.

use tracing::{error, info};

use crate::config::CorrelationConfig;
use crate::models::candle::Candle;
use crate::models::series::{PairedReturns, PriceSeries};
use crate::provider::MarketDataProvider;
use crate::regression::{self, RegressionResult};
use crate::{CorrwatchError, Result};

/// Fetches historical candles and fits the returns regression.
///
/// # Errors
///
/// Returns [`CorrwatchError::Config`] for an empty time range,
/// [`CorrwatchError::DataProvider`] if either fetch fails or returns
/// unusable prices, and [`CorrwatchError::InsufficientData`] if fewer than
/// two return pairs share a timestamp.
pub async fn estimate(
    provider: &dyn MarketDataProvider,
    config: &CorrelationConfig,
) -> Result<RegressionResult> {
    let request = config.candle_request()?;
    let dependent_request = request.for_symbol(&config.dependent_symbol);
    let independent_request = request.for_symbol(&config.independent_symbol);

    let (dependent, independent) = tokio::try_join!(
        provider.fetch_candles(&dependent_request),
        provider.fetch_candles(&independent_request),
    )
    .inspect_err(|e| error!("Failed to fetch historical candles: {e}"))?;

    let result = estimate_from_candles(&dependent, &independent)?;

    info!(
        dependent = %config.dependent_symbol,
        independent = %config.independent_symbol,
        "Coefficients: [{}]",
        result.slope
    );
    info!(
        intercept = result.intercept,
        samples = result.samples,
        "R-squared: {}",
        result.r_squared
    );

    Ok(result)
}

/// Fits the returns regression on already fetched candles.
///
/// # Errors
///
/// See [`estimate`]; no I/O is performed.
pub fn estimate_from_candles(
    dependent: &[Candle],
    independent: &[Candle],
) -> Result<RegressionResult> {
    let dependent_returns = PriceSeries::from_candles(dependent)?.returns();
    let independent_returns = PriceSeries::from_candles(independent)?.returns();

    let paired = PairedReturns::inner_join(&dependent_returns, &independent_returns);
    if paired.len() < regression::MIN_SAMPLES {
        return Err(CorrwatchError::InsufficientData {
            required: regression::MIN_SAMPLES,
            available: paired.len(),
        });
    }

    regression::fit(&paired.independent, &paired.dependent)
}
