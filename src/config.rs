//! Application configuration loaded from environment variables.
//!
//! Every setting is optional and defaults to the values the monitor was
//! originally tuned with (ETH regressed on BTC, daily candles from
//! 2021-01-01 to 2022-03-28, hourly polling, 1% threshold):
//!
//! - `CORRWATCH_REST_URL` — market data REST endpoint
//! - `CORRWATCH_DEPENDENT_SYMBOL` / `CORRWATCH_INDEPENDENT_SYMBOL` — regression pair
//! - `CORRWATCH_INTERVAL` — candle interval code (e.g. `1d`)
//! - `CORRWATCH_START_TIME_MS` / `CORRWATCH_END_TIME_MS` — closed range, epoch millis
//! - `CORRWATCH_CANDLE_LIMIT` — candles per request, `1..=1000`
//! - `CORRWATCH_MONITOR_SYMBOL` — polled symbol, defaults to the dependent symbol
//! - `CORRWATCH_POLL_INTERVAL_SECS` — seconds between polls
//! - `CORRWATCH_WINDOW_MINUTES` — observation window span
//! - `CORRWATCH_ALERT_THRESHOLD_PCT` — adjusted move that triggers an alert
//!
//! Empty values are treated as unset.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{CandleRequest, Interval};
use crate::provider::binance::DEFAULT_REST_URL;
use crate::{CorrwatchError, Result};

const DEFAULT_DEPENDENT_SYMBOL: &str = "ETHUSDT";
const DEFAULT_INDEPENDENT_SYMBOL: &str = "BTCUSDT";
/// 2021-01-01T00:00:00Z
const DEFAULT_START_TIME_MS: i64 = 1_609_459_200_000;
/// 2022-03-28T00:00:00Z
const DEFAULT_END_TIME_MS: i64 = 1_648_416_000_000;
const DEFAULT_CANDLE_LIMIT: u16 = 500;
/// Largest page the klines endpoint serves.
const MAX_CANDLE_LIMIT: u16 = 1000;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3600);
const DEFAULT_WINDOW_MINUTES: i64 = 60;
const DEFAULT_ALERT_THRESHOLD_PCT: f64 = 1.0;

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rest_url: String,
    pub correlation: CorrelationConfig,
    pub monitor: MonitorConfig,
}

/// Historical regression inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationConfig {
    /// Asset whose returns are explained.
    pub dependent_symbol: String,
    /// Asset whose returns explain.
    pub independent_symbol: String,
    pub interval: Interval,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub limit: u16,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            dependent_symbol: DEFAULT_DEPENDENT_SYMBOL.to_string(),
            independent_symbol: DEFAULT_INDEPENDENT_SYMBOL.to_string(),
            interval: Interval::OneDay,
            start: DateTime::from_timestamp_millis(DEFAULT_START_TIME_MS).unwrap_or_default(),
            end: DateTime::from_timestamp_millis(DEFAULT_END_TIME_MS).unwrap_or_default(),
            limit: DEFAULT_CANDLE_LIMIT,
        }
    }
}

impl CorrelationConfig {
    /// Returns the candle request shared by both symbols.
    ///
    /// # Errors
    ///
    /// Returns [`CorrwatchError::Config`] if the range is empty or the page
    /// size is outside `1..=1000`.
    pub fn candle_request(&self) -> Result<CandleRequest> {
        if self.start >= self.end {
            return Err(CorrwatchError::Config(format!(
                "empty time range: start {} is not before end {}",
                self.start, self.end
            )));
        }
        if !(1..=MAX_CANDLE_LIMIT).contains(&self.limit) {
            return Err(CorrwatchError::Config(format!(
                "candle limit {} outside 1..={MAX_CANDLE_LIMIT}",
                self.limit
            )));
        }

        Ok(CandleRequest {
            symbol: self.dependent_symbol.clone(),
            interval: self.interval,
            start: self.start,
            end: self.end,
            limit: self.limit,
        })
    }
}

/// Live price monitoring parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub symbol: String,
    pub poll_interval: Duration,
    /// Observations older than this, relative to the newest, are evicted.
    pub window: TimeDelta,
    /// Percentage that the R²-adjusted move must exceed to alert.
    pub alert_threshold_pct: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_DEPENDENT_SYMBOL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            window: TimeDelta::minutes(DEFAULT_WINDOW_MINUTES),
            alert_threshold_pct: DEFAULT_ALERT_THRESHOLD_PCT,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`CorrwatchError::Config`] if a value cannot be parsed, the time
/// range is empty, a duration is zero, or the threshold is not positive.
pub fn fetch_config() -> Result<AppConfig> {
    let rest_url =
        non_empty_var("CORRWATCH_REST_URL").unwrap_or_else(|| DEFAULT_REST_URL.to_string());

    let defaults = CorrelationConfig::default();
    let dependent_symbol =
        non_empty_var("CORRWATCH_DEPENDENT_SYMBOL").unwrap_or(defaults.dependent_symbol);
    let correlation = CorrelationConfig {
        independent_symbol: non_empty_var("CORRWATCH_INDEPENDENT_SYMBOL")
            .unwrap_or(defaults.independent_symbol),
        interval: parse_var("CORRWATCH_INTERVAL")?.unwrap_or(defaults.interval),
        start: parse_millis_var("CORRWATCH_START_TIME_MS")?.unwrap_or(defaults.start),
        end: parse_millis_var("CORRWATCH_END_TIME_MS")?.unwrap_or(defaults.end),
        limit: parse_var("CORRWATCH_CANDLE_LIMIT")?.unwrap_or(defaults.limit),
        dependent_symbol: dependent_symbol.clone(),
    };
    correlation.candle_request()?;

    let poll_secs: u64 = parse_var("CORRWATCH_POLL_INTERVAL_SECS")?
        .unwrap_or(DEFAULT_POLL_INTERVAL.as_secs());
    if poll_secs == 0 {
        return Err(CorrwatchError::Config(
            "CORRWATCH_POLL_INTERVAL_SECS must be positive".to_string(),
        ));
    }

    let window_minutes: i64 =
        parse_var("CORRWATCH_WINDOW_MINUTES")?.unwrap_or(DEFAULT_WINDOW_MINUTES);
    let window = TimeDelta::try_minutes(window_minutes)
        .filter(|w| *w > TimeDelta::zero())
        .ok_or_else(|| {
            CorrwatchError::Config(format!(
                "CORRWATCH_WINDOW_MINUTES must be positive, got {window_minutes}"
            ))
        })?;

    let alert_threshold_pct: f64 =
        parse_var("CORRWATCH_ALERT_THRESHOLD_PCT")?.unwrap_or(DEFAULT_ALERT_THRESHOLD_PCT);
    if !alert_threshold_pct.is_finite() || alert_threshold_pct <= 0.0 {
        return Err(CorrwatchError::Config(format!(
            "CORRWATCH_ALERT_THRESHOLD_PCT must be a positive number, got {alert_threshold_pct}"
        )));
    }

    Ok(AppConfig {
        rest_url,
        correlation,
        monitor: MonitorConfig {
            symbol: non_empty_var("CORRWATCH_MONITOR_SYMBOL").unwrap_or(dependent_symbol),
            poll_interval: Duration::from_secs(poll_secs),
            window,
            alert_threshold_pct,
        },
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Parses a non-empty environment variable into `T`.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    non_empty_var(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| CorrwatchError::Config(format!("invalid {name} {raw:?}: {e}")))
        })
        .transpose()
}

/// Parses a millisecond epoch timestamp variable.
fn parse_millis_var(name: &str) -> Result<Option<DateTime<Utc>>> {
    parse_var::<i64>(name)?
        .map(|ms| {
            DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                CorrwatchError::Config(format!("{name} {ms} is out of range"))
            })
        })
        .transpose()
}
