//! Live price monitoring with a correlation-adjusted alert rule.
//!
//! [`PriceMonitor`] polls one symbol on a fixed schedule, keeps the recent
//! prices in an [`ObservationWindow`] and classifies each cycle:
//!
//! ```text
//! change   = (latest - earliest) / earliest * 100
//! adjusted = |change| * (1 - R²)
//! alert if adjusted > threshold
//! ```
//!
//! A high R² means the move is largely explained by the other asset, so the
//! monitor needs a proportionally larger move before alerting.

mod window;

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::prelude::ToPrimitive;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::config::MonitorConfig;
use crate::provider::{MarketDataProvider, ProviderError};

pub use window::{Observation, ObservationWindow};

/// Outcome of one monitoring cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assessment {
    /// The adjusted move exceeded the threshold.
    Alert { change_pct: f64, adjusted: f64 },
    /// The adjusted move stayed at or below the threshold.
    NoSignificantChange { change_pct: f64, adjusted: f64 },
    /// The window holds fewer than two observations.
    InsufficientData { samples: usize },
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alert { change_pct, .. } => {
                write!(f, "Price change over the window: {change_pct:+.2}%")
            }
            Self::NoSignificantChange { .. } => f.write_str("No significant price change"),
            Self::InsufficientData { samples } => {
                write!(f, "Insufficient data: {samples} observation(s) in window")
            }
        }
    }
}

/// A classified observation emitted by a running monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorEvent {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub assessment: Assessment,
}

/// Absolute percentage change discounted by the explained variance.
#[must_use]
pub fn adjusted_magnitude(change_pct: f64, r_squared: f64) -> f64 {
    change_pct.abs() * (1.0 - r_squared)
}

/// Applies the alert rule to the current window contents.
#[must_use]
pub fn assess(window: &ObservationWindow, r_squared: f64, threshold_pct: f64) -> Assessment {
    let Ok(change_pct) = window.change_pct() else {
        return Assessment::InsufficientData {
            samples: window.len(),
        };
    };

    let adjusted = adjusted_magnitude(change_pct, r_squared);
    if adjusted > threshold_pct {
        Assessment::Alert {
            change_pct,
            adjusted,
        }
    } else {
        Assessment::NoSignificantChange {
            change_pct,
            adjusted,
        }
    }
}

/// Polls one symbol and alerts on correlation-adjusted moves.
pub struct PriceMonitor {
    config: MonitorConfig,
    r_squared: f64,
    window: ObservationWindow,
    events: Option<mpsc::Sender<MonitorEvent>>,
}

impl PriceMonitor {
    /// Creates a monitor; `r_squared` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(config: MonitorConfig, r_squared: f64) -> Self {
        let window = ObservationWindow::new(config.window);
        Self {
            config,
            r_squared: r_squared.clamp(0.0, 1.0),
            window,
            events: None,
        }
    }

    /// Forwards every cycle's [`MonitorEvent`] to `tx`.
    ///
    /// Events are dropped while the channel is full; the monitor never waits
    /// on a slow receiver.
    #[must_use]
    pub fn with_events(mut self, tx: mpsc::Sender<MonitorEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn window(&self) -> &ObservationWindow {
        &self.window
    }

    /// Records one observation and classifies the resulting window.
    pub fn observe(&mut self, timestamp: DateTime<Utc>, price: f64) -> Assessment {
        self.window.record(timestamp, price);
        assess(&self.window, self.r_squared, self.config.alert_threshold_pct)
    }

    /// Runs the polling loop until `shutdown` flips to `true`.
    ///
    /// The first poll happens immediately and later polls follow the
    /// configured period. Each observation is stamped with its scheduled
    /// cycle time rather than the response time, so consecutive samples are
    /// exactly one period apart and a period equal to the window span keeps
    /// the previous sample on the window boundary.
    ///
    /// The shutdown signal is checked before every poll and interrupts both
    /// an in-flight poll and the wait between polls. A dropped sender never
    /// triggers shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`CorrwatchError::DataProvider`](crate::CorrwatchError::DataProvider)
    /// on the first failed or unusable price poll.
    pub async fn run(
        &mut self,
        provider: &dyn MarketDataProvider,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let (anchor_instant, anchor_time) = (Instant::now(), Utc::now());
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            symbol = %self.config.symbol,
            r_squared = self.r_squared,
            poll_secs = self.config.poll_interval.as_secs(),
            "Starting price monitor"
        );

        loop {
            let scheduled = tokio::select! {
                biased;
                () = shutdown_requested(&mut shutdown) => break,
                scheduled = ticker.tick() => scheduled,
            };

            let polled = tokio::select! {
                biased;
                () = shutdown_requested(&mut shutdown) => None,
                polled = self.poll_price(provider) => Some(polled),
            };
            let Some(polled) = polled else {
                break;
            };
            let price = polled.inspect_err(|e| {
                error!(symbol = %self.config.symbol, "Price poll failed: {e}");
            })?;

            // Elapsed process time always fits in a TimeDelta.
            let elapsed = TimeDelta::from_std(scheduled.duration_since(anchor_instant))
                .unwrap_or_default();
            let timestamp = anchor_time + elapsed;

            let assessment = self.observe(timestamp, price);
            self.report(timestamp, price, assessment);
        }

        info!(symbol = %self.config.symbol, "Price monitor stopped");
        Ok(())
    }

    async fn poll_price(&self, provider: &dyn MarketDataProvider) -> Result<f64> {
        let price = provider.fetch_price(&self.config.symbol).await?;

        let value = price
            .to_f64()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| {
                ProviderError::Malformed(format!(
                    "invalid price {price} for {}",
                    self.config.symbol
                ))
            })?;

        Ok(value)
    }

    fn report(&self, timestamp: DateTime<Utc>, price: f64, assessment: Assessment) {
        let symbol = &self.config.symbol;
        match assessment {
            Assessment::Alert {
                change_pct,
                adjusted,
            } => warn!(%symbol, price, change_pct, adjusted, "{assessment}"),
            Assessment::NoSignificantChange {
                change_pct,
                adjusted,
            } => info!(%symbol, price, change_pct, adjusted, "{assessment}"),
            Assessment::InsufficientData { .. } => info!(%symbol, price, "{assessment}"),
        }

        if let Some(tx) = &self.events {
            let event = MonitorEvent {
                symbol: symbol.clone(),
                timestamp,
                price,
                assessment,
            };
            match tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => debug!(%symbol, "Event queue full, dropping event"),
                Err(TrySendError::Closed(_)) => debug!(%symbol, "Event receiver dropped"),
            }
        }
    }
}

/// Resolves once `true` is observed on the shutdown channel.
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
