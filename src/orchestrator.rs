//! Sequences the correlation estimate and the price monitors.

use futures_util::future::try_join_all;
use tokio::sync::watch;
use tracing::info;

use crate::{CorrwatchError, Result};
use crate::config::AppConfig;
use crate::estimator;
use crate::monitor::{PriceMonitor, shutdown_requested};
use crate::provider::MarketDataProvider;
use crate::regression::RegressionResult;

/// Estimates R² once, then monitors the configured symbol until shutdown.
///
/// Returns the regression used by the monitor once it stops, or `None` if
/// shutdown was requested before the estimate completed.
///
/// # Errors
///
/// Propagates the first estimator or monitor failure.
pub async fn run(
    provider: &dyn MarketDataProvider,
    config: &AppConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<Option<RegressionResult>> {
    let regression = tokio::select! {
        biased;
        () = shutdown_requested(&mut shutdown) => {
            info!("Shutdown requested during correlation estimate");
            return Ok(None);
        }
        regression = estimator::estimate(provider, &config.correlation) => regression?,
    };
    info!(%regression, "Correlation estimate complete");

    let monitors = vec![PriceMonitor::new(
        config.monitor.clone(),
        regression.r_squared,
    )];
    run_monitors(provider, monitors, shutdown).await?;

    Ok(Some(regression))
}

/// Drives several monitors concurrently on the current task.
///
/// All monitors share the provider and the shutdown signal. The first
/// failure cancels the remaining monitors.
///
/// # Errors
///
/// Propagates the first monitor failure.
pub async fn run_monitors(
    provider: &dyn MarketDataProvider,
    monitors: Vec<PriceMonitor>,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<PriceMonitor>> {
    let runs = monitors.into_iter().map(|mut monitor| {
        let shutdown = shutdown.clone();
        async move {
            monitor.run(provider, shutdown).await?;
            Ok::<_, CorrwatchError>(monitor)
        }
    });

    try_join_all(runs).await
}
