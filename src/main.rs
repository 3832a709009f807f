use corrwatch::CorrwatchError;
use corrwatch::config::fetch_config;
use corrwatch::orchestrator;
use corrwatch::provider::BinanceClient;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), CorrwatchError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let app_config = fetch_config()?;
    let provider = BinanceClient::new(&app_config.rest_url)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        }
    });

    orchestrator::run(&provider, &app_config, shutdown_rx)
        .await
        .inspect_err(|e| error!("{e}"))?;

    Ok(())
}
