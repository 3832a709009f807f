//! Correlation-adjusted price move monitor.
//!
//! Estimates how much of one asset's daily return variance is explained by
//! another asset (R² of a simple linear regression over historical candles),
//! then polls the first asset's live price and alerts on hourly moves whose
//! magnitude, discounted by `1 - R²`, exceeds a threshold.

pub mod config;
pub mod error;
pub mod estimator;
pub mod models;
pub mod monitor;
pub mod orchestrator;
pub mod provider;
pub mod regression;

pub use error::{CorrwatchError, Result};
