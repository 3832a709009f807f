//! Correlation estimator tests against a scripted provider.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use corrwatch::CorrwatchError;
use corrwatch::config::CorrelationConfig;
use corrwatch::estimator::{estimate, estimate_from_candles};

use common::{ScriptedProvider, daily_candle, daily_candles, day};

fn closes() -> Vec<Decimal> {
    vec![
        dec!(736.42),
        dec!(774.56),
        dec!(978.28),
        dec!(1041.43),
        dec!(1099.56),
        dec!(1208.42),
        dec!(1224.87),
        dec!(1216.72),
        dec!(1276.00),
        dec!(1088.57),
        dec!(1043.43),
    ]
}

fn config() -> CorrelationConfig {
    CorrelationConfig {
        start: day(0),
        end: day(30),
        ..CorrelationConfig::default()
    }
}

#[tokio::test]
async fn identical_assets_are_perfectly_correlated() {
    let provider = ScriptedProvider::new()
        .with_candles("ETHUSDT", daily_candles(&closes()))
        .with_candles("BTCUSDT", daily_candles(&closes()));

    let result = estimate(&provider, &config()).await.unwrap();

    assert_eq!(result.samples, closes().len() - 1);
    assert!((result.slope - 1.0).abs() < 1e-9);
    assert!((result.r_squared - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn both_symbols_use_identical_range_and_interval() {
    let provider = ScriptedProvider::new()
        .with_candles("ETHUSDT", daily_candles(&closes()))
        .with_candles("BTCUSDT", daily_candles(&closes()));

    estimate(&provider, &config()).await.unwrap();

    let requests = provider.candle_requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let symbols: Vec<&str> = requests.iter().map(|r| r.symbol.as_str()).collect();
    assert!(symbols.contains(&"ETHUSDT"));
    assert!(symbols.contains(&"BTCUSDT"));
    assert_eq!(requests[0].start, requests[1].start);
    assert_eq!(requests[0].end, requests[1].end);
    assert_eq!(requests[0].interval, requests[1].interval);
    assert_eq!(requests[0].limit, 500);
}

#[tokio::test]
async fn flat_independent_asset_explains_nothing() {
    let flat = vec![dec!(30000); closes().len()];
    let provider = ScriptedProvider::new()
        .with_candles("ETHUSDT", daily_candles(&closes()))
        .with_candles("BTCUSDT", daily_candles(&flat));

    let result = estimate(&provider, &config()).await.unwrap();

    assert_eq!(result.slope, 0.0);
    assert_eq!(result.r_squared, 0.0);
}

#[test]
fn scaled_returns_keep_full_r_squared() {
    // Independent returns are exactly half of the dependent ones.
    let closes = closes();
    let mut independent = vec![dec!(100)];
    for pair in closes.windows(2) {
        let change = (pair[1] - pair[0]) / pair[0];
        let last = *independent.last().unwrap();
        independent.push(last * (Decimal::ONE + change / Decimal::TWO));
    }

    let result = estimate_from_candles(&daily_candles(&closes), &daily_candles(&independent))
        .unwrap();

    assert!((result.slope - 2.0).abs() < 1e-6);
    assert!((result.r_squared - 1.0).abs() < 1e-9);
}

#[test]
fn unmatched_days_are_dropped_before_fitting() {
    let dependent = daily_candles(&closes());
    // Independent series is missing day 4: its day-4 return disappears and
    // its day-5 return spans two days.
    let independent: Vec<_> = closes()
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != 4)
        .map(|(i, close)| daily_candle(i as i64, close))
        .collect();

    let result = estimate_from_candles(&dependent, &independent).unwrap();

    assert_eq!(result.samples, closes().len() - 2);
    assert!(result.r_squared < 1.0);
    assert!(result.r_squared > 0.0);
}

#[tokio::test]
async fn too_few_candles_is_insufficient_data() {
    let provider = ScriptedProvider::new()
        .with_candles("ETHUSDT", daily_candles(&[dec!(1), dec!(2)]))
        .with_candles("BTCUSDT", daily_candles(&[dec!(1), dec!(2)]));

    let err = estimate(&provider, &config()).await.unwrap_err();

    assert!(matches!(
        err,
        CorrwatchError::InsufficientData {
            required: 2,
            available: 1
        }
    ));
}

#[tokio::test]
async fn unknown_symbol_is_data_provider_error() {
    let provider = ScriptedProvider::new().with_candles("ETHUSDT", daily_candles(&closes()));

    let err = estimate(&provider, &config()).await.unwrap_err();

    assert!(matches!(err, CorrwatchError::DataProvider(_)));
    assert!(err.to_string().contains("Invalid symbol."));
}

#[tokio::test]
async fn empty_range_is_rejected_before_fetching() {
    let provider = ScriptedProvider::new();
    let config = CorrelationConfig {
        start: day(5),
        end: day(5),
        ..CorrelationConfig::default()
    };

    let err = estimate(&provider, &config).await.unwrap_err();

    assert!(matches!(err, CorrwatchError::Config(_)));
    assert!(provider.candle_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn zero_close_is_malformed_data() {
    let mut closes = closes();
    closes[3] = Decimal::ZERO;
    let provider = ScriptedProvider::new()
        .with_candles("ETHUSDT", daily_candles(&closes))
        .with_candles("BTCUSDT", daily_candles(&closes));

    let err = estimate(&provider, &config()).await.unwrap_err();

    assert!(matches!(err, CorrwatchError::DataProvider(_)));
}
