//! Price and return series derived from candles.
//!
//! A [`PriceSeries`] is the close price of each candle indexed by open time.
//! Differencing it yields a [`ReturnSeries`], and two return series are
//! aligned on their common timestamps into a [`PairedReturns`] sample.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;

use super::candle::Candle;
use crate::provider::ProviderError;

/// A single timestamped value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Close prices strictly increasing in timestamp, all finite and positive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    points: Vec<Point>,
}

impl PriceSeries {
    /// Builds a series from `(timestamp, price)` points.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Malformed`] if timestamps are not strictly
    /// increasing or a price is not a finite positive number.
    pub fn new(points: Vec<Point>) -> Result<Self, ProviderError> {
        for pair in points.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(ProviderError::Malformed(format!(
                    "price timestamps not strictly increasing at {}",
                    pair[1].timestamp
                )));
            }
        }
        if let Some(bad) = points
            .iter()
            .find(|p| !p.value.is_finite() || p.value <= 0.0)
        {
            return Err(ProviderError::Malformed(format!(
                "invalid price {} at {}",
                bad.value, bad.timestamp
            )));
        }

        Ok(Self { points })
    }

    /// Extracts close prices from candles, indexed by open time.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Malformed`] if a close cannot be represented
    /// as `f64` or the candles violate the [`PriceSeries::new`] invariants.
    pub fn from_candles(candles: &[Candle]) -> Result<Self, ProviderError> {
        let points = candles
            .iter()
            .map(|candle| {
                let value = candle.close.to_f64().ok_or_else(|| {
                    ProviderError::Malformed(format!("close {} not representable", candle.close))
                })?;
                Ok(Point {
                    timestamp: candle.open_time,
                    value,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        Self::new(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Simple fractional change between consecutive prices.
    ///
    /// Each return is stamped with the later of the two prices, so the
    /// result is one element shorter than `self` and starts at the second
    /// price's timestamp.
    #[must_use]
    pub fn returns(&self) -> ReturnSeries {
        let points = self
            .points
            .windows(2)
            .map(|pair| Point {
                timestamp: pair[1].timestamp,
                value: (pair[1].value - pair[0].value) / pair[0].value,
            })
            .collect();

        ReturnSeries { points }
    }
}

/// Fractional returns, strictly increasing in timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnSeries {
    points: Vec<Point>,
}

impl ReturnSeries {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Dependent/independent return pairs sharing a timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairedReturns {
    pub timestamps: Vec<DateTime<Utc>>,
    pub dependent: Vec<f64>,
    pub independent: Vec<f64>,
}

impl PairedReturns {
    /// Inner-joins two return series on timestamp; unmatched points are dropped.
    #[must_use]
    pub fn inner_join(dependent: &ReturnSeries, independent: &ReturnSeries) -> Self {
        let mut paired = Self::default();
        let (mut i, mut j) = (0, 0);
        let (ys, xs) = (dependent.points(), independent.points());

        // Both sides are sorted, so a single merge pass suffices.
        while i < ys.len() && j < xs.len() {
            match ys[i].timestamp.cmp(&xs[j].timestamp) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    paired.timestamps.push(ys[i].timestamp);
                    paired.dependent.push(ys[i].value);
                    paired.independent.push(xs[j].value);
                    i += 1;
                    j += 1;
                }
            }
        }

        paired
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
