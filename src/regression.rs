//! Ordinary least squares with a single regressor.

use std::fmt;

use crate::{CorrwatchError, Result};

/// Minimum number of pairs needed to fit a line.
pub const MIN_SAMPLES: usize = 2;

/// Fitted line `dependent = intercept + slope * independent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, always in `[0, 1]`.
    pub r_squared: f64,
    pub samples: usize,
}

impl fmt::Display for RegressionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slope={:.6} intercept={:.6} r_squared={:.6} samples={}",
            self.slope, self.intercept, self.r_squared, self.samples
        )
    }
}

/// Fits `dependent` on `independent` by ordinary least squares.
///
/// Values are paired positionally; trailing values of the longer slice are
/// ignored. A constant regressor has no explanatory power and yields slope
/// `0` and R² `0`. A constant dependent series leaves no variance to explain
/// and also yields R² `0`.
///
/// # Errors
///
/// Returns [`CorrwatchError::InsufficientData`] with fewer than
/// [`MIN_SAMPLES`] pairs.
pub fn fit(independent: &[f64], dependent: &[f64]) -> Result<RegressionResult> {
    let n = independent.len().min(dependent.len());
    if n < MIN_SAMPLES {
        return Err(CorrwatchError::InsufficientData {
            required: MIN_SAMPLES,
            available: n,
        });
    }
    let (xs, ys) = (&independent[..n], &dependent[..n]);

    let count = n as f64;
    let x_mean = xs.iter().sum::<f64>() / count;
    let y_mean = ys.iter().sum::<f64>() / count;

    let slope = if is_constant(xs) {
        0.0
    } else {
        let (sxy, sxx) = xs
            .iter()
            .zip(ys)
            .fold((0.0, 0.0), |(sxy, sxx), (&x, &y)| {
                let dx = x - x_mean;
                (sxy + dx * (y - y_mean), sxx + dx * dx)
            });
        sxy / sxx
    };
    let intercept = y_mean - slope * x_mean;

    let r_squared = if is_constant(ys) {
        0.0
    } else {
        let (ss_res, ss_tot) = xs
            .iter()
            .zip(ys)
            .fold((0.0, 0.0), |(ss_res, ss_tot), (&x, &y)| {
                let residual = y - (intercept + slope * x);
                let deviation = y - y_mean;
                (ss_res + residual * residual, ss_tot + deviation * deviation)
            });
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Ok(RegressionResult {
        slope,
        intercept,
        r_squared,
        samples: n,
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}
