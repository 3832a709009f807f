//! Time-bounded window of price observations.

use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{CorrwatchError, Result};

/// A single polled price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Observations ordered by timestamp, none older than `span` before the
/// newest one.
///
/// Each [`record`](Self::record) costs O(window size) in the worst case
/// (ordered insert plus eviction from the front). The window holds roughly
/// `span / poll interval` samples, which stays tiny at hourly polling.
#[derive(Debug, Clone)]
pub struct ObservationWindow {
    span: TimeDelta,
    samples: VecDeque<Observation>,
}

impl ObservationWindow {
    #[must_use]
    pub fn new(span: TimeDelta) -> Self {
        Self {
            span,
            samples: VecDeque::new(),
        }
    }

    pub fn span(&self) -> TimeDelta {
        self.span
    }

    /// Inserts an observation and evicts everything strictly older than
    /// `span` before the newest timestamp.
    ///
    /// Out-of-order timestamps are inserted in order; one that is already
    /// outside the window is evicted immediately.
    pub fn record(&mut self, timestamp: DateTime<Utc>, price: f64) {
        let at = self.samples.partition_point(|o| o.timestamp <= timestamp);
        self.samples.insert(at, Observation { timestamp, price });
        self.evict();
    }

    fn evict(&mut self) {
        let Some(newest) = self.samples.back().map(|o| o.timestamp) else {
            return;
        };
        let cutoff = newest - self.span;
        while self.samples.front().is_some_and(|o| o.timestamp < cutoff) {
            self.samples.pop_front();
        }
    }

    /// Percentage change from the oldest to the newest observation.
    ///
    /// # Errors
    ///
    /// Returns [`CorrwatchError::InsufficientData`] with fewer than two
    /// observations.
    pub fn change_pct(&self) -> Result<f64> {
        match (self.samples.front(), self.samples.back()) {
            (Some(earliest), Some(latest)) if self.samples.len() >= 2 => {
                Ok((latest.price - earliest.price) / earliest.price * 100.0)
            }
            _ => Err(CorrwatchError::InsufficientData {
                required: 2,
                available: self.samples.len(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.samples.iter()
    }
}
