//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{Indicator, IndicatorSeries};
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        let closes: Vec<Option<f64>> = series.closes().map(Some).collect();
        rolling_mean(&closes, self.period)
    }
}

/// Rolling mean over `period` consecutive entries.
///
/// A window containing any `None` yields `None`. Each value is computed from
/// its own window alone, as the window's first entry plus the mean deviation
/// from it, so a run of equal inputs averages to exactly that input and no
/// rounding carries over from earlier rows.
pub(crate) fn rolling_mean(input: &[Option<f64>], period: usize) -> IndicatorSeries {
    let n = input.len();
    let mut result = vec![None; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &input[(i + 1 - period)..=i];
        let Some(anchor) = window[0] else {
            continue;
        };
        let deviation = window
            .iter()
            .try_fold(0.0, |acc, &v| v.map(|v| acc + (v - anchor)));
        result[i] = deviation.map(|d| anchor + d / period as f64);
    }
    result
}
