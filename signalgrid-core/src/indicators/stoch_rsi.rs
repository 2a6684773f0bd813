//! Stochastic RSI.
//!
//! Where RSI sits within its own rolling `period` range, scaled to [0, 1]:
//! stoch[t] = (rsi[t] - min(rsi)) / (max(rsi) - min(rsi)).
//! %K smooths it with an SMA of `smoothing.k`, %D smooths %K with an SMA of
//! `smoothing.d`. A zero-width range leaves the row undefined.

use serde::{Deserialize, Serialize};

use super::rsi::Rsi;
use super::sma::rolling_mean;
use super::{Indicator, IndicatorSeries};
use crate::domain::PriceSeries;

/// Smoothing windows for %K and %D. These are engine settings, not swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StochSmoothing {
    pub k: usize,
    pub d: usize,
}

impl Default for StochSmoothing {
    fn default() -> Self {
        Self { k: 3, d: 3 }
    }
}

/// All three stochastic RSI lines.
#[derive(Debug, Clone, PartialEq)]
pub struct StochRsiLines {
    pub raw: IndicatorSeries,
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

#[derive(Debug, Clone)]
pub struct StochRsi {
    period: usize,
    smoothing: StochSmoothing,
    name: String,
}

impl StochRsi {
    pub fn new(period: usize, smoothing: StochSmoothing) -> Self {
        assert!(period >= 1, "StochRSI period must be >= 1");
        assert!(
            smoothing.k >= 1 && smoothing.d >= 1,
            "StochRSI smoothing windows must be >= 1"
        );
        Self {
            period,
            smoothing,
            name: format!("stoch_rsi_{period}"),
        }
    }

    pub fn compute_lines(&self, series: &PriceSeries) -> StochRsiLines {
        let rsi = Rsi::new(self.period).compute(series);
        let raw = stochastic(&rsi, self.period);
        let k = rolling_mean(&raw, self.smoothing.k);
        let d = rolling_mean(&k, self.smoothing.d);
        StochRsiLines { raw, k, d }
    }
}

impl Indicator for StochRsi {
    fn name(&self) -> &str {
        &self.name
    }

    /// First %K row.
    fn lookback(&self) -> usize {
        2 * (self.period - 1) + (self.smoothing.k - 1)
    }

    /// The %K line, which is what signal rules trade on.
    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        self.compute_lines(series).k
    }
}

fn stochastic(input: &[Option<f64>], period: usize) -> IndicatorSeries {
    let mut result = vec![None; input.len()];
    if input.len() < period {
        return result;
    }
    for i in (period - 1)..input.len() {
        let window = &input[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_none()) {
            continue;
        }
        let (lo, hi) = window
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = hi - lo;
        if range > 0.0 {
            if let Some(cur) = input[i] {
                result[i] = Some((cur - lo) / range);
            }
        }
    }
    result
}
