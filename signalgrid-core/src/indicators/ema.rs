//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (close[t] - EMA[t-1]), with
//! alpha = 2 / (period + 1). This form keeps a constant input exactly constant.
//! Seed: EMA at the first close is that close; values are masked until
//! `period` observations have been seen.
//! Lookback: period - 1.

use super::{Indicator, IndicatorSeries};
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }

    pub fn alpha(&self) -> f64 {
        span_alpha(self.period)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        let closes: Vec<Option<f64>> = series.closes().map(Some).collect();
        ewm(&closes, self.alpha(), self.period)
    }
}

/// Smoothing factor for a span-style EMA.
pub(crate) fn span_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Recursive exponential weighting over an optional input.
///
/// Leading `None`s are skipped; the first defined input seeds the average.
/// An interior `None` holds the average unchanged and yields `None` for that
/// row. Output is masked until `min_periods` defined inputs have been seen.
pub(crate) fn ewm(input: &[Option<f64>], alpha: f64, min_periods: usize) -> IndicatorSeries {
    let mut result = vec![None; input.len()];
    let mut state: Option<f64> = None;
    let mut seen = 0usize;

    for (i, value) in input.iter().enumerate() {
        let Some(x) = *value else {
            continue;
        };
        seen += 1;
        let next = match state {
            None => x,
            Some(prev) => prev + alpha * (x - prev),
        };
        state = Some(next);
        if seen >= min_periods {
            result[i] = Some(next);
        }
    }
    result
}
