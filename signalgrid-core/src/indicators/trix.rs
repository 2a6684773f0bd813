//! TRIX: one-bar rate of change of a triple-smoothed EMA, in percent.
//!
//! e1 = EMA(close), e2 = EMA(e1), e3 = EMA(e2), all with span `period`.
//! TRIX[t] = 100 * (e3[t] - e3[t-1]) / e3[t-1].
//! Each smoothing stage waits for `period` defined inputs, so the first
//! value lands at index 3 * (period - 1) + 1.

use super::ema::{ewm, span_alpha};
use super::{Indicator, IndicatorSeries};
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Trix {
    period: usize,
    name: String,
}

impl Trix {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "TRIX period must be >= 1");
        Self {
            period,
            name: format!("trix_{period}"),
        }
    }
}

impl Indicator for Trix {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        3 * (self.period - 1) + 1
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        let alpha = span_alpha(self.period);
        let closes: Vec<Option<f64>> = series.closes().map(Some).collect();
        let e1 = ewm(&closes, alpha, self.period);
        let e2 = ewm(&e1, alpha, self.period);
        let e3 = ewm(&e2, alpha, self.period);

        let mut result = vec![None; e3.len()];
        for i in 1..e3.len() {
            if let (Some(prev), Some(cur)) = (e3[i - 1], e3[i]) {
                if prev != 0.0 {
                    result[i] = Some(100.0 * (cur - prev) / prev);
                }
            }
        }
        result
    }
}
