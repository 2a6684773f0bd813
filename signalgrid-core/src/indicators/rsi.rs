//! Relative Strength Index (RSI).
//!
//! Gains and losses are Wilder-smoothed (alpha = 1 / period). The first bar
//! has no prior close and counts as a zero change, so the first value lands
//! at index period - 1.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! Edge case: avg_loss == 0 -> RSI = 100.

use super::ema::ewm;
use super::{Indicator, IndicatorSeries};
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        let bars = series.bars();
        let n = bars.len();
        let mut gains = Vec::with_capacity(n);
        let mut losses = Vec::with_capacity(n);
        for i in 0..n {
            let change = if i == 0 {
                0.0
            } else {
                bars[i].close - bars[i - 1].close
            };
            gains.push(Some(change.max(0.0)));
            losses.push(Some((-change).max(0.0)));
        }

        let alpha = 1.0 / self.period as f64;
        let avg_gain = ewm(&gains, alpha, self.period);
        let avg_loss = ewm(&losses, alpha, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(g, l)| match (g, l) {
                (Some(g), Some(l)) => Some(rsi_value(*g, *l)),
                _ => None,
            })
            .collect()
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn rsi_all_gains_is_100() {
        let series = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = Rsi::new(3).compute(&series);
        assert!(result[1].is_none());
        assert!(result[2..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let series = make_series(&[6.0, 5.0, 4.0, 3.0, 2.0]);
        let result = Rsi::new(2).compute(&series);
        assert!(result[1..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn rsi_wilder_smoothing() {
        // period 2, alpha 0.5; changes: 0, +2, -1
        // gains: 0 -> 1 -> 0.5 ; losses: 0 -> 0 -> 0.5
        let series = make_series(&[10.0, 12.0, 11.0]);
        let result = Rsi::new(2).compute(&series);
        assert_eq!(result[1], Some(100.0));
        assert_approx(result[2].unwrap(), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_bounded() {
        let closes = [10.0, 12.0, 9.0, 14.0, 13.0, 15.0, 8.0, 11.0, 12.5, 10.0];
        let result = Rsi::new(4).compute(&make_series(&closes));
        for v in result.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }
}
