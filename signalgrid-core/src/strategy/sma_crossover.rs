//! SMA crossover: Buy when the short SMA crosses above the long SMA, Sell on
//! the reverse. Runs are collapsed and the series is trimmed to complete
//! round trips.

use super::{Strategy, StrategyKind};
use crate::domain::{PriceSeries, SignalSeries};
use crate::evaluation::{Costs, EvaluationMode};
use crate::indicators::{self, IndicatorError, IndicatorKind};
use crate::params::ParameterCombination;
use crate::signals::{attach, collapse_runs, crossovers, first_common_row, trim_to_round_trips};

#[derive(Debug, Clone)]
pub struct SmaCrossover {
    short: usize,
    long: usize,
    params: ParameterCombination,
    mode: EvaluationMode,
    costs: Costs,
}

impl SmaCrossover {
    pub fn new(
        short: usize,
        long: usize,
        params: ParameterCombination,
        mode: EvaluationMode,
        costs: Costs,
    ) -> Self {
        Self {
            short,
            long,
            params,
            mode,
            costs,
        }
    }
}

impl Strategy for SmaCrossover {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SmaCrossover
    }

    fn parameters(&self) -> &ParameterCombination {
        &self.params
    }

    fn evaluation_mode(&self) -> EvaluationMode {
        self.mode
    }

    fn costs(&self) -> &Costs {
        &self.costs
    }

    fn generate_signals(&self, series: &PriceSeries) -> Result<SignalSeries, IndicatorError> {
        let fast = indicators::compute(series, IndicatorKind::Sma, self.short)?;
        let slow = indicators::compute(series, IndicatorKind::Sma, self.long)?;
        let Some(start) = first_common_row(&[&fast, &slow]) else {
            return Ok(SignalSeries::default());
        };

        let raw = crossovers(&fast, &slow, start);
        let mut points = attach(series, start, &raw);
        collapse_runs(&mut points);
        Ok(SignalSeries::new(trim_to_round_trips(points)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signal;
    use crate::evaluation::{EvaluationOutcome, Metrics};
    use crate::indicators::make_series;

    fn strategy(short: usize, long: usize, commission: f64) -> SmaCrossover {
        SmaCrossover::new(
            short,
            long,
            ParameterCombination::default(),
            EvaluationMode::Position,
            Costs {
                commission,
                initial_cash: 1000.0,
            },
        )
    }

    #[test]
    fn scenario_pair_is_trimmed_to_buy_then_sell() {
        // SMA2 vs SMA3 from row 2: Sell at 3 (dropped by trim), Buy at 4, Sell at 5.
        let series = make_series(&[100.0, 105.0, 95.0, 110.0, 90.0, 80.0]);
        let signals = strategy(2, 3, 0.0).generate_signals(&series).unwrap();
        let events: Vec<(usize, Signal)> = signals.events().map(|p| (p.index, p.signal)).collect();
        assert_eq!(events, vec![(4, Signal::Buy), (5, Signal::Sell)]);
        assert_eq!(signals.points()[0].close, 90.0);
    }

    #[test]
    fn scenario_multiplier_is_close_ratio() {
        let series = make_series(&[100.0, 105.0, 95.0, 110.0, 90.0, 80.0]);
        match strategy(2, 3, 0.0).evaluate(&series).unwrap() {
            EvaluationOutcome::Completed(Metrics::Position(m)) => {
                assert!((m.return_multiplier_strategy + 1.0 - 80.0 / 90.0).abs() < 1e-12);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn trailing_buy_without_sell_is_trimmed_to_no_trades() {
        // The Buy at row 4 has no later Sell, so trimming leaves no round trip.
        let series = make_series(&[100.0, 105.0, 95.0, 110.0, 90.0]);
        let outcome = strategy(2, 3, 0.0).evaluate(&series).unwrap();
        assert!(matches!(
            outcome,
            EvaluationOutcome::NoCompletedTrades { .. }
        ));
    }

    #[test]
    fn flat_stretch_after_noisy_history_is_a_tie() {
        let level = 29876.54;
        let prefix = 20_000;
        let mut closes: Vec<f64> = (0..prefix)
            .map(|i| {
                let x = i as f64;
                level + (x * 0.37).sin() * 123.456789 + (x * 0.013).cos() * 47.1
            })
            .collect();
        closes.extend(std::iter::repeat(level).take(200));
        let noisy = make_series(&closes);
        let fresh = make_series(&closes[prefix..]);

        for (short, long) in [(2, 3), (3, 5), (2, 7), (5, 11)] {
            let fast = indicators::compute(&noisy, IndicatorKind::Sma, short).unwrap();
            let slow = indicators::compute(&noisy, IndicatorKind::Sma, long).unwrap();
            let flat_from = prefix + long - 1;
            for t in flat_from..closes.len() {
                assert_eq!(fast[t], slow[t], "({short},{long}) row {t}");
            }

            let start = first_common_row(&[&fast, &slow]).unwrap();
            let raw = crossovers(&fast, &slow, start);
            let fresh_fast = indicators::compute(&fresh, IndicatorKind::Sma, short).unwrap();
            let fresh_slow = indicators::compute(&fresh, IndicatorKind::Sma, long).unwrap();
            let fresh_raw = crossovers(&fresh_fast, &fresh_slow, long - 1);
            // Rows whose previous row is already fully flat in both series.
            assert_eq!(&raw[flat_from + 1 - start..], &fresh_raw[1..]);
            assert!(fresh_raw.iter().all(|s| *s == Signal::None));
        }
    }

    #[test]
    fn flat_series_has_no_signals() {
        let series = make_series(&[50.0; 40]);
        let signals = strategy(3, 8, 0.001).generate_signals(&series).unwrap();
        assert_eq!(signals.events().count(), 0);
    }

    #[test]
    fn window_longer_than_series_is_an_error() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let err = strategy(2, 4, 0.0).generate_signals(&series).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidWindow { window: 4, .. }));
    }

    #[test]
    fn cleaned_series_alternates_and_is_bounded() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + (i as f64 * 0.05).cos() * 3.0)
            .collect();
        let series = make_series(&closes);
        let signals = strategy(3, 11, 0.0).generate_signals(&series).unwrap();
        let events: Vec<Signal> = signals.events().map(|p| p.signal).collect();
        assert!(events.len() >= 2);
        assert_eq!(events.first(), Some(&Signal::Buy));
        assert_eq!(events.last(), Some(&Signal::Sell));
        assert!(events.windows(2).all(|w| w[0] != w[1]));
    }
}
