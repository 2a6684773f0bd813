//! SMA crossover confirmed by TRIX: an SMA crossover only counts on rows
//! where TRIX is non-negative. Runs are collapsed; the series is not trimmed.
//!
//! In a two-stage sweep the SMA windows are pinned to the best pair of the
//! plain crossover sweep and only the TRIX window varies.

use super::{Strategy, StrategyKind};
use crate::domain::{PriceSeries, SignalSeries};
use crate::evaluation::{Costs, EvaluationMode};
use crate::indicators::{self, IndicatorError, IndicatorKind};
use crate::params::ParameterCombination;
use crate::signals::{attach, collapse_runs, confirm_with, crossovers, first_common_row};

#[derive(Debug, Clone)]
pub struct SmaTrix {
    short: usize,
    long: usize,
    trix: usize,
    params: ParameterCombination,
    mode: EvaluationMode,
    costs: Costs,
}

impl SmaTrix {
    pub fn new(
        short: usize,
        long: usize,
        trix: usize,
        params: ParameterCombination,
        mode: EvaluationMode,
        costs: Costs,
    ) -> Self {
        Self {
            short,
            long,
            trix,
            params,
            mode,
            costs,
        }
    }
}

impl Strategy for SmaTrix {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SmaTrix
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
        let trix = indicators::compute(series, IndicatorKind::Trix, self.trix)?;
        let Some(start) = first_common_row(&[&fast, &slow, &trix]) else {
            return Ok(SignalSeries::default());
        };

        let mut raw = crossovers(&fast, &slow, start);
        confirm_with(&mut raw, start, |row, _| {
            trix[row].is_some_and(|v| v >= 0.0)
        });
        let mut points = attach(series, start, &raw);
        collapse_runs(&mut points);
        Ok(SignalSeries::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signal;
    use crate::indicators::make_series;
    use crate::signals::alternates;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.25).sin() * 10.0 + i as f64 * 0.05)
            .collect()
    }

    fn strategy(short: usize, long: usize, trix: usize) -> SmaTrix {
        SmaTrix::new(
            short,
            long,
            trix,
            ParameterCombination::default(),
            EvaluationMode::TradePairs,
            Costs::default(),
        )
    }

    #[test]
    fn every_event_has_non_negative_trix() {
        let series = make_series(&wave(300));
        let s = strategy(2, 9, 4);
        let trix = indicators::compute(&series, IndicatorKind::Trix, 4).unwrap();
        let signals = s.generate_signals(&series).unwrap();
        assert!(signals.events().count() > 0);
        for p in signals.events() {
            assert!(trix[p.index].unwrap() >= 0.0, "row {}", p.index);
        }
        assert!(alternates(signals.points()));
    }

    #[test]
    fn events_are_a_subset_of_plain_crossovers() {
        let series = make_series(&wave(300));
        let fast = indicators::compute(&series, IndicatorKind::Sma, 2).unwrap();
        let slow = indicators::compute(&series, IndicatorKind::Sma, 9).unwrap();
        let raw = crossovers(&fast, &slow, 0);
        let signals = strategy(2, 9, 4).generate_signals(&series).unwrap();
        for p in signals.events() {
            assert_eq!(raw[p.index], p.signal);
        }
    }

    #[test]
    fn alignment_starts_after_trix_warmup() {
        let series = make_series(&wave(60));
        let signals = strategy(2, 3, 5).generate_signals(&series).unwrap();
        // TRIX(5) is first defined at 3 * 4 + 1.
        assert_eq!(signals.points()[0].index, 13);
        assert_eq!(signals.points()[0].signal, Signal::None);
    }
}
