//! Stochastic RSI entries and exits gated by TRIX zero-line turns.
//!
//! Buy: %K crosses above 0.8 on the same row TRIX turns non-negative.
//! Sell: %K crosses below 0.2 on the same row TRIX turns negative.
//! No run-collapse and no trim: repeated same-side signals are kept and
//! pairing is positional, so unmatched signals only show in the raw counts.

use super::{Strategy, StrategyKind};
use crate::domain::{PriceSeries, Signal, SignalSeries};
use crate::evaluation::{Costs, EvaluationMode};
use crate::indicators::{self, IndicatorError, IndicatorKind, StochSmoothing};
use crate::params::ParameterCombination;
use crate::signals::{
    attach, crosses_above, crosses_below, first_common_row, turns_negative, turns_non_negative,
};

pub const OVERBOUGHT: f64 = 0.8;
pub const OVERSOLD: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct StochRsiTrix {
    stoch_rsi: usize,
    trix: usize,
    smoothing: StochSmoothing,
    params: ParameterCombination,
    mode: EvaluationMode,
    costs: Costs,
}

impl StochRsiTrix {
    pub fn new(
        stoch_rsi: usize,
        trix: usize,
        smoothing: StochSmoothing,
        params: ParameterCombination,
        mode: EvaluationMode,
        costs: Costs,
    ) -> Self {
        Self {
            stoch_rsi,
            trix,
            smoothing,
            params,
            mode,
            costs,
        }
    }
}

/// Signal at row `t` given the %K and TRIX lines.
fn signal_at(k: &[Option<f64>], trix: &[Option<f64>], t: usize) -> Signal {
    if crosses_above(k, OVERBOUGHT, t) && turns_non_negative(trix, t) {
        Signal::Buy
    } else if crosses_below(k, OVERSOLD, t) && turns_negative(trix, t) {
        Signal::Sell
    } else {
        Signal::None
    }
}

impl Strategy for StochRsiTrix {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StochRsiTrix
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
        let k = indicators::compute(
            series,
            IndicatorKind::StochRsi(self.smoothing),
            self.stoch_rsi,
        )?;
        let trix = indicators::compute(series, IndicatorKind::Trix, self.trix)?;
        let Some(start) = first_common_row(&[&k, &trix]) else {
            return Ok(SignalSeries::default());
        };

        let n = k.len().min(trix.len());
        let raw: Vec<Signal> = (start..n)
            .map(|t| {
                if t == start {
                    Signal::None
                } else {
                    signal_at(&k, &trix, t)
                }
            })
            .collect();
        Ok(SignalSeries::new(attach(series, start, &raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_series;

    fn choppy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                100.0 + (x * 0.45).sin() * 6.0 + (x * 0.11).sin() * 9.0 + (x * 1.7).cos()
            })
            .collect()
    }

    fn strategy(stoch: usize, trix: usize) -> StochRsiTrix {
        StochRsiTrix::new(
            stoch,
            trix,
            StochSmoothing::default(),
            ParameterCombination::default(),
            EvaluationMode::TradePairs,
            Costs::default(),
        )
    }

    #[test]
    fn signal_rule_on_hand_built_lines() {
        let k = vec![Some(0.5), Some(0.85), Some(0.3), Some(0.1)];
        let trix = vec![Some(-0.2), Some(0.0), Some(0.3), Some(-0.1)];
        assert_eq!(signal_at(&k, &trix, 1), Signal::Buy);
        assert_eq!(signal_at(&k, &trix, 2), Signal::None);
        assert_eq!(signal_at(&k, &trix, 3), Signal::Sell);
    }

    #[test]
    fn both_conditions_required() {
        // %K crosses up but TRIX was already non-negative.
        let k = vec![Some(0.5), Some(0.9)];
        let trix = vec![Some(0.1), Some(0.2)];
        assert_eq!(signal_at(&k, &trix, 1), Signal::None);
    }

    #[test]
    fn generated_events_satisfy_the_rule() {
        let series = make_series(&choppy(600));
        let s = strategy(6, 3);
        let k = indicators::compute(
            &series,
            IndicatorKind::StochRsi(StochSmoothing::default()),
            6,
        )
        .unwrap();
        let trix = indicators::compute(&series, IndicatorKind::Trix, 3).unwrap();
        let signals = s.generate_signals(&series).unwrap();
        assert!(signals.count(Signal::Buy) > 0, "fixture produced no Buy");
        assert!(signals.count(Signal::Sell) > 0, "fixture produced no Sell");
        for p in signals.events() {
            let t = p.index;
            match p.signal {
                Signal::Buy => {
                    assert!(k[t - 1].unwrap() < OVERBOUGHT && k[t].unwrap() >= OVERBOUGHT);
                    assert!(trix[t - 1].unwrap() < 0.0 && trix[t].unwrap() >= 0.0);
                }
                Signal::Sell => {
                    assert!(k[t - 1].unwrap() > OVERSOLD && k[t].unwrap() <= OVERSOLD);
                    assert!(trix[t - 1].unwrap() >= 0.0 && trix[t].unwrap() < 0.0);
                }
                Signal::None => unreachable!(),
            }
        }
    }

    #[test]
    fn flat_series_yields_no_rows() {
        let series = make_series(&[10.0; 50]);
        let signals = strategy(5, 3).generate_signals(&series).unwrap();
        assert!(signals.is_empty());
    }
}
