//! Return evaluation: cleaned signal series in, one outcome out.
//!
//! Three modes:
//! - `Position` (Mode A): compounded returns between signal rows, with a
//!   buy-and-hold benchmark and commission on every row.
//! - `TradePairs` (Mode B): positional Buy/Sell pairs, multipliers only.
//! - `PriceDifference`: mean Sell close minus mean Buy close.
//!
//! Zero completed trades is an outcome, never an error.

pub mod metrics;
pub mod position;
pub mod trade_pairs;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{PriceSeries, SignalSeries};

pub use metrics::{MetricName, Metrics, PositionMetrics, PriceDifferenceMetrics, TradePairMetrics};

/// Trading costs and starting capital.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Costs {
    /// Fraction of notional charged per signal row, in `[0, 1)`.
    pub commission: f64,
    pub initial_cash: f64,
}

impl Default for Costs {
    fn default() -> Self {
        Self {
            commission: 0.001,
            initial_cash: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    Position,
    TradePairs,
    PriceDifference,
}

impl EvaluationMode {
    /// Metric columns this mode produces, in export order.
    pub fn metric_names(self) -> &'static [MetricName] {
        match self {
            EvaluationMode::Position => &[
                MetricName::ReturnMultiplierStrategy,
                MetricName::ReturnMultiplierBh,
                MetricName::EndingBalance,
                MetricName::BuySellTradePairCount,
            ],
            EvaluationMode::TradePairs => &[
                MetricName::OverallProfitMultiplier,
                MetricName::AverageProfitMultiplier,
                MetricName::BuySellTradePairCount,
                MetricName::BuySignalCount,
                MetricName::SellSignalCount,
            ],
            EvaluationMode::PriceDifference => &[
                MetricName::MeanPriceDifference,
                MetricName::BuySignalCount,
                MetricName::SellSignalCount,
            ],
        }
    }

    /// Metric used for ranking when none is requested.
    pub fn headline_metric(self) -> MetricName {
        match self {
            EvaluationMode::Position => MetricName::ReturnMultiplierStrategy,
            EvaluationMode::TradePairs => MetricName::OverallProfitMultiplier,
            EvaluationMode::PriceDifference => MetricName::MeanPriceDifference,
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvaluationMode::Position => "position",
            EvaluationMode::TradePairs => "trade_pairs",
            EvaluationMode::PriceDifference => "price_difference",
        })
    }
}

/// Why a combination could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidWindow,
    MissingParameter,
    UnexpectedParameter,
    DuplicateParameter,
    Panic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::InvalidWindow => "invalid_window",
            FailureKind::MissingParameter => "missing_parameter",
            FailureKind::UnexpectedParameter => "unexpected_parameter",
            FailureKind::DuplicateParameter => "duplicate_parameter",
            FailureKind::Panic => "panic",
        })
    }
}

/// Result of evaluating one parameter combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Completed(Metrics),
    NoCompletedTrades {
        buy_signals: usize,
        sell_signals: usize,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl EvaluationOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            EvaluationOutcome::Completed(_) => "completed",
            EvaluationOutcome::NoCompletedTrades { .. } => "no_completed_trades",
            EvaluationOutcome::Failed { .. } => "failed",
        }
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        match self {
            EvaluationOutcome::Completed(m) => Some(m),
            _ => None,
        }
    }

    pub fn metric(&self, name: MetricName) -> Option<f64> {
        self.metrics().and_then(|m| m.get(name))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, EvaluationOutcome::Completed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EvaluationOutcome::Failed { .. })
    }
}

/// Evaluate `signals` (generated from `series`) in `mode`.
pub fn evaluate(
    mode: EvaluationMode,
    series: &PriceSeries,
    signals: &SignalSeries,
    costs: &Costs,
) -> EvaluationOutcome {
    match mode {
        EvaluationMode::Position => position::evaluate(series, signals, costs),
        EvaluationMode::TradePairs => trade_pairs::evaluate(signals),
        EvaluationMode::PriceDifference => trade_pairs::price_difference(signals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Signal, SignalPoint};
    use crate::indicators::make_series;

    fn round_trip() -> (PriceSeries, SignalSeries) {
        let series = make_series(&[10.0, 12.0, 15.0]);
        let signals = SignalSeries::new(vec![
            SignalPoint {
                index: 0,
                timestamp: series.bars()[0].timestamp,
                close: 10.0,
                signal: Signal::Buy,
            },
            SignalPoint {
                index: 2,
                timestamp: series.bars()[2].timestamp,
                close: 15.0,
                signal: Signal::Sell,
            },
        ]);
        (series, signals)
    }

    #[test]
    fn dispatches_by_mode() {
        let (series, signals) = round_trip();
        let costs = Costs::default();
        for mode in [
            EvaluationMode::Position,
            EvaluationMode::TradePairs,
            EvaluationMode::PriceDifference,
        ] {
            let outcome = evaluate(mode, &series, &signals, &costs);
            assert_eq!(outcome.metrics().map(|m| m.mode()), Some(mode));
            assert!(outcome.metric(mode.headline_metric()).is_some());
        }
    }

    #[test]
    fn outcome_status_labels() {
        let failed = EvaluationOutcome::Failed {
            kind: FailureKind::InvalidWindow,
            message: "too long".into(),
        };
        assert_eq!(failed.status(), "failed");
        assert!(failed.is_failed());
        assert_eq!(failed.metric(MetricName::EndingBalance), None);
        let none = EvaluationOutcome::NoCompletedTrades {
            buy_signals: 0,
            sell_signals: 0,
        };
        assert_eq!(none.status(), "no_completed_trades");
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(EvaluationOutcome::NoCompletedTrades {
            buy_signals: 2,
            sell_signals: 0,
        })
        .unwrap();
        assert_eq!(json["status"], "no_completed_trades");
        assert_eq!(json["buy_signals"], 2);
    }
}
