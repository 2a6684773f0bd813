//! Mode B (positional trade pairs) and the simplified mean-price difference.
//!
//! Neither charges commission: both work on raw signal closes.

use super::metrics::{Metrics, PriceDifferenceMetrics, TradePairMetrics};
use super::EvaluationOutcome;
use crate::domain::SignalSeries;

/// `sell / buy` for each positional pair (k-th Buy with k-th Sell).
///
/// Unmatched signals on the longer side are ignored.
pub fn pair_multipliers(buys: &[f64], sells: &[f64]) -> Vec<f64> {
    buys.iter().zip(sells).map(|(b, s)| s / b).collect()
}

pub fn evaluate(signals: &SignalSeries) -> EvaluationOutcome {
    let buys = signals.buy_closes();
    let sells = signals.sell_closes();
    let multipliers = pair_multipliers(&buys, &sells);
    if multipliers.is_empty() {
        return EvaluationOutcome::NoCompletedTrades {
            buy_signals: buys.len(),
            sell_signals: sells.len(),
        };
    }

    let overall = multipliers.iter().product::<f64>();
    // Both sides are non-empty once a pair exists.
    let average = match (mean(&sells), mean(&buys)) {
        (Some(s), Some(b)) => s / b,
        _ => f64::NAN,
    };

    EvaluationOutcome::Completed(Metrics::TradePairs(TradePairMetrics {
        overall_profit_multiplier: overall,
        average_profit_multiplier: average,
        buy_sell_trade_pair_count: multipliers.len(),
        buy_signal_count: buys.len(),
        sell_signal_count: sells.len(),
    }))
}

/// `mean(sell closes) - mean(buy closes)`.
pub fn price_difference(signals: &SignalSeries) -> EvaluationOutcome {
    let buys = signals.buy_closes();
    let sells = signals.sell_closes();
    match (mean(&sells), mean(&buys)) {
        (Some(s), Some(b)) => {
            EvaluationOutcome::Completed(Metrics::PriceDifference(PriceDifferenceMetrics {
                mean_price_difference: s - b,
                buy_signal_count: buys.len(),
                sell_signal_count: sells.len(),
            }))
        }
        _ => EvaluationOutcome::NoCompletedTrades {
            buy_signals: buys.len(),
            sell_signals: sells.len(),
        },
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
