//! Mode A: continuous-compounding position returns and the buy-and-hold
//! benchmark.
//!
//! Simple returns are converted to log growth, summed, and exponentiated, so
//! `exp(sum(ln(1 + r)))` equals the product of the growth factors. A growth
//! factor at or below zero is a total loss: its log is `-inf` and the
//! compounded value collapses to 0.

use super::metrics::{Metrics, PositionMetrics};
use super::{Costs, EvaluationOutcome};
use crate::domain::{PriceSeries, Signal, SignalSeries};

/// `ln(1 + r)`, with non-positive growth mapped to `-inf`.
pub fn log_growth(r: f64) -> f64 {
    let growth = 1.0 + r;
    if growth > 0.0 {
        growth.ln()
    } else {
        f64::NEG_INFINITY
    }
}

/// Compounded multiplier of a sequence of simple returns: `exp(sum(ln(1 + r)))`.
pub fn compounded(returns: &[f64]) -> f64 {
    returns.iter().map(|&r| log_growth(r)).sum::<f64>().exp()
}

/// Balance after each row: `balance[0] = initial_cash`,
/// `balance[t] = initial_cash * exp(cumsum(ln(1 + r))[t])` for `t > 0`.
pub fn balance_curve(returns: &[f64], initial_cash: f64) -> Vec<f64> {
    let mut cumulative = 0.0;
    returns
        .iter()
        .enumerate()
        .map(|(t, &r)| {
            cumulative += log_growth(r);
            if t == 0 {
                initial_cash
            } else {
                initial_cash * cumulative.exp()
            }
        })
        .collect()
}

/// Returns between consecutive signal rows, each charged one commission.
///
/// `r[0] = -commission`, `r[i] = close[i] / close[i-1] - commission - 1`.
pub fn strategy_returns(closes: &[f64], commission: f64) -> Vec<f64> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            if i == 0 {
                -commission
            } else {
                close / closes[i - 1] - commission - 1.0
            }
        })
        .collect()
}

/// Buy-and-hold returns over every bar, charged commission on entry and exit.
pub fn benchmark_returns(series: &PriceSeries, commission: f64) -> Vec<f64> {
    let n = series.len();
    let mut returns: Vec<f64> = (0..n)
        .map(|i| {
            if i == 0 {
                0.0
            } else {
                series.close(i) / series.close(i - 1) - 1.0
            }
        })
        .collect();
    if let Some(first) = returns.first_mut() {
        *first -= commission;
    }
    if n > 1 {
        returns[n - 1] -= commission;
    }
    returns
}

/// Evaluate a cleaned signal series in position mode.
///
/// Only Buy/Sell rows take part. Without a Buy followed by a later Sell the
/// outcome is `NoCompletedTrades`.
pub fn evaluate(series: &PriceSeries, signals: &SignalSeries, costs: &Costs) -> EvaluationOutcome {
    let buys = signals.count(Signal::Buy);
    let sells = signals.count(Signal::Sell);
    if !has_round_trip(signals) {
        return EvaluationOutcome::NoCompletedTrades {
            buy_signals: buys,
            sell_signals: sells,
        };
    }

    let closes: Vec<f64> = signals.events().map(|p| p.close).collect();
    let returns = strategy_returns(&closes, costs.commission);
    let balances = balance_curve(&returns, costs.initial_cash);
    let ending_balance = balances.last().copied().unwrap_or(costs.initial_cash);

    let bh = benchmark_returns(series, costs.commission);

    EvaluationOutcome::Completed(Metrics::Position(PositionMetrics {
        return_multiplier_strategy: compounded(&returns) - 1.0,
        return_multiplier_bh: compounded(&bh) - 1.0,
        ending_balance,
        buy_sell_trade_pair_count: buys,
    }))
}

fn has_round_trip(signals: &SignalSeries) -> bool {
    let mut seen_buy = false;
    for point in signals.events() {
        match point.signal {
            Signal::Buy => seen_buy = true,
            Signal::Sell if seen_buy => return true,
            _ => {}
        }
    }
    false
}
