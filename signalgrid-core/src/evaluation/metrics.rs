//! Per-mode metric sets and the names used to rank and export them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::EvaluationMode;

/// Mode A results: continuous compounding over the signal rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionMetrics {
    /// `exp(sum(ln(1 + r))) - 1` over the signal rows.
    pub return_multiplier_strategy: f64,
    /// Same quantity for buy-and-hold over the whole series.
    pub return_multiplier_bh: f64,
    pub ending_balance: f64,
    /// Number of Buy rows.
    pub buy_sell_trade_pair_count: usize,
}

/// Mode B results: positional Buy/Sell pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePairMetrics {
    /// Product of `sell / buy` over all pairs.
    pub overall_profit_multiplier: f64,
    /// `mean(sell closes) / mean(buy closes)` over every signal of each side.
    pub average_profit_multiplier: f64,
    pub buy_sell_trade_pair_count: usize,
    pub buy_signal_count: usize,
    pub sell_signal_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDifferenceMetrics {
    pub mean_price_difference: f64,
    pub buy_signal_count: usize,
    pub sell_signal_count: usize,
}

/// Metrics of one completed evaluation, tagged by mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Metrics {
    Position(PositionMetrics),
    TradePairs(TradePairMetrics),
    PriceDifference(PriceDifferenceMetrics),
}

impl Metrics {
    pub fn mode(&self) -> EvaluationMode {
        match self {
            Metrics::Position(_) => EvaluationMode::Position,
            Metrics::TradePairs(_) => EvaluationMode::TradePairs,
            Metrics::PriceDifference(_) => EvaluationMode::PriceDifference,
        }
    }

    /// Value of `name`, or `None` if this mode does not produce it.
    pub fn get(&self, name: MetricName) -> Option<f64> {
        use MetricName::*;
        match (self, name) {
            (Metrics::Position(m), ReturnMultiplierStrategy) => Some(m.return_multiplier_strategy),
            (Metrics::Position(m), ReturnMultiplierBh) => Some(m.return_multiplier_bh),
            (Metrics::Position(m), EndingBalance) => Some(m.ending_balance),
            (Metrics::Position(m), BuySellTradePairCount) => {
                Some(m.buy_sell_trade_pair_count as f64)
            }
            (Metrics::TradePairs(m), OverallProfitMultiplier) => Some(m.overall_profit_multiplier),
            (Metrics::TradePairs(m), AverageProfitMultiplier) => Some(m.average_profit_multiplier),
            (Metrics::TradePairs(m), BuySellTradePairCount) => {
                Some(m.buy_sell_trade_pair_count as f64)
            }
            (Metrics::TradePairs(m), BuySignalCount) => Some(m.buy_signal_count as f64),
            (Metrics::TradePairs(m), SellSignalCount) => Some(m.sell_signal_count as f64),
            (Metrics::PriceDifference(m), MeanPriceDifference) => Some(m.mean_price_difference),
            (Metrics::PriceDifference(m), BuySignalCount) => Some(m.buy_signal_count as f64),
            (Metrics::PriceDifference(m), SellSignalCount) => Some(m.sell_signal_count as f64),
            _ => None,
        }
    }
}

/// Every metric column any mode can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    ReturnMultiplierStrategy,
    ReturnMultiplierBh,
    EndingBalance,
    BuySellTradePairCount,
    OverallProfitMultiplier,
    AverageProfitMultiplier,
    BuySignalCount,
    SellSignalCount,
    MeanPriceDifference,
}

impl MetricName {
    pub const ALL: [MetricName; 9] = [
        MetricName::ReturnMultiplierStrategy,
        MetricName::ReturnMultiplierBh,
        MetricName::EndingBalance,
        MetricName::BuySellTradePairCount,
        MetricName::OverallProfitMultiplier,
        MetricName::AverageProfitMultiplier,
        MetricName::BuySignalCount,
        MetricName::SellSignalCount,
        MetricName::MeanPriceDifference,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::ReturnMultiplierStrategy => "return_multiplier_strategy",
            MetricName::ReturnMultiplierBh => "return_multiplier_bh",
            MetricName::EndingBalance => "ending_balance",
            MetricName::BuySellTradePairCount => "buy_sell_trade_pair_count",
            MetricName::OverallProfitMultiplier => "overall_profit_multiplier",
            MetricName::AverageProfitMultiplier => "average_profit_multiplier",
            MetricName::BuySignalCount => "buy_signal_count",
            MetricName::SellSignalCount => "sell_signal_count",
            MetricName::MeanPriceDifference => "mean_price_difference",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown metric '{s}'"))
    }
}
