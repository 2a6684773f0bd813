//! Signal values and the per-row signal series a strategy emits.

use serde::{Deserialize, Serialize};

/// Action at one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    None,
}

impl Signal {
    /// Buy or Sell.
    pub fn is_event(self) -> bool {
        !matches!(self, Signal::None)
    }
}

/// One row of a signal series, pinned to its bar in the source `PriceSeries`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    /// Row index into the `PriceSeries` the signals were generated from.
    pub index: usize,
    pub timestamp: i64,
    pub close: f64,
    pub signal: Signal,
}

/// Signals over the rows where a strategy's indicators are all defined.
///
/// Flat rows are kept as `Signal::None` so the series stays aligned with the
/// price data; consumers that only care about trades use [`events`].
///
/// [`events`]: SignalSeries::events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    points: Vec<SignalPoint>,
}

impl SignalSeries {
    pub fn new(points: Vec<SignalPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[SignalPoint] {
        &self.points
    }


    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Rows carrying a Buy or Sell, in chronological order.
    pub fn events(&self) -> impl Iterator<Item = &SignalPoint> + '_ {
        self.points.iter().filter(|p| p.signal.is_event())
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.points.iter().filter(|p| p.signal == signal).count()
    }

    /// Closes at every Buy, chronologically.
    pub fn buy_closes(&self) -> Vec<f64> {
        self.closes_for(Signal::Buy)
    }

    /// Closes at every Sell, chronologically.
    pub fn sell_closes(&self) -> Vec<f64> {
        self.closes_for(Signal::Sell)
    }

    fn closes_for(&self, signal: Signal) -> Vec<f64> {
        self.points
            .iter()
            .filter(|p| p.signal == signal)
            .map(|p| p.close)
            .collect()
    }
}
