//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for one instrument at one timestamp.
///
/// `timestamp` is the candle open time in epoch milliseconds, the format
/// exchanges hand out for kline data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Timestamp as a UTC instant. `None` if out of chrono's range.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// True when the close can be used as a price (finite and positive).
    pub fn has_valid_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }

    /// True when OHLCV all equal `other`'s, ignoring the timestamp.
    ///
    /// Exchanges repeat the previous candle while trading is halted; the
    /// loader uses this to drop those rows.
    pub fn same_prices(&self, other: &Bar) -> bool {
        self.open == other.open
            && self.high == other.high
            && self.low == other.low
            && self.close == other.close
            && self.volume == other.volume
    }
}
