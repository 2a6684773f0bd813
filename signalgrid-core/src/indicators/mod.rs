//! Windowed indicators over a `PriceSeries`.
//!
//! Every indicator is a pure function of the series and its window: no
//! caches, no interior mutability, safe to call from any number of sweep
//! workers at once. Output is aligned index-for-index with the input; rows
//! without a defined value (warmup, or a mathematically undefined value such
//! as a zero-range stochastic) are `None` rather than NaN.

pub mod ema;
pub mod rsi;
pub mod sma;
pub mod stoch_rsi;
pub mod trix;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PriceSeries;

pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stoch_rsi::{StochRsi, StochRsiLines, StochSmoothing};
pub use trix::Trix;

/// Indicator output, one entry per bar; `None` where undefined.
pub type IndicatorSeries = Vec<Option<f64>>;

/// Trait for indicators.
///
/// # Look-ahead guard
/// The value at row t may only depend on closes at rows `0..=t`.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "trix_9").
    fn name(&self) -> &str;

    /// Index of the first row that can carry a value.
    fn lookback(&self) -> usize;

    /// Compute over the entire series; output length equals `series.len()`.
    fn compute(&self, series: &PriceSeries) -> IndicatorSeries;
}

/// Indicator selector for [`compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Trix,
    /// Stochastic RSI %K line with the given smoothing.
    StochRsi(StochSmoothing),
    /// Stochastic RSI %D line: %K smoothed again by `smoothing.d`.
    StochRsiD(StochSmoothing),
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma => f.write_str("sma"),
            IndicatorKind::Ema => f.write_str("ema"),
            IndicatorKind::Trix => f.write_str("trix"),
            IndicatorKind::StochRsi(s) => write!(f, "stoch_rsi(k={}, d={})", s.k, s.d),
            IndicatorKind::StochRsiD(s) => write!(f, "stoch_rsi_d(k={}, d={})", s.k, s.d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("invalid {kind} window {window} for a series of {len} bars")]
    InvalidWindow {
        kind: IndicatorKind,
        window: usize,
        len: usize,
    },
}

/// Compute `kind` over `series` with the given window.
///
/// Fails fast with `InvalidWindow` when `window` is zero or longer than the
/// series, before any work is done.
pub fn compute(
    series: &PriceSeries,
    kind: IndicatorKind,
    window: usize,
) -> Result<IndicatorSeries, IndicatorError> {
    if window < 1 || window > series.len() {
        return Err(IndicatorError::InvalidWindow {
            kind,
            window,
            len: series.len(),
        });
    }
    let values = match kind {
        IndicatorKind::Sma => Sma::new(window).compute(series),
        IndicatorKind::Ema => Ema::new(window).compute(series),
        IndicatorKind::Trix => Trix::new(window).compute(series),
        IndicatorKind::StochRsi(smoothing) => StochRsi::new(window, smoothing).compute(series),
        IndicatorKind::StochRsiD(smoothing) => {
            StochRsi::new(window, smoothing).compute_lines(series).d
        }
    };
    Ok(values)
}

/// Synthetic series from closes, one bar per minute.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(1_700_000_000_000, 60_000, closes).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
