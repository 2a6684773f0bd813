//! Signal generation — indicator lines in, cleaned Buy/Sell series out.
//!
//! A strategy runs the stages it needs, in order:
//! 1. crossover / threshold detection (`crossover`)
//! 2. confirmation filter: unconfirmed events become `Signal::None`
//! 3. run-collapse (`clean::collapse_runs`)
//! 4. boundary trim (`clean::trim_to_round_trips`)

pub mod clean;
pub mod crossover;

pub use clean::{alternates, collapse_runs, trim_to_round_trips};
pub use crossover::{crosses_above, crosses_below, crossovers, turns_negative, turns_non_negative};

use crate::domain::{PriceSeries, Signal, SignalPoint};

/// First row at which every line is defined, if any.
///
/// Rows before it are the indicators' warmup and are dropped before signal
/// generation.
pub fn first_common_row(lines: &[&[Option<f64>]]) -> Option<usize> {
    let n = lines.iter().map(|l| l.len()).min()?;
    (0..n).find(|&i| lines.iter().all(|l| l[i].is_some()))
}

/// Pin `signals` (one per row from `start`) to their bars.
pub fn attach(series: &PriceSeries, start: usize, signals: &[Signal]) -> Vec<SignalPoint> {
    series.bars()[start..]
        .iter()
        .zip(signals)
        .enumerate()
        .map(|(offset, (bar, &signal))| SignalPoint {
            index: start + offset,
            timestamp: bar.timestamp,
            close: bar.close,
            signal,
        })
        .collect()
}

/// Turn events that fail `confirm` into `Signal::None`.
///
/// `confirm` receives the absolute row index and the event.
pub fn confirm_with<F>(signals: &mut [Signal], start: usize, confirm: F)
where
    F: Fn(usize, Signal) -> bool,
{
    for (offset, signal) in signals.iter_mut().enumerate() {
        if signal.is_event() && !confirm(start + offset, *signal) {
            *signal = Signal::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_series;

    #[test]
    fn first_common_row_waits_for_all_lines() {
        let a = vec![None, Some(1.0), Some(1.0), Some(1.0)];
        let b = vec![None, None, None, Some(2.0)];
        assert_eq!(first_common_row(&[&a, &b]), Some(3));
        let c = vec![None, None];
        assert_eq!(first_common_row(&[&a, &c]), None);
        assert_eq!(first_common_row(&[]), None);
    }

    #[test]
    fn attach_uses_absolute_rows() {
        let series = make_series(&[1.0, 2.0, 3.0, 4.0]);
        let points = attach(&series, 2, &[Signal::None, Signal::Buy]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].index, 3);
        assert_eq!(points[1].close, 4.0);
        assert_eq!(points[1].timestamp, series.bars()[3].timestamp);
    }

    #[test]
    fn confirm_discards_rather_than_defers() {
        let mut signals = vec![Signal::Buy, Signal::None, Signal::Sell, Signal::Buy];
        confirm_with(&mut signals, 10, |row, _| row != 12);
        assert_eq!(
            signals,
            vec![Signal::Buy, Signal::None, Signal::None, Signal::Buy]
        );
    }
}
