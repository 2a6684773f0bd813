//! Cleaning passes applied to raw signals before evaluation.

use crate::domain::{Signal, SignalPoint};

/// Keep only the first event of every run of same-type events.
///
/// Flat rows between two same-type events do not break the run; only an
/// opposite event does. Dropped events become `Signal::None` so the rows
/// stay aligned with the price data.
pub fn collapse_runs(points: &mut [SignalPoint]) {
    let mut last: Option<Signal> = None;
    for point in points.iter_mut() {
        if !point.signal.is_event() {
            continue;
        }
        if last == Some(point.signal) {
            point.signal = Signal::None;
        } else {
            last = Some(point.signal);
        }
    }
}

/// Restrict to the span from the first Buy through the last Sell after it.
///
/// Returns an empty vector when there is no Buy or no Sell after the first
/// Buy. The result starts with a Buy and ends with a Sell.
pub fn trim_to_round_trips(points: Vec<SignalPoint>) -> Vec<SignalPoint> {
    let Some(first_buy) = points.iter().position(|p| p.signal == Signal::Buy) else {
        return Vec::new();
    };
    let Some(last_sell) = points.iter().rposition(|p| p.signal == Signal::Sell) else {
        return Vec::new();
    };
    if last_sell < first_buy {
        return Vec::new();
    }
    let mut points = points;
    points.truncate(last_sell + 1);
    points.drain(..first_buy);
    points
}

/// True when events strictly alternate (ignoring flat rows).
pub fn alternates(points: &[SignalPoint]) -> bool {
    let events: Vec<Signal> = points
        .iter()
        .map(|p| p.signal)
        .filter(|s| s.is_event())
        .collect();
    events.windows(2).all(|w| w[0] != w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(signals: &[Signal]) -> Vec<SignalPoint> {
        signals
            .iter()
            .enumerate()
            .map(|(i, &signal)| SignalPoint {
                index: i,
                timestamp: i as i64,
                close: 100.0 + i as f64,
                signal,
            })
            .collect()
    }

    fn kinds(points: &[SignalPoint]) -> Vec<Signal> {
        points.iter().map(|p| p.signal).collect()
    }

    use Signal::{Buy as B, None as N, Sell as S};

    #[test]
    fn collapse_keeps_first_of_each_run() {
        let mut p = points(&[B, N, B, S, S, N, S, B]);
        collapse_runs(&mut p);
        assert_eq!(kinds(&p), vec![B, N, N, S, N, N, N, B]);
        assert!(alternates(&p));
    }

    #[test]
    fn collapse_is_idempotent() {
        let mut p = points(&[S, S, B, B, S]);
        collapse_runs(&mut p);
        let once = kinds(&p);
        collapse_runs(&mut p);
        assert_eq!(kinds(&p), once);
        assert_eq!(once, vec![S, N, B, N, S]);
    }

    #[test]
    fn trim_spans_first_buy_to_last_sell() {
        let p = trim_to_round_trips(points(&[S, N, B, N, S, B, S, B, N]));
        assert_eq!(kinds(&p), vec![B, N, S, B, S]);
        assert_eq!(p[0].index, 2);
        assert_eq!(p.last().unwrap().index, 6);
    }

    #[test]
    fn trim_without_sell_after_buy_is_empty() {
        assert!(trim_to_round_trips(points(&[S, N, B, N])).is_empty());
        assert!(trim_to_round_trips(points(&[N, N])).is_empty());
        assert!(trim_to_round_trips(points(&[B, B])).is_empty());
    }

    #[test]
    fn alternation_check() {
        assert!(alternates(&points(&[B, N, S, B, N, N, S])));
        assert!(!alternates(&points(&[B, N, B])));
        assert!(alternates(&[]));
    }
}
