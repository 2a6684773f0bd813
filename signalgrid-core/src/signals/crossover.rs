//! Crossover and threshold-crossing detection.
//!
//! All detectors compare row t with row t-1 of the same series, so the first
//! row handed to them can never fire. Any undefined input on either row
//! suppresses the signal for that row.

use crate::domain::Signal;

/// Moving-average style crossover between a fast and a slow line.
///
/// The state at a row is "above" when `fast >= slow` and "below" otherwise.
/// Buy fires on a below-to-above flip, Sell on an above-to-below flip, so
/// crossovers of two fully defined lines alternate by construction.
///
/// Returns one signal per row of `start..len`.
pub fn crossovers(fast: &[Option<f64>], slow: &[Option<f64>], start: usize) -> Vec<Signal> {
    let n = fast.len().min(slow.len());
    (start..n)
        .map(|t| {
            if t == start {
                return Signal::None;
            }
            match (fast[t - 1], slow[t - 1], fast[t], slow[t]) {
                (Some(f0), Some(s0), Some(f1), Some(s1)) => {
                    let was_above = f0 >= s0;
                    let is_above = f1 >= s1;
                    match (was_above, is_above) {
                        (false, true) => Signal::Buy,
                        (true, false) => Signal::Sell,
                        _ => Signal::None,
                    }
                }
                _ => Signal::None,
            }
        })
        .collect()
}

/// `line` moves from strictly below `level` to at-or-above it at row `t`.
pub fn crosses_above(line: &[Option<f64>], level: f64, t: usize) -> bool {
    match pair(line, t) {
        Some((prev, cur)) => prev < level && cur >= level,
        None => false,
    }
}

/// `line` moves from strictly above `level` to at-or-below it at row `t`.
pub fn crosses_below(line: &[Option<f64>], level: f64, t: usize) -> bool {
    match pair(line, t) {
        Some((prev, cur)) => prev > level && cur <= level,
        None => false,
    }
}

/// `line` turns non-negative at row `t` after a negative row.
pub fn turns_non_negative(line: &[Option<f64>], t: usize) -> bool {
    match pair(line, t) {
        Some((prev, cur)) => prev < 0.0 && cur >= 0.0,
        None => false,
    }
}

/// `line` turns negative at row `t` after a non-negative row.
pub fn turns_negative(line: &[Option<f64>], t: usize) -> bool {
    match pair(line, t) {
        Some((prev, cur)) => prev >= 0.0 && cur < 0.0,
        None => false,
    }
}

fn pair(line: &[Option<f64>], t: usize) -> Option<(f64, f64)> {
    if t == 0 || t >= line.len() {
        return None;
    }
    Some((line[t - 1]?, line[t]?))
}
