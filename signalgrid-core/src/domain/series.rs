//! Validated, immutable, time-ordered bars for one instrument.

use thiserror::Error;

use super::bar::Bar;

/// Reasons a set of bars cannot form a `PriceSeries`.
///
/// Any of these is fatal to a whole grid search and must surface before
/// work is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,
    #[error("timestamps not ascending at row {index}")]
    NotAscending { index: usize },
    #[error("duplicate timestamp at row {index}")]
    DuplicateTimestamp { index: usize },
    #[error("close at row {index} is not a finite positive price")]
    InvalidClose { index: usize },
}

/// Time-ordered bars with strictly increasing timestamps.
///
/// The only way to obtain one is [`PriceSeries::new`], so every value of this
/// type upholds the ordering invariant. Fields are private: the series is
/// read-only once built and is shared by reference across sweep workers.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (i, bar) in bars.iter().enumerate() {
            if !bar.has_valid_close() {
                return Err(SeriesError::InvalidClose { index: i });
            }
            if i > 0 {
                let prev = bars[i - 1].timestamp;
                if bar.timestamp == prev {
                    return Err(SeriesError::DuplicateTimestamp { index: i });
                }
                if bar.timestamp < prev {
                    return Err(SeriesError::NotAscending { index: i });
                }
            }
        }
        Ok(Self { bars })
    }

    /// Build a series from closes only, spaced `step_ms` apart from `start_ms`.
    ///
    /// Open/high/low are set to the close and volume to zero. Handy for
    /// fixtures and for callers that only have a close column.
    pub fn from_closes(start_ms: i64, step_ms: i64, closes: &[f64]) -> Result<Self, SeriesError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start_ms + step_ms * i as i64,
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect();
        Self::new(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn close(&self, index: usize) -> f64 {
        self.bars[index].close
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }

    pub fn first(&self) -> &Bar {
        &self.bars[0]
    }

    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar {
            timestamp: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(PriceSeries::new(vec![]), Err(SeriesError::Empty));
    }

    #[test]
    fn rejects_unsorted() {
        let err = PriceSeries::new(vec![bar(2, 1.0), bar(1, 1.0)]).unwrap_err();
        assert_eq!(err, SeriesError::NotAscending { index: 1 });
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let err = PriceSeries::new(vec![bar(1, 1.0), bar(2, 1.0), bar(2, 1.1)]).unwrap_err();
        assert_eq!(err, SeriesError::DuplicateTimestamp { index: 2 });
    }

    #[test]
    fn rejects_bad_close() {
        let err = PriceSeries::new(vec![bar(1, 1.0), bar(2, -3.0)]).unwrap_err();
        assert_eq!(err, SeriesError::InvalidClose { index: 1 });
    }

    #[test]
    fn from_closes_spaces_timestamps() {
        let s = PriceSeries::from_closes(0, 60_000, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.bars()[2].timestamp, 120_000);
        assert_eq!(s.closes().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(s.first().close, 1.0);
        assert_eq!(s.last().close, 3.0);
    }
}
