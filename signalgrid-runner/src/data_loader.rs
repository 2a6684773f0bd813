//! Candle loading for the runner.
//!
//! Reads an already-downloaded OHLCV file (CSV with header
//! `timestamp,open,high,low,close,volume`, timestamp in epoch ms) and turns it
//! into a validated `PriceSeries`:
//! 1. Sort ascending by timestamp
//! 2. Keep the first of any duplicate timestamps
//! 3. Drop rows whose OHLCV repeats the previous row (exchange downtime)
//!
//! Synthetic data is a developer-only mode: a seeded random walk, tagged so
//! results on it are never mistaken for market data.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use signalgrid_core::domain::{Bar, PriceSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed candle file: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid price series: {0}")]
    Series(#[from] SeriesError),
}

/// A loaded series and its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: PriceSeries,
    /// BLAKE3 over every bar, for artifact fingerprints.
    pub dataset_hash: String,
    /// Rows removed by cleaning (duplicate timestamps and repeated candles).
    pub dropped_rows: usize,
    pub synthetic: bool,
}

pub fn load_csv(path: &Path) -> Result<LoadedSeries, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = read_csv(file)?;
    info!(
        path = %path.display(),
        bars = loaded.series.len(),
        dropped = loaded.dropped_rows,
        "loaded candles"
    );
    Ok(loaded)
}

/// Parse candles from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<LoadedSeries, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let bars = rdr
        .deserialize::<Bar>()
        .collect::<Result<Vec<_>, _>>()?;
    let raw = bars.len();
    let bars = clean_bars(bars);
    let dropped_rows = raw - bars.len();
    debug!(raw, kept = bars.len(), "cleaned candles");

    let series = PriceSeries::new(bars)?;
    let dataset_hash = compute_dataset_hash(&series);
    Ok(LoadedSeries {
        series,
        dataset_hash,
        dropped_rows,
        synthetic: false,
    })
}

/// Sort, de-duplicate timestamps and drop repeated candles.
pub fn clean_bars(mut bars: Vec<Bar>) -> Vec<Bar> {
    // Stable: the first row of a duplicate timestamp stays first.
    bars.sort_by_key(|b| b.timestamp);
    let mut kept: Vec<Bar> = Vec::with_capacity(bars.len());
    let mut prev: Option<Bar> = None;
    for bar in bars {
        let repeat = prev.is_some_and(|p| p.timestamp == bar.timestamp || p.same_prices(&bar));
        prev = Some(bar);
        if !repeat {
            kept.push(bar);
        }
    }
    kept
}

/// Compute a deterministic BLAKE3 hash over all bar data.
pub fn compute_dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in series.bars() {
        hasher.update(&bar.timestamp.to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate a synthetic random walk of `n_bars` one-minute candles.
///
/// Deterministic per `label`: the RNG is seeded from its BLAKE3 hash.
pub fn synthetic_series(label: &str, n_bars: usize, start_ms: i64) -> Result<LoadedSeries, LoadError> {
    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(n_bars);
    let mut price = 100.0_f64;
    for i in 0..n_bars {
        let step_return: f64 = rng.gen_range(-0.01..0.01);
        let open = price;
        let close = price * (1.0 + step_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.002));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.002));
        let volume = rng.gen_range(10.0..1_000.0);
        bars.push(Bar {
            timestamp: start_ms + i as i64 * 60_000,
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }

    let series = PriceSeries::new(bars)?;
    let dataset_hash = compute_dataset_hash(&series);
    info!(label, bars = series.len(), "generated synthetic candles");
    Ok(LoadedSeries {
        series,
        dataset_hash,
        dropped_rows: 0,
        synthetic: true,
    })
}
