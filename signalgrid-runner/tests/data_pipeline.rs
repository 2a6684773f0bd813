//! Integration tests for the runner's data pipeline.
//!
//! These tests write a candle CSV and a sweep config to a temp directory,
//! run the sweep end to end, and check the exported artifacts.

use std::fs;

use signalgrid_core::evaluation::EvaluationMode;
use signalgrid_runner::{
    import_json, load_csv, save_sweep, synthetic_series, ConfigError, GridSearch, LoadError,
    SweepConfig,
};

fn write_candles(dir: &std::path::Path, n: usize) -> std::path::PathBuf {
    let source = synthetic_series("pipeline", n, 1_700_000_000_000).unwrap();
    let mut csv = String::from("timestamp,open,high,low,close,volume\n");
    // Reverse order plus a duplicated candle: the loader must sort and drop it.
    let bars = source.series.bars();
    for bar in bars.iter().rev() {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    let dup = bars[10];
    csv.push_str(&format!(
        "{},{},{},{},{},{}\n",
        dup.timestamp, dup.open, dup.high, dup.low, dup.close, dup.volume
    ));
    let path = dir.join("candles.csv");
    fs::write(&path, csv).unwrap();
    path
}

const CONFIG: &str = r#"
[strategy]
kind = "sma_crossover"

[costs]
commission = 0.001
initial_cash = 1000.0

[sweep]
threads = 2

[[grid.axis]]
name = "window_sma_short"
from = 2
to = 6

[[grid.axis]]
name = "window_sma_long"
values = [5, 10, 20]
"#;

#[test]
fn csv_to_artifacts_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let candles = write_candles(dir.path(), 400);
    let config_path = dir.path().join("sweep.toml");
    fs::write(&config_path, CONFIG).unwrap();

    let loaded = load_csv(&candles).unwrap();
    assert_eq!(loaded.series.len(), 400);
    assert_eq!(loaded.dropped_rows, 1);
    let original = synthetic_series("pipeline", 400, 1_700_000_000_000).unwrap();
    assert_eq!(loaded.dataset_hash, original.dataset_hash);

    let config = SweepConfig::load(&config_path).unwrap();
    let grid = config.grid().unwrap();
    let mut search = GridSearch::new(config.settings());
    if let Some(threads) = config.sweep.threads {
        search = search.with_threads(threads);
    }
    let table = search
        .run(config.strategy.kind, &loaded.series, &grid)
        .unwrap();
    // 5 shorts x 3 longs minus (5,5).
    assert_eq!(table.len(), 14);
    assert_eq!(table.mode(), EvaluationMode::Position);

    let out = dir.path().join("out");
    save_sweep(&out, &table, &config.run_id(), &loaded.dataset_hash).unwrap();

    let csv = fs::read_to_string(out.join("results.csv")).unwrap();
    assert_eq!(csv.lines().count(), 15);
    assert!(csv.lines().next().unwrap().starts_with("window_sma_short,window_sma_long,"));

    let artifact = import_json(&fs::read_to_string(out.join("sweep.json")).unwrap()).unwrap();
    assert_eq!(artifact.run_id, config.run_id());
    assert_eq!(artifact.dataset_hash, loaded.dataset_hash);
    assert_eq!(artifact.records, table.records());
}

#[test]
fn missing_candle_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_csv(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn malformed_config_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[strategy\nkind = ").unwrap();
    assert!(matches!(
        SweepConfig::load(&path).unwrap_err(),
        ConfigError::Parse(_)
    ));
}
