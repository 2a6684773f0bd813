//! SignalGrid Runner — grid search orchestration, result tables, config,
//! data loading, export.
//!
//! This crate builds on `signalgrid-core` to provide:
//! - Parameter grids (fixed params plus swept axes)
//! - Parallel grid search on a rayon pool with progress and cancellation
//! - Result tables with ranking and two-parameter pivots
//! - TOML sweep configuration with a content-addressed run id
//! - Candle CSV loading and synthetic series
//! - CSV and JSON export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod grid;
pub mod result;
pub mod sweep;

pub use config::{ConfigError, RunId, SweepConfig};
pub use data_loader::{load_csv, read_csv, synthetic_series, LoadError, LoadedSeries};
pub use export::{
    export_json, export_pivot_csv, export_results_csv, import_json, save_sweep, SweepArtifact,
    SCHEMA_VERSION,
};
pub use grid::{Axis, GridError, ParameterGrid};
pub use result::{EvaluationRecord, Pivot, PivotError, ResultTable};
pub use sweep::{worker_count, CancelToken, GridSearch, SweepError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<EvaluationRecord>();
        assert_sync::<EvaluationRecord>();
        assert_send::<ResultTable>();
        assert_sync::<ResultTable>();
    }

    #[test]
    fn search_types_are_send_sync() {
        assert_send::<GridSearch>();
        assert_sync::<GridSearch>();
        assert_send::<CancelToken>();
        assert_sync::<CancelToken>();
        assert_send::<ParameterGrid>();
        assert_sync::<ParameterGrid>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<SweepConfig>();
        assert_sync::<SweepConfig>();
        assert_send::<LoadedSeries>();
        assert_sync::<LoadedSeries>();
    }
}
