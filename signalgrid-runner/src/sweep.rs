//! Grid search — evaluate every combination of a grid on a rayon pool.
//!
//! Each task configures its own strategy, computes its own indicators and
//! produces exactly one record; the price series is the only shared input
//! and is read through `&`. Records come back in enumeration order (indexed
//! parallel collect), so serial and parallel runs produce the same table.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use signalgrid_core::domain::PriceSeries;
use signalgrid_core::evaluation::{EvaluationMode, EvaluationOutcome, FailureKind};
use signalgrid_core::params::ParameterCombination;
use signalgrid_core::strategy::{StrategyKind, StrategySettings};

use crate::grid::ParameterGrid;
use crate::result::{EvaluationRecord, ResultTable};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("grid search cancelled")]
    Cancelled,
}

/// Cooperative cancellation flag shared between a caller and a running
/// search. Checked before each task starts; tasks already running finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Worker count: `requested` capped at the available cores, or all cores.
pub fn worker_count(requested: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.map_or(cores, |n| n.clamp(1, cores))
}

/// Grid-search executor.
#[derive(Debug, Clone)]
pub struct GridSearch {
    settings: StrategySettings,
    threads: Option<usize>,
    cancel: CancelToken,
}

impl GridSearch {
    pub fn new(settings: StrategySettings) -> Self {
        Self {
            settings,
            threads: None,
            cancel: CancelToken::new(),
        }
    }

    /// Cap the worker pool at `threads` (still limited by available cores).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle for cancelling this search from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    /// Mode every record of a `kind` search is evaluated in.
    pub fn mode_for(&self, kind: StrategyKind) -> EvaluationMode {
        self.settings.evaluation.unwrap_or_else(|| kind.default_mode())
    }

    pub fn run(
        &self,
        kind: StrategyKind,
        series: &PriceSeries,
        grid: &ParameterGrid,
    ) -> Result<ResultTable, SweepError> {
        self.run_with_progress(kind, series, grid, |_, _| {})
    }

    /// Run the search, calling `progress(completed, total)` after each task.
    ///
    /// Cancellation is all-or-nothing: once the token fires, completed
    /// records are discarded and `Cancelled` is returned.
    pub fn run_with_progress<F>(
        &self,
        kind: StrategyKind,
        series: &PriceSeries,
        grid: &ParameterGrid,
        progress: F,
    ) -> Result<ResultTable, SweepError>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let combinations = grid.enumerate();
        let total = combinations.len();
        let threads = worker_count(self.threads);
        let mode = self.mode_for(kind);
        info!(
            strategy = %kind,
            %mode,
            combinations = total,
            threads,
            bars = series.len(),
            "starting grid search"
        );

        let started = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        let done = AtomicUsize::new(0);

        let records: Vec<Option<EvaluationRecord>> = pool.install(|| {
            combinations
                .par_iter()
                .map(|combination| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    let record = self.evaluate_one(kind, series, combination);
                    let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
                    progress(completed, total);
                    Some(record)
                })
                .collect()
        });

        if self.cancel.is_cancelled() {
            info!(
                completed = done.load(Ordering::Relaxed),
                total, "grid search cancelled"
            );
            return Err(SweepError::Cancelled);
        }
        let records: Vec<EvaluationRecord> = records.into_iter().flatten().collect();

        let table = ResultTable::new(kind, mode, grid.param_names(), records);
        info!(
            rows = table.len(),
            completed = table.count_status("completed"),
            no_completed_trades = table.count_status("no_completed_trades"),
            failed = table.count_status("failed"),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "grid search finished"
        );
        Ok(table)
    }

    /// Evaluate a single combination.
    ///
    /// Never fails: configuration errors, invalid windows and panics all
    /// become a `Failed` outcome on the returned record.
    pub fn evaluate_one(
        &self,
        kind: StrategyKind,
        series: &PriceSeries,
        combination: &ParameterCombination,
    ) -> EvaluationRecord {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.evaluate_unguarded(kind, series, combination)
        }))
        .unwrap_or_else(|payload| EvaluationOutcome::Failed {
            kind: FailureKind::Panic,
            message: panic_message(payload.as_ref()),
        });

        match &outcome {
            EvaluationOutcome::Failed { kind: failure, message } => {
                warn!(%combination, %failure, %message, "combination failed");
            }
            other => debug!(%combination, status = other.status(), "combination evaluated"),
        }

        EvaluationRecord {
            combination: combination.clone(),
            outcome,
        }
    }

    fn evaluate_unguarded(
        &self,
        kind: StrategyKind,
        series: &PriceSeries,
        combination: &ParameterCombination,
    ) -> EvaluationOutcome {
        let strategy = match kind.configure(combination, &self.settings) {
            Ok(strategy) => strategy,
            Err(e) => {
                return EvaluationOutcome::Failed {
                    kind: e.failure_kind(),
                    message: e.to_string(),
                }
            }
        };
        match strategy.evaluate(series) {
            Ok(outcome) => outcome,
            Err(e) => EvaluationOutcome::Failed {
                kind: FailureKind::InvalidWindow,
                message: e.to_string(),
            },
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Axis;
    use signalgrid_core::params::ParamName;

    fn series(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0)
            .collect();
        PriceSeries::from_closes(0, 60_000, &closes).unwrap()
    }

    fn sma_grid(shorts: &[usize], longs: &[usize]) -> ParameterGrid {
        ParameterGrid::sweep(vec![
            Axis::new(ParamName::WindowSmaShort, shorts.to_vec()).unwrap(),
            Axis::new(ParamName::WindowSmaLong, longs.to_vec()).unwrap(),
        ])
    }

    #[test]
    fn worker_count_is_capped() {
        let cores = worker_count(None);
        assert!(cores >= 1);
        assert_eq!(worker_count(Some(0)), 1);
        assert_eq!(worker_count(Some(usize::MAX)), cores);
    }

    #[test]
    fn one_row_per_valid_combination() {
        let grid = sma_grid(&[2, 3, 4], &[3, 5]);
        let table = GridSearch::new(StrategySettings::default())
            .with_threads(2)
            .run(StrategyKind::SmaCrossover, &series(120), &grid)
            .unwrap();
        assert_eq!(table.len(), grid.len_valid());
        assert_eq!(table.mode(), EvaluationMode::Position);
        let combos: Vec<_> = table.records().iter().map(|r| r.combination.clone()).collect();
        assert_eq!(combos, grid.enumerate());
    }

    #[test]
    fn progress_reaches_total() {
        let grid = sma_grid(&[2, 3], &[5, 8]);
        let last = AtomicUsize::new(0);
        let calls = AtomicUsize::new(0);
        GridSearch::new(StrategySettings::default())
            .run_with_progress(StrategyKind::SmaCrossover, &series(80), &grid, |done, total| {
                assert_eq!(total, 4);
                last.fetch_max(done, Ordering::Relaxed);
                calls.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(last.load(Ordering::Relaxed), 4);
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn pre_cancelled_search_returns_nothing() {
        let search = GridSearch::new(StrategySettings::default());
        search.cancel_token().cancel();
        let result = search.run(
            StrategyKind::SmaCrossover,
            &series(60),
            &sma_grid(&[2, 3], &[5]),
        );
        assert!(matches!(result, Err(SweepError::Cancelled)));
    }

    #[test]
    fn misconfigured_combination_is_a_failed_row() {
        let search = GridSearch::new(StrategySettings::default());
        let combination = ParameterCombination::new(vec![(ParamName::WindowTrix, 3)]);
        let record = search.evaluate_one(StrategyKind::SmaCrossover, &series(30), &combination);
        assert!(matches!(
            record.outcome,
            EvaluationOutcome::Failed {
                kind: FailureKind::UnexpectedParameter,
                ..
            }
        ));
    }

    #[test]
    fn panic_payloads_are_readable() {
        let payload = panic::catch_unwind(|| panic!("boom {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 7");
        let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");
    }
}
