//! Result table export: CSV, versioned JSON artifact and pivot CSV.
//!
//! All persisted JSON artifacts include a `schema_version` field. Unknown
//! (newer) versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use signalgrid_core::evaluation::{EvaluationMode, EvaluationOutcome};
use signalgrid_core::strategy::StrategyKind;

use crate::config::RunId;
use crate::result::{EvaluationRecord, Pivot, ResultTable};

/// Current artifact schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything needed to reproduce and inspect one grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepArtifact {
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    pub strategy: StrategyKind,
    pub mode: EvaluationMode,
    pub records: Vec<EvaluationRecord>,
}

impl SweepArtifact {
    pub fn new(table: &ResultTable, run_id: RunId, dataset_hash: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id,
            dataset_hash,
            strategy: table.strategy(),
            mode: table.mode(),
            records: table.records().to_vec(),
        }
    }
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(artifact: &SweepArtifact) -> Result<String> {
    serde_json::to_string_pretty(artifact).context("failed to serialize sweep artifact to JSON")
}

/// Deserialize an artifact, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SweepArtifact> {
    let artifact: SweepArtifact =
        serde_json::from_str(json).context("failed to deserialize sweep artifact from JSON")?;
    if artifact.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            artifact.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(artifact)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per record.
///
/// Columns: the table's parameter names, the metric names of its mode,
/// `status`, `detail`. Metric cells are empty for rows that did not complete;
/// `detail` carries the failure kind and message, or the raw signal counts of
/// a row without completed trades.
pub fn export_results_csv(table: &ResultTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let metrics = table.mode().metric_names();

    let mut header: Vec<String> = table
        .param_names()
        .iter()
        .map(|p| p.to_string())
        .collect();
    header.extend(metrics.iter().map(|m| m.to_string()));
    header.push("status".into());
    header.push("detail".into());
    wtr.write_record(&header)?;

    for record in table.records() {
        let mut row: Vec<String> = table
            .param_names()
            .iter()
            .map(|&p| record.param(p).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        row.extend(
            metrics
                .iter()
                .map(|&m| record.metric(m).map(format_value).unwrap_or_default()),
        );
        row.push(record.outcome.status().to_string());
        row.push(detail(&record.outcome));
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Pivot as a matrix: first column holds row keys, header holds column keys.
pub fn export_pivot_csv(pivot: &Pivot) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec![format!("{}\\{}", pivot.row_param, pivot.col_param)];
    header.extend(pivot.col_keys.iter().map(|k| k.to_string()));
    wtr.write_record(&header)?;
    for (key, cells) in pivot.row_keys.iter().zip(&pivot.cells) {
        let mut row = vec![key.to_string()];
        row.extend(cells.iter().map(|c| c.map(format_value).unwrap_or_default()));
        wtr.write_record(&row)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.10}")
    }
}

fn detail(outcome: &EvaluationOutcome) -> String {
    match outcome {
        EvaluationOutcome::Completed(_) => String::new(),
        EvaluationOutcome::NoCompletedTrades {
            buy_signals,
            sell_signals,
        } => format!("buys={buy_signals} sells={sell_signals}"),
        EvaluationOutcome::Failed { kind, message } => format!("{kind}: {message}"),
    }
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `results.csv` and `sweep.json` for one grid search into
/// `output_dir`, creating it if needed. Returns the directory.
pub fn save_sweep(
    output_dir: &Path,
    table: &ResultTable,
    run_id: &str,
    dataset_hash: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let csv = export_results_csv(table)?;
    let csv_path = output_dir.join("results.csv");
    std::fs::write(&csv_path, csv)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;

    let artifact = SweepArtifact::new(table, run_id.to_string(), dataset_hash.to_string());
    let json_path = output_dir.join("sweep.json");
    std::fs::write(&json_path, export_json(&artifact)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    Ok(output_dir.to_path_buf())
}
