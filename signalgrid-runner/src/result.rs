//! Result table — one record per evaluated combination, plus ranking and
//! two-parameter pivots for heatmap consumers.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signalgrid_core::evaluation::{EvaluationMode, EvaluationOutcome, MetricName};
use signalgrid_core::params::{ParamName, ParameterCombination};
use signalgrid_core::strategy::StrategyKind;

/// A parameter combination and what happened when it was evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub combination: ParameterCombination,
    pub outcome: EvaluationOutcome,
}

impl EvaluationRecord {
    pub fn metric(&self, name: MetricName) -> Option<f64> {
        self.outcome.metric(name)
    }

    pub fn param(&self, name: ParamName) -> Option<usize> {
        self.combination.get(name)
    }
}

/// Records of one grid search, in enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    strategy: StrategyKind,
    mode: EvaluationMode,
    param_names: Vec<ParamName>,
    records: Vec<EvaluationRecord>,
}

impl ResultTable {
    pub fn new(
        strategy: StrategyKind,
        mode: EvaluationMode,
        param_names: Vec<ParamName>,
        records: Vec<EvaluationRecord>,
    ) -> Self {
        Self {
            strategy,
            mode,
            param_names,
            records,
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Parameter columns, in grid order.
    pub fn param_names(&self) -> &[ParamName] {
        &self.param_names
    }

    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_status(&self, status: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.status() == status)
            .count()
    }

    /// All records, best `metric` first. Records without the metric go last,
    /// and ties keep enumeration order.
    pub fn sorted_by(&self, metric: MetricName) -> Vec<&EvaluationRecord> {
        let mut sorted: Vec<&EvaluationRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| match (a.metric(metric), b.metric(metric)) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        sorted
    }

    /// The `n` best records that carry `metric`.
    pub fn top_n(&self, metric: MetricName, n: usize) -> Vec<&EvaluationRecord> {
        self.sorted_by(metric)
            .into_iter()
            .filter(|r| r.metric(metric).is_some())
            .take(n)
            .collect()
    }

    pub fn best(&self, metric: MetricName) -> Option<&EvaluationRecord> {
        self.top_n(metric, 1).into_iter().next()
    }

    /// Mean of `metric` for every (`row`, `col`) value pair.
    ///
    /// Records sharing a cell (other swept params differ) are averaged;
    /// cells with no completed record are `None`.
    pub fn pivot(
        &self,
        row: ParamName,
        col: ParamName,
        metric: MetricName,
    ) -> Result<Pivot, PivotError> {
        if row == col {
            return Err(PivotError::SameParameter(row));
        }
        for name in [row, col] {
            if !self.param_names.contains(&name) {
                return Err(PivotError::UnknownParameter(name));
            }
        }
        if !self.mode.metric_names().contains(&metric) {
            return Err(PivotError::MetricNotProduced {
                metric,
                mode: self.mode,
            });
        }

        let mut sums: BTreeMap<(usize, usize), (f64, usize)> = BTreeMap::new();
        let mut row_keys = Vec::new();
        let mut col_keys = Vec::new();
        for record in &self.records {
            let (Some(r), Some(c)) = (record.param(row), record.param(col)) else {
                continue;
            };
            row_keys.push(r);
            col_keys.push(c);
            if let Some(value) = record.metric(metric) {
                let cell = sums.entry((r, c)).or_insert((0.0, 0));
                cell.0 += value;
                cell.1 += 1;
            }
        }
        row_keys.sort_unstable();
        row_keys.dedup();
        col_keys.sort_unstable();
        col_keys.dedup();

        let cells = row_keys
            .iter()
            .map(|&r| {
                col_keys
                    .iter()
                    .map(|&c| sums.get(&(r, c)).map(|&(sum, n)| sum / n as f64))
                    .collect()
            })
            .collect();

        Ok(Pivot {
            row_param: row,
            col_param: col,
            metric,
            row_keys,
            col_keys,
            cells,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PivotError {
    #[error("parameter '{0}' is not a column of this table")]
    UnknownParameter(ParamName),
    #[error("cannot pivot '{0}' against itself")]
    SameParameter(ParamName),
    #[error("metric '{metric}' is not produced in {mode} mode")]
    MetricNotProduced {
        metric: MetricName,
        mode: EvaluationMode,
    },
}

/// A metric laid out on a (row param × col param) grid, keys ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub row_param: ParamName,
    pub col_param: ParamName,
    pub metric: MetricName,
    pub row_keys: Vec<usize>,
    pub col_keys: Vec<usize>,
    /// `cells[i][j]` is the value at (`row_keys[i]`, `col_keys[j]`).
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Pivot {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let i = self.row_keys.iter().position(|&k| k == row)?;
        let j = self.col_keys.iter().position(|&k| k == col)?;
        self.cells[i][j]
    }
}
