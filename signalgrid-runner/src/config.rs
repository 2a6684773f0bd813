//! Sweep configuration loaded from TOML.
//!
//! ```toml
//! [strategy]
//! kind = "sma_trix"
//! evaluation = "trade_pairs"   # optional override
//!
//! [costs]
//! commission = 0.001
//! initial_cash = 1000.0
//!
//! [[grid.fixed]]
//! name = "window_sma_short"
//! value = 2
//!
//! [[grid.axis]]
//! name = "window_trix"
//! from = 2
//! to = 40
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signalgrid_core::evaluation::{Costs, EvaluationMode};
use signalgrid_core::indicators::StochSmoothing;
use signalgrid_core::params::{ParamName, ParameterCombination};
use signalgrid_core::strategy::{StrategyKind, StrategySettings};

use crate::grid::{Axis, ParameterGrid};

/// Unique identifier for a sweep (content-addressable hash of its config).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    pub strategy: StrategySection,
    #[serde(default)]
    pub costs: Costs,
    #[serde(default)]
    pub stoch_rsi: StochRsiSection,
    #[serde(default)]
    pub sweep: SweepSection,
    #[serde(default)]
    pub grid: GridSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySection {
    pub kind: StrategyKind,
    #[serde(default)]
    pub evaluation: Option<EvaluationMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochRsiSection {
    pub smooth_k: usize,
    pub smooth_d: usize,
}

impl Default for StochRsiSection {
    fn default() -> Self {
        let d = StochSmoothing::default();
        Self {
            smooth_k: d.k,
            smooth_d: d.d,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSection {
    /// Worker threads; all cores when absent.
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    pub fixed: Vec<FixedParam>,
    pub axis: Vec<AxisSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedParam {
    pub name: ParamName,
    pub value: usize,
}

/// A swept axis: either explicit `values` or an inclusive `from..=to` range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisSpec {
    pub name: ParamName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

impl AxisSpec {
    pub fn to_axis(&self) -> Result<Axis, ConfigError> {
        let axis = match (&self.values, self.from, self.to) {
            (Some(values), None, None) if self.step.is_none() => {
                Axis::new(self.name, values.clone())
            }
            (None, Some(from), Some(to)) => Axis::range(self.name, from, to, self.step.unwrap_or(1)),
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "axis '{}' needs either `values` or both `from` and `to`",
                    self.name
                )))
            }
        };
        axis.map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl SweepConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SweepConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.costs;
        if !(c.commission.is_finite() && (0.0..1.0).contains(&c.commission)) {
            return Err(ConfigError::Invalid(format!(
                "commission must be in [0, 1), got {}",
                c.commission
            )));
        }
        if !(c.initial_cash.is_finite() && c.initial_cash > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial_cash must be positive, got {}",
                c.initial_cash
            )));
        }
        if self.stoch_rsi.smooth_k == 0 || self.stoch_rsi.smooth_d == 0 {
            return Err(ConfigError::Invalid(
                "stoch_rsi smoothing windows must be at least 1".into(),
            ));
        }
        if self.sweep.threads == Some(0) {
            return Err(ConfigError::Invalid("sweep.threads must be at least 1".into()));
        }

        // Every name exactly once, and exactly the strategy's names.
        let placeholder = ParameterCombination::new(
            self.grid
                .fixed
                .iter()
                .map(|f| f.name)
                .chain(self.grid.axis.iter().map(|a| a.name))
                .map(|name| (name, 1))
                .collect(),
        );
        self.strategy
            .kind
            .bind(&placeholder)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        for spec in &self.grid.axis {
            spec.to_axis()?;
        }
        Ok(())
    }

    pub fn settings(&self) -> StrategySettings {
        StrategySettings {
            costs: self.costs,
            smoothing: StochSmoothing {
                k: self.stoch_rsi.smooth_k,
                d: self.stoch_rsi.smooth_d,
            },
            evaluation: self.strategy.evaluation,
        }
    }

    pub fn grid(&self) -> Result<ParameterGrid, ConfigError> {
        let fixed = self.grid.fixed.iter().map(|f| (f.name, f.value)).collect();
        let axes = self
            .grid
            .axis
            .iter()
            .map(AxisSpec::to_axis)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ParameterGrid::new(fixed, axes))
    }

    /// Deterministic hash of this configuration.
    ///
    /// Two sweeps with identical configs get the same id.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
