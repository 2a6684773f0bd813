//! Strategies: a named, parameterized signal policy plus its evaluation mode.
//!
//! A strategy is built once per parameter combination by
//! [`StrategyKind::configure`] and never mutated afterwards. Sweep workers
//! each own the `Box<dyn Strategy>` they evaluate.

pub mod sma_crossover;
pub mod sma_trix;
pub mod stoch_rsi_trix;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PriceSeries, SignalSeries};
use crate::evaluation::{self, Costs, EvaluationMode, EvaluationOutcome, FailureKind};
use crate::indicators::{IndicatorError, StochSmoothing};
use crate::params::{ParamName, ParameterCombination};

pub use sma_crossover::SmaCrossover;
pub use sma_trix::SmaTrix;
pub use stoch_rsi_trix::StochRsiTrix;

/// A configured, immutable trading policy.
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// The combination this instance was configured with.
    fn parameters(&self) -> &ParameterCombination;

    fn evaluation_mode(&self) -> EvaluationMode;

    fn costs(&self) -> &Costs;

    /// Cleaned signals over the rows where every indicator is defined.
    fn generate_signals(&self, series: &PriceSeries) -> Result<SignalSeries, IndicatorError>;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Generate signals and evaluate them in this strategy's mode.
    fn evaluate(&self, series: &PriceSeries) -> Result<EvaluationOutcome, IndicatorError> {
        let signals = self.generate_signals(series)?;
        Ok(evaluation::evaluate(
            self.evaluation_mode(),
            series,
            &signals,
            self.costs(),
        ))
    }
}

/// Engine-level settings shared by every strategy of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategySettings {
    pub costs: Costs,
    pub smoothing: StochSmoothing,
    /// Overrides the strategy's default evaluation mode.
    pub evaluation: Option<EvaluationMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("{strategy} requires parameter '{name}'")]
    MissingParameter {
        strategy: StrategyKind,
        name: ParamName,
    },
    #[error("{strategy} does not take parameter '{name}'")]
    UnexpectedParameter {
        strategy: StrategyKind,
        name: ParamName,
    },
    #[error("parameter '{name}' given more than once")]
    DuplicateParameter { name: ParamName },
}

impl StrategyError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            StrategyError::MissingParameter { .. } => FailureKind::MissingParameter,
            StrategyError::UnexpectedParameter { .. } => FailureKind::UnexpectedParameter,
            StrategyError::DuplicateParameter { .. } => FailureKind::DuplicateParameter,
        }
    }
}

/// The strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    SmaCrossover,
    SmaTrix,
    StochRsiTrix,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::SmaCrossover,
        StrategyKind::SmaTrix,
        StrategyKind::StochRsiTrix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::SmaCrossover => "sma_crossover",
            StrategyKind::SmaTrix => "sma_trix",
            StrategyKind::StochRsiTrix => "stoch_rsi_trix",
        }
    }

    /// The exact set of parameters this strategy takes.
    pub fn parameter_names(self) -> &'static [ParamName] {
        match self {
            StrategyKind::SmaCrossover => &[ParamName::WindowSmaShort, ParamName::WindowSmaLong],
            StrategyKind::SmaTrix => &[
                ParamName::WindowSmaShort,
                ParamName::WindowSmaLong,
                ParamName::WindowTrix,
            ],
            StrategyKind::StochRsiTrix => &[ParamName::WindowStochRsi, ParamName::WindowTrix],
        }
    }

    pub fn default_mode(self) -> EvaluationMode {
        match self {
            StrategyKind::SmaCrossover => EvaluationMode::Position,
            StrategyKind::SmaTrix | StrategyKind::StochRsiTrix => EvaluationMode::TradePairs,
        }
    }

    /// Build a fresh strategy for `combination`.
    ///
    /// The combination must carry exactly [`parameter_names`], once each, in
    /// any order.
    ///
    /// [`parameter_names`]: StrategyKind::parameter_names
    pub fn configure(
        self,
        combination: &ParameterCombination,
        settings: &StrategySettings,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let windows = self.bind(combination)?;
        let mode = settings.evaluation.unwrap_or_else(|| self.default_mode());
        let params = combination.clone();
        let strategy: Box<dyn Strategy> = match self {
            StrategyKind::SmaCrossover => Box::new(SmaCrossover::new(
                windows[0],
                windows[1],
                params,
                mode,
                settings.costs,
            )),
            StrategyKind::SmaTrix => Box::new(SmaTrix::new(
                windows[0],
                windows[1],
                windows[2],
                params,
                mode,
                settings.costs,
            )),
            StrategyKind::StochRsiTrix => Box::new(StochRsiTrix::new(
                windows[0],
                windows[1],
                settings.smoothing,
                params,
                mode,
                settings.costs,
            )),
        };
        Ok(strategy)
    }

    /// Check `combination` against [`parameter_names`] and return the
    /// windows in declared order.
    ///
    /// [`parameter_names`]: StrategyKind::parameter_names
    pub fn bind(self, combination: &ParameterCombination) -> Result<Vec<usize>, StrategyError> {
        let declared = self.parameter_names();
        for (i, name) in combination.names().enumerate() {
            if combination.names().take(i).any(|n| n == name) {
                return Err(StrategyError::DuplicateParameter { name });
            }
            if !declared.contains(&name) {
                return Err(StrategyError::UnexpectedParameter {
                    strategy: self,
                    name,
                });
            }
        }
        declared
            .iter()
            .map(|&name| {
                combination
                    .get(name)
                    .ok_or(StrategyError::MissingParameter {
                        strategy: self,
                        name,
                    })
            })
            .collect()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown strategy '{s}'"))
    }
}
