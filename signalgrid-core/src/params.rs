//! Typed strategy parameters.
//!
//! A `ParameterCombination` is an ordered list of `(ParamName, window)` pairs.
//! The order is the declaration order of the grid, which is also the column
//! order of the result table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every window a strategy can be parameterized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamName {
    WindowSmaShort,
    WindowSmaLong,
    WindowTrix,
    WindowStochRsi,
}

impl ParamName {
    pub const ALL: [ParamName; 4] = [
        ParamName::WindowSmaShort,
        ParamName::WindowSmaLong,
        ParamName::WindowTrix,
        ParamName::WindowStochRsi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::WindowSmaShort => "window_sma_short",
            ParamName::WindowSmaLong => "window_sma_long",
            ParamName::WindowTrix => "window_trix",
            ParamName::WindowStochRsi => "window_stoch_rsi",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamName::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown parameter '{s}'"))
    }
}

/// One point of a parameter grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterCombination {
    values: Vec<(ParamName, usize)>,
}

impl ParameterCombination {
    pub fn new(values: Vec<(ParamName, usize)>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: ParamName) -> Option<usize> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, v)| v)
    }

    pub fn values(&self) -> &[(ParamName, usize)] {
        &self.values
    }

    pub fn names(&self) -> impl Iterator<Item = ParamName> + '_ {
        self.values.iter().map(|&(n, _)| n)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for ParameterCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect();
        write!(f, "({})", parts.join(", "))
    }
}
