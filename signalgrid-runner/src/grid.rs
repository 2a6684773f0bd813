//! Parameter grids: fixed values plus swept axes.
//!
//! Enumeration order is fixed params first, then the Cartesian product of
//! the axes in declared order with the first axis outermost. When two or more
//! axes are swept, combinations whose first two swept values are equal are
//! degenerate (a crossover of a line with itself) and are never produced.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signalgrid_core::params::{ParamName, ParameterCombination};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("axis '{name}': range {from}..={to} is empty")]
    EmptyRange {
        name: ParamName,
        from: usize,
        to: usize,
    },
    #[error("axis '{name}': step must be at least 1")]
    ZeroStep { name: ParamName },
    #[error("axis '{name}' has no values")]
    NoValues { name: ParamName },
}

/// One swept parameter and the values it takes, in sweep order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub name: ParamName,
    pub values: Vec<usize>,
}

impl Axis {
    pub fn new(name: ParamName, values: Vec<usize>) -> Result<Self, GridError> {
        if values.is_empty() {
            return Err(GridError::NoValues { name });
        }
        Ok(Self { name, values })
    }

    /// Inclusive range `from..=to` stepping by `step`.
    pub fn range(name: ParamName, from: usize, to: usize, step: usize) -> Result<Self, GridError> {
        if step == 0 {
            return Err(GridError::ZeroStep { name });
        }
        if from > to {
            return Err(GridError::EmptyRange { name, from, to });
        }
        Ok(Self {
            name,
            values: (from..=to).step_by(step).collect(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGrid {
    fixed: Vec<(ParamName, usize)>,
    axes: Vec<Axis>,
}

impl ParameterGrid {
    pub fn new(fixed: Vec<(ParamName, usize)>, axes: Vec<Axis>) -> Self {
        Self { fixed, axes }
    }

    /// Grid sweeping `axes` with nothing fixed.
    pub fn sweep(axes: Vec<Axis>) -> Self {
        Self::new(Vec::new(), axes)
    }

    pub fn fixed(&self) -> &[(ParamName, usize)] {
        &self.fixed
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Column order of every combination: fixed names, then axis names.
    pub fn param_names(&self) -> Vec<ParamName> {
        self.fixed
            .iter()
            .map(|&(n, _)| n)
            .chain(self.axes.iter().map(|a| a.name))
            .collect()
    }

    /// Size of the raw Cartesian product, before degenerate combinations
    /// are removed.
    pub fn len_raw(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    /// Number of combinations [`enumerate`](Self::enumerate) yields.
    pub fn len_valid(&self) -> usize {
        let raw = self.len_raw();
        if self.axes.len() < 2 {
            return raw;
        }
        let first = &self.axes[0].values;
        let second = &self.axes[1].values;
        let equal_pairs = first
            .iter()
            .map(|v| second.iter().filter(|w| *w == v).count())
            .sum::<usize>();
        let rest: usize = self.axes[2..].iter().map(|a| a.values.len()).product();
        raw - equal_pairs * rest
    }

    pub fn enumerate(&self) -> Vec<ParameterCombination> {
        let mut swept: Vec<Vec<usize>> = vec![Vec::new()];
        for axis in &self.axes {
            swept = swept
                .into_iter()
                .flat_map(|prefix| {
                    axis.values.iter().map(move |&v| {
                        let mut next = prefix.clone();
                        next.push(v);
                        next
                    })
                })
                .collect();
        }

        swept
            .into_iter()
            .filter(|values| !self.is_degenerate(values))
            .map(|values| {
                let pairs = self
                    .fixed
                    .iter()
                    .copied()
                    .chain(self.axes.iter().map(|a| a.name).zip(values))
                    .collect();
                ParameterCombination::new(pairs)
            })
            .collect()
    }

    fn is_degenerate(&self, swept: &[usize]) -> bool {
        self.axes.len() >= 2 && swept[0] == swept[1]
    }
}
