//! Return series for the risky and safe assets
//!
//! A `ReturnSeries` is fixed once built: the allocator, the statistics and
//! the bond helpers only ever read from it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ordered per-period returns for one asset (0.01 = +1% in that period)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnSeries {
    returns: Vec<f64>,
}

impl ReturnSeries {
    #[must_use]
    pub fn new(returns: Vec<f64>) -> Self {
        Self { returns }
    }

    /// A series where every period earns the same return
    #[must_use]
    pub fn constant(rate: f64, periods: usize) -> Self {
        Self {
            returns: vec![rate; periods],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Bounds-checked access to a single period
    #[must_use]
    pub fn get(&self, period: usize) -> Option<f64> {
        self.returns.get(period).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.returns.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.returns
    }

    /// Total compounded return over the whole series
    ///
    /// Summing `ln(1 + r)` keeps long series numerically stable.
    #[must_use]
    pub fn compounded(&self) -> f64 {
        self.returns.iter().map(|r| r.ln_1p()).sum::<f64>().exp_m1()
    }

    /// Wealth after each period when `start` is invested and left alone
    #[must_use]
    pub fn wealth_index(&self, start: f64) -> Vec<f64> {
        let mut wealth = start;
        self.returns
            .iter()
            .map(|r| {
                wealth *= 1.0 + r;
                wealth
            })
            .collect()
    }

    /// Price path starting at `x0`; one element longer than the series
    #[must_use]
    pub fn to_prices(&self, x0: f64) -> Vec<f64> {
        let mut prices = Vec::with_capacity(self.returns.len() + 1);
        prices.push(x0);
        prices.extend(self.wealth_index(x0));
        prices
    }
}

impl From<Vec<f64>> for ReturnSeries {
    fn from(returns: Vec<f64>) -> Self {
        Self::new(returns)
    }
}

impl FromIterator<f64> for ReturnSeries {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A set of independent return paths of equal length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReturnSeries>", into = "Vec<ReturnSeries>")]
pub struct ReturnPaths {
    paths: Vec<ReturnSeries>,
    n_periods: usize,
}

impl ReturnPaths {
    /// Build a batch, rejecting empty or ragged input
    pub fn new(paths: Vec<ReturnSeries>) -> Result<Self, ConfigError> {
        let Some(first) = paths.first() else {
            return Err(ConfigError::EmptyPaths);
        };
        let n_periods = first.len();
        if let Some((index, bad)) = paths
            .iter()
            .enumerate()
            .find(|(_, p)| p.len() != n_periods)
        {
            return Err(ConfigError::RaggedPaths {
                index,
                expected: n_periods,
                actual: bad.len(),
            });
        }
        Ok(Self { paths, n_periods })
    }

    /// Number of paths (scenarios)
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[must_use]
    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReturnSeries> {
        self.paths.get(index)
    }

    #[must_use]
    pub fn paths(&self) -> &[ReturnSeries] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReturnSeries> {
        self.paths.iter()
    }

    /// All returns from every path, in path order
    pub fn flattened(&self) -> impl Iterator<Item = f64> + '_ {
        self.paths.iter().flat_map(ReturnSeries::iter)
    }
}

impl TryFrom<Vec<ReturnSeries>> for ReturnPaths {
    type Error = ConfigError;

    fn try_from(paths: Vec<ReturnSeries>) -> Result<Self, Self::Error> {
        Self::new(paths)
    }
}

impl From<ReturnPaths> for Vec<ReturnSeries> {
    fn from(paths: ReturnPaths) -> Self {
        paths.paths
    }
}
