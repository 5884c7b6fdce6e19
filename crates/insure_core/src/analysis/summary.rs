//! Cross-path statistics of a simulation batch

use serde::{Deserialize, Serialize};

use crate::model::{CppiRun, SimulationBatch};

/// Percentiles reported for terminal wealth
pub const STANDARD_PERCENTILES: [f64; 5] = [0.05, 0.25, 0.50, 0.75, 0.95];

/// Tolerance used when looking a percentile up by value
pub const PERCENTILE_TOLERANCE: f64 = 0.001;

/// When a path counts as having breached its floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationMode {
    /// Only terminal wealth is compared with the final floor
    Terminal,
    /// Any period ending below its floor counts
    #[default]
    AnyPeriod,
}

impl ViolationMode {
    fn violated(self, run: &CppiRun) -> bool {
        match self {
            Self::Terminal => run.violated_terminal(),
            Self::AnyPeriod => run.violated_any(),
        }
    }

    fn shortfall(self, run: &CppiRun) -> f64 {
        match self {
            Self::Terminal => (run.terminal_floor() - run.terminal_wealth()).max(0.0),
            Self::AnyPeriod => run.max_shortfall(),
        }
    }
}

/// Linear-interpolated percentile of already sorted values, `p` in [0, 1]
#[must_use]
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Percentile of unsorted values, `p` in [0, 1]
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Shape of a set of outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// (percentile as 0-1, value)
    pub percentiles: Vec<(f64, f64)>,
}

impl Distribution {
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let percentiles = STANDARD_PERCENTILES
            .iter()
            .filter_map(|&p| percentile_sorted(&sorted, p).map(|v| (p, v)))
            .collect();

        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            percentiles,
        })
    }

    /// Look up a stored percentile, e.g. `0.5` for the median
    #[must_use]
    pub fn percentile(&self, target: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(p, _)| (*p - target).abs() < PERCENTILE_TOLERANCE)
            .map(|(_, v)| *v)
    }

    #[must_use]
    pub fn median(&self) -> Option<f64> {
        self.percentile(0.5)
    }
}

/// Terminal-wealth distribution and floor-protection statistics of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub num_paths: usize,
    pub mode: ViolationMode,
    pub terminal: Distribution,
    /// Number of paths that breached the floor
    pub violations: usize,
    pub violation_rate: f64,
    /// Mean shortfall below the floor, over violating paths only
    pub conditional_shortfall: Option<f64>,
}

/// Reduce a completed batch to summary statistics
#[must_use]
pub fn summarize(batch: &SimulationBatch, mode: ViolationMode) -> BatchSummary {
    let terminal_values = batch.terminal_wealth();
    let terminal = Distribution::from_values(&terminal_values).unwrap_or(Distribution {
        mean: 0.0,
        std_dev: 0.0,
        min: 0.0,
        max: 0.0,
        percentiles: Vec::new(),
    });

    let shortfalls: Vec<f64> = batch
        .runs
        .iter()
        .filter(|run| mode.violated(run))
        .map(|run| mode.shortfall(run))
        .collect();

    let violations = shortfalls.len();
    let violation_rate = if batch.is_empty() {
        0.0
    } else {
        violations as f64 / batch.len() as f64
    };
    let conditional_shortfall =
        (violations > 0).then(|| shortfalls.iter().sum::<f64>() / violations as f64);

    BatchSummary {
        num_paths: batch.len(),
        mode,
        terminal,
        violations,
        violation_rate,
        conditional_shortfall,
    }
}
