//! Output types of the allocator and the batch runner

use serde::{Deserialize, Serialize};

use super::state::PortfolioState;
use crate::config::CppiParameters;

/// Complete history of one CPPI run over one return path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CppiRun {
    pub params: CppiParameters,
    /// One record per period, in order
    pub states: Vec<PortfolioState>,
    /// Buy-and-hold wealth of the risky asset alone, for comparison
    pub risky_wealth: Vec<f64>,
}

impl CppiRun {
    #[must_use]
    pub fn n_periods(&self) -> usize {
        self.states.len()
    }

    /// Wealth at the end of the last period (initial wealth for an empty run)
    #[must_use]
    pub fn terminal_wealth(&self) -> f64 {
        self.states
            .last()
            .map_or(self.params.initial_wealth, |s| s.ending_value)
    }

    /// Floor in force during the last period
    #[must_use]
    pub fn terminal_floor(&self) -> f64 {
        self.states.last().map_or(
            self.params.initial_wealth * self.params.effective_floor_ratio(),
            |s| s.floor,
        )
    }

    /// Ending wealth of every period
    #[must_use]
    pub fn wealth(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.ending_value).collect()
    }

    #[must_use]
    pub fn risky_weights(&self) -> Vec<f64> {
        self.states.iter().map(PortfolioState::risky_weight).collect()
    }

    /// True if wealth ended any period below that period's floor
    #[must_use]
    pub fn violated_any(&self) -> bool {
        self.states.iter().any(PortfolioState::violated)
    }

    #[must_use]
    pub fn violated_terminal(&self) -> bool {
        self.terminal_wealth() < self.terminal_floor()
    }

    /// Largest per-period shortfall below the floor
    #[must_use]
    pub fn max_shortfall(&self) -> f64 {
        self.states
            .iter()
            .map(PortfolioState::shortfall)
            .fold(0.0, f64::max)
    }

    /// Smallest `ending_value - floor` seen over the run
    #[must_use]
    pub fn min_floor_gap(&self) -> Option<f64> {
        self.states
            .iter()
            .map(|s| s.ending_value - s.floor)
            .reduce(f64::min)
    }
}

/// Independent runs over a set of paths, in path order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationBatch {
    pub params: CppiParameters,
    pub runs: Vec<CppiRun>,
}

impl SimulationBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    #[must_use]
    pub fn terminal_wealth(&self) -> Vec<f64> {
        self.runs.iter().map(CppiRun::terminal_wealth).collect()
    }
}
