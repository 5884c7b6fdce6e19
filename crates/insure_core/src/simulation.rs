use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::allocator::Allocator;
use crate::analysis::{BatchSummary, ViolationMode, summarize};
use crate::config::CppiParameters;
use crate::error::{CppiError, Result};
use crate::model::{CppiRun, ReturnPaths, SimulationBatch};
use crate::paths::GbmConfig;

/// Run the strategy over every path of a batch.
///
/// Paths are independent, so they run in parallel when the `parallel`
/// feature is on; the output keeps input order either way. When `safe`
/// is given it must hold one path per risky path.
pub fn simulate_batch(
    paths: &ReturnPaths,
    safe: Option<&ReturnPaths>,
    params: &CppiParameters,
) -> Result<SimulationBatch> {
    let allocator = Allocator::new(params.clone())?;

    if let Some(safe) = safe
        && safe.len() != paths.len()
    {
        return Err(CppiError::PathCountMismatch {
            risky: paths.len(),
            safe: safe.len(),
        });
    }

    tracing::debug!(
        n_paths = paths.len(),
        n_periods = paths.n_periods(),
        multiplier = params.multiplier,
        "running CPPI batch"
    );

    let run_one = |index: usize| -> Result<CppiRun> {
        let risky = &paths.paths()[index];
        let safe = safe.and_then(|s| s.get(index));
        allocator.run(risky, safe)
    };

    #[cfg(feature = "parallel")]
    let runs = (0..paths.len())
        .into_par_iter()
        .map(run_one)
        .collect::<Result<Vec<_>>>()?;
    #[cfg(not(feature = "parallel"))]
    let runs = (0..paths.len())
        .map(run_one)
        .collect::<Result<Vec<_>>>()?;

    Ok(SimulationBatch {
        params: params.clone(),
        runs,
    })
}

/// Generate GBM paths from `seed` and run the strategy over them
pub fn monte_carlo(
    gbm: &GbmConfig,
    params: &CppiParameters,
    seed: u64,
) -> Result<SimulationBatch> {
    // Fail on bad strategy parameters before drawing any paths
    params.validate()?;
    let paths = gbm.generate(seed)?;
    simulate_batch(&paths, None, params)
}

/// Summary of one multiplier in a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub multiplier: f64,
    pub summary: BatchSummary,
}

/// Re-run the same paths for each multiplier.
///
/// Every multiplier sees identical returns, so differences between the
/// points come from the strategy alone.
pub fn sweep_multipliers(
    paths: &ReturnPaths,
    safe: Option<&ReturnPaths>,
    params: &CppiParameters,
    multipliers: &[f64],
    mode: ViolationMode,
) -> Result<Vec<SweepPoint>> {
    // Validate every point up front so a bad multiplier late in the list
    // does not waste the earlier runs
    for &m in multipliers {
        params.with_multiplier(m).validate()?;
    }

    multipliers
        .iter()
        .map(|&multiplier| {
            let batch = simulate_batch(paths, safe, &params.with_multiplier(multiplier))?;
            let summary = summarize(&batch, mode);
            tracing::info!(
                multiplier,
                violation_rate = summary.violation_rate,
                mean_terminal = summary.terminal.mean,
                "sweep point complete"
            );
            Ok(SweepPoint {
                multiplier,
                summary,
            })
        })
        .collect()
}
