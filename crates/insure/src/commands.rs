//! One function per subcommand, each returning a serializable report

use color_eyre::eyre::{WrapErr, eyre};
use insure_core::allocator::run_cppi;
use insure_core::analysis::risk::{ReturnSummary, summary_stats};
use insure_core::analysis::{BatchSummary, Distribution, summarize};
use insure_core::bonds::funding_ratio_path;
use insure_core::model::{CppiRun, ReturnPaths, ReturnSeries, SimulationBatch};
use insure_core::paths::RatePaths;
use insure_core::simulation::{SweepPoint, simulate_batch, sweep_multipliers};
use serde::{Deserialize, Serialize};

use crate::scenario::{SafeAsset, Scenario};

/// Result of running the strategy once over a historical series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub n_periods: usize,
    pub terminal_wealth: f64,
    /// Buy-and-hold wealth of the risky asset alone
    pub risky_terminal_wealth: f64,
    pub terminal_floor: f64,
    pub violated: bool,
    pub max_shortfall: f64,
    pub strategy_stats: Option<ReturnSummary>,
    pub risky_stats: Option<ReturnSummary>,
}

/// Per-period returns of the strategy's own wealth
fn strategy_returns(run: &CppiRun) -> Vec<f64> {
    run.states
        .iter()
        .map(|s| s.ending_value / s.asset_value - 1.0)
        .collect()
}

pub fn backtest(scenario: &Scenario) -> color_eyre::Result<BacktestReport> {
    let returns = scenario
        .returns
        .clone()
        .ok_or_else(|| eyre!("scenario has no `returns` series to backtest"))?;
    let risky = ReturnSeries::new(returns);
    let safe = scenario.safe_returns.clone().map(ReturnSeries::new);

    let run = run_cppi(&risky, safe.as_ref(), &scenario.strategy).wrap_err("backtest failed")?;
    let ppy = f64::from(scenario.strategy.periods_per_year);
    let rf = scenario.strategy.riskless_rate;

    tracing::info!(
        n_periods = run.n_periods(),
        terminal_wealth = run.terminal_wealth(),
        "backtest complete"
    );

    Ok(BacktestReport {
        n_periods: run.n_periods(),
        terminal_wealth: run.terminal_wealth(),
        risky_terminal_wealth: run
            .risky_wealth
            .last()
            .copied()
            .unwrap_or(scenario.strategy.initial_wealth),
        terminal_floor: run.terminal_floor(),
        violated: run.violated_any(),
        max_shortfall: run.max_shortfall(),
        strategy_stats: summary_stats(&strategy_returns(&run), ppy, rf),
        risky_stats: summary_stats(risky.as_slice(), ppy, rf),
    })
}

/// Asset/liability view of a simulated batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingSummary {
    pub liability: f64,
    pub initial_ratio: Distribution,
    pub terminal_ratio: Distribution,
    /// Fraction of paths ending with assets below the liability
    pub underfunded_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub safe_asset: SafeAsset,
    pub summary: BatchSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<FundingSummary>,
}

/// Risky paths plus, for a CIR safe asset, the rate paths behind the safe
/// returns
fn market_paths(
    scenario: &Scenario,
) -> color_eyre::Result<(ReturnPaths, Option<(RatePaths, ReturnPaths)>)> {
    let risky = scenario
        .market
        .generate(scenario.seed)
        .wrap_err("invalid market model")?;

    let safe = match scenario.safe_asset {
        SafeAsset::Fixed => None,
        SafeAsset::Cir => {
            let rates = scenario
                .aligned_rates()
                .generate(scenario.rates_seed())
                .wrap_err("invalid rate model")?;
            let returns = rates.bond_returns()?;
            Some((rates, returns))
        }
    };
    Ok((risky, safe))
}

fn funding_summary(batch: &SimulationBatch, rates: &RatePaths, liability: f64) -> Option<FundingSummary> {
    let mut initial = Vec::with_capacity(batch.len());
    let mut terminal = Vec::with_capacity(batch.len());

    for (run, prices) in batch.runs.iter().zip(&rates.zero_coupon_prices) {
        let mut wealth = Vec::with_capacity(run.n_periods() + 1);
        wealth.push(run.params.initial_wealth);
        wealth.extend(run.wealth());
        let ratios = funding_ratio_path(&wealth, prices, liability);
        initial.push(*ratios.first()?);
        terminal.push(*ratios.last()?);
    }

    let underfunded = terminal.iter().filter(|r| **r < 1.0).count();
    Some(FundingSummary {
        liability,
        underfunded_rate: underfunded as f64 / terminal.len().max(1) as f64,
        initial_ratio: Distribution::from_values(&initial)?,
        terminal_ratio: Distribution::from_values(&terminal)?,
    })
}

pub fn simulate(scenario: &Scenario) -> color_eyre::Result<SimulationReport> {
    let (risky, safe) = market_paths(scenario)?;
    let strategy = scenario.simulated_strategy();
    let batch = simulate_batch(&risky, safe.as_ref().map(|(_, r)| r), &strategy)
        .wrap_err("simulation failed")?;
    let summary = summarize(&batch, scenario.violation_mode);

    let funding = match (&safe, scenario.liability) {
        (Some((rates, _)), Some(liability)) => funding_summary(&batch, rates, liability),
        (None, Some(_)) => {
            tracing::warn!("liability ignored: funding ratios need `safe_asset: cir`");
            None
        }
        _ => None,
    };

    tracing::info!(
        n_paths = summary.num_paths,
        violation_rate = summary.violation_rate,
        "simulation complete"
    );

    Ok(SimulationReport {
        seed: scenario.seed,
        safe_asset: scenario.safe_asset,
        summary,
        funding,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub seed: u64,
    pub points: Vec<SweepPoint>,
}

pub fn sweep(scenario: &Scenario) -> color_eyre::Result<SweepReport> {
    if scenario.multipliers.is_empty() {
        return Err(eyre!("no multipliers to sweep"));
    }
    let (risky, safe) = market_paths(scenario)?;
    let points = sweep_multipliers(
        &risky,
        safe.as_ref().map(|(_, r)| r),
        &scenario.simulated_strategy(),
        &scenario.multipliers,
        scenario.violation_mode,
    )
    .wrap_err("sweep failed")?;

    Ok(SweepReport {
        seed: scenario.seed,
        points,
    })
}

/// Distribution of simulated short rates and bond prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesReport {
    pub seed: u64,
    pub n_scenarios: usize,
    pub satisfies_feller: bool,
    /// Cross-path mean annualised rate, one value per year
    pub mean_rate_by_year: Vec<f64>,
    pub terminal_rate: Distribution,
    pub initial_bond_price: Distribution,
    /// Annualised return from holding the bond to maturity
    pub bond_return: Distribution,
    /// Initial wealth against the present value of the liability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_funding_ratio: Option<Distribution>,
}

pub fn rates(scenario: &Scenario) -> color_eyre::Result<RatesReport> {
    let config = &scenario.rates;
    let paths = config
        .generate(scenario.rates_seed())
        .wrap_err("invalid rate model")?;

    let per_year = config.steps_per_year as usize;
    let mean_rate_by_year = paths.mean_rates().into_iter().step_by(per_year).collect();

    let terminal: Vec<f64> = paths.rates.iter().filter_map(|r| r.last().copied()).collect();
    let initial_prices: Vec<f64> = paths
        .zero_coupon_prices
        .iter()
        .filter_map(|p| p.first().copied())
        .collect();
    let bond_returns: Vec<f64> = initial_prices
        .iter()
        .map(|p| p.recip().powf(1.0 / config.n_years) - 1.0)
        .collect();

    let initial_funding_ratio = scenario.liability.and_then(|liability| {
        let ratios: Vec<f64> = initial_prices
            .iter()
            .map(|p| scenario.strategy.initial_wealth / (liability * p))
            .collect();
        Distribution::from_values(&ratios)
    });

    let missing = || eyre!("rate model produced no paths");
    Ok(RatesReport {
        seed: scenario.rates_seed(),
        n_scenarios: paths.n_scenarios(),
        satisfies_feller: config.satisfies_feller(),
        mean_rate_by_year,
        terminal_rate: Distribution::from_values(&terminal).ok_or_else(missing)?,
        initial_bond_price: Distribution::from_values(&initial_prices).ok_or_else(missing)?,
        bond_return: Distribution::from_values(&bond_returns).ok_or_else(missing)?,
        initial_funding_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_market() -> Scenario {
        Scenario::from_yaml(
            r#"
market:
  n_years: 2
  n_scenarios: 200
  sigma: 0.2
rates:
  n_scenarios: 50
  n_years: 5
seed: 3
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_backtest_worked_example() {
        let scenario = Scenario::from_yaml("returns: [-0.10]").unwrap();
        let report = backtest(&scenario).unwrap();

        assert_eq!(report.n_periods, 1);
        assert!((report.terminal_wealth - 941.0).abs() < 1e-9);
        assert!((report.risky_terminal_wealth - 900.0).abs() < 1e-9);
        assert_eq!(report.terminal_floor, 800.0);
        assert!(!report.violated);
        // A single period has no sample volatility
        assert!(report.strategy_stats.is_none());
    }

    #[test]
    fn test_backtest_stats_and_safe_series() {
        let scenario = Scenario::from_yaml(
            "returns: [0.02, -0.04, 0.03, 0.01, -0.02, 0.05]\n\
             safe_returns: [0.001, 0.001, 0.001, 0.001, 0.001, 0.001]\n",
        )
        .unwrap();
        let report = backtest(&scenario).unwrap();
        let strategy = report.strategy_stats.unwrap();
        let risky = report.risky_stats.unwrap();

        // Part of the wealth sits in the safe leg, damping volatility
        assert!(strategy.annualized_vol < risky.annualized_vol);
    }

    #[test]
    fn test_backtest_requires_returns() {
        let err = backtest(&Scenario::default()).unwrap_err();
        assert!(format!("{err}").contains("returns"));

        let bad = Scenario::from_yaml("returns: [0.01, 0.02]\nsafe_returns: [0.0]").unwrap();
        assert!(backtest(&bad).is_err());
    }

    #[test]
    fn test_simulate_fixed_safe_asset() {
        let report = simulate(&small_market()).unwrap();
        assert_eq!(report.summary.num_paths, 200);
        assert_eq!(report.safe_asset, SafeAsset::Fixed);
        assert!(report.funding.is_none());

        // Same seed, same answer
        assert_eq!(simulate(&small_market()).unwrap(), report);
    }

    #[test]
    fn test_simulate_with_cir_and_liability() {
        let scenario = Scenario {
            safe_asset: SafeAsset::Cir,
            liability: Some(1000.0),
            ..small_market()
        };
        let report = simulate(&scenario).unwrap();
        let funding = report.funding.unwrap();

        assert_eq!(funding.liability, 1000.0);
        // Every path starts with the same wealth and bond price
        assert!(funding.initial_ratio.std_dev < 1e-12);
        assert!((0.0..=1.0).contains(&funding.underfunded_rate));
    }

    #[test]
    fn test_sweep() {
        let scenario = Scenario {
            multipliers: vec![1.0, 4.0, 10.0],
            ..small_market()
        };
        let report = sweep(&scenario).unwrap();
        assert_eq!(report.points.len(), 3);
        assert_eq!(report.points[2].multiplier, 10.0);

        let empty = Scenario {
            multipliers: vec![],
            ..small_market()
        };
        assert!(sweep(&empty).is_err());
    }

    #[test]
    fn test_riskless_leg_follows_quarterly_market() {
        let scenario = Scenario::from_yaml(
            "strategy:\n  multiplier: 0\nmarket:\n  n_years: 10\n  n_scenarios: 1\n  steps_per_year: 4\nmultipliers: [0]\n",
        )
        .unwrap();
        let expected = 1000.0 * (1.0 + 0.03 / 4.0_f64).powi(40);

        let report = simulate(&scenario).unwrap();
        assert!(
            (report.summary.terminal.mean - expected).abs() < 1e-6,
            "terminal {} vs quarterly compounding {expected}",
            report.summary.terminal.mean
        );

        let swept = sweep(&scenario).unwrap();
        assert!((swept.points[0].summary.terminal.mean - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rates_report() {
        let scenario = Scenario {
            liability: Some(1000.0),
            ..small_market()
        };
        let report = rates(&scenario).unwrap();

        assert_eq!(report.n_scenarios, 50);
        // Years 0 through 5
        assert_eq!(report.mean_rate_by_year.len(), 6);
        assert!(report.satisfies_feller);
        assert!(report.terminal_rate.min >= 0.0);
        let price = report.initial_bond_price.mean;
        assert!(price > 0.0 && price < 1.0);
        let funding = report.initial_funding_ratio.unwrap();
        assert!((funding.mean - 1.0 / price).abs() < 1e-9);
    }
}
