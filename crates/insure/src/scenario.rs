//! YAML scenario files
//!
//! A scenario bundles the strategy with the market it runs in. Every
//! section is optional:
//!
//! ```yaml
//! strategy:
//!   multiplier: 4
//!   drawdown: 0.25
//! market:
//!   n_scenarios: 5000
//!   sigma: 0.2
//! safe_asset: cir
//! rates:
//!   a: 0.1
//!   b: 0.03
//! liability: 1200
//! seed: 7
//! ```

use std::path::Path;

use color_eyre::eyre::WrapErr;
use insure_core::analysis::ViolationMode;
use insure_core::config::CppiParameters;
use insure_core::paths::{CirConfig, GbmConfig};
use serde::{Deserialize, Serialize};

fn default_seed() -> u64 {
    42
}

fn default_multipliers() -> Vec<f64> {
    vec![1.0, 2.0, 3.0, 4.0, 5.0]
}

/// What the riskless leg earns in simulated runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeAsset {
    /// `strategy.riskless_rate / periods_per_year` every period
    #[default]
    Fixed,
    /// A zero-coupon bond maturing at the horizon, priced off CIR rates
    Cir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub strategy: CppiParameters,

    /// Historical per-period risky returns, for `backtest`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Vec<f64>>,

    /// Historical per-period safe returns, for `backtest`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_returns: Option<Vec<f64>>,

    #[serde(default)]
    pub market: GbmConfig,

    #[serde(default)]
    pub safe_asset: SafeAsset,

    #[serde(default)]
    pub rates: CirConfig,

    /// Amount due at the horizon, for funding ratios
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liability: Option<f64>,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_multipliers")]
    pub multipliers: Vec<f64>,

    #[serde(default)]
    pub violation_mode: ViolationMode,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            strategy: CppiParameters::default(),
            returns: None,
            safe_returns: None,
            market: GbmConfig::default(),
            safe_asset: SafeAsset::default(),
            rates: CirConfig::default(),
            liability: None,
            seed: default_seed(),
            multipliers: default_multipliers(),
            violation_mode: ViolationMode::default(),
        }
    }
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read scenario {}", path.display()))?;
        let scenario = Self::from_yaml(&yaml)
            .wrap_err_with(|| format!("failed to parse scenario {}", path.display()))?;
        tracing::debug!(path = %path.display(), "scenario loaded");
        Ok(scenario)
    }

    /// Rate model aligned with the market grid, so bond returns line up
    /// period for period with the risky paths
    #[must_use]
    pub fn aligned_rates(&self) -> CirConfig {
        CirConfig {
            n_years: self.market.n_years,
            n_scenarios: self.market.n_scenarios,
            steps_per_year: self.market.steps_per_year,
            ..self.rates.clone()
        }
    }

    /// Strategy for simulated runs, with the riskless rate divided over the
    /// market's periods rather than the strategy's own calendar
    #[must_use]
    pub fn simulated_strategy(&self) -> CppiParameters {
        let steps = self.market.steps_per_year;
        if steps != self.strategy.periods_per_year {
            tracing::debug!(
                strategy = self.strategy.periods_per_year,
                market = steps,
                "riskless leg follows the market grid"
            );
        }
        CppiParameters {
            periods_per_year: steps,
            ..self.strategy.clone()
        }
    }

    /// Seed for the rate paths.
    ///
    /// Each master seed feeds its own `StdRng`, whose first draws become
    /// per-path seeds, so neighbouring master seeds give unrelated streams.
    /// Rate path `i` and risky path `i` therefore never share draws.
    #[must_use]
    pub fn rates_seed(&self) -> u64 {
        self.seed.wrapping_add(1)
    }
}
