use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::{map_seeds, path_seeds};
use crate::error::{ConfigError, ensure_finite, ensure_positive};
use crate::model::{ReturnPaths, ReturnSeries};

fn default_n_years() -> f64 {
    10.0
}

fn default_n_scenarios() -> usize {
    1_000
}

fn default_mu() -> f64 {
    0.07
}

fn default_sigma() -> f64 {
    0.15
}

fn default_steps_per_year() -> u32 {
    12
}

/// How the annual drift is turned into a per-step mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drift {
    /// `mu / steps_per_year`
    #[default]
    Arithmetic,
    /// `(1 + mu)^(1 / steps_per_year) - 1`, compounding the drift over the step
    Compounded,
}

/// Geometric Brownian motion for the risky asset
///
/// Each step's return is `mean + sigma * sqrt(dt) * Z` with `Z ~ N(0, 1)`,
/// independent across steps and paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbmConfig {
    #[serde(default = "default_n_years")]
    pub n_years: f64,
    #[serde(default = "default_n_scenarios")]
    pub n_scenarios: usize,
    /// Annualised drift
    #[serde(default = "default_mu")]
    pub mu: f64,
    /// Annualised volatility
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_steps_per_year")]
    pub steps_per_year: u32,
    #[serde(default)]
    pub drift: Drift,
}

impl Default for GbmConfig {
    fn default() -> Self {
        Self {
            n_years: default_n_years(),
            n_scenarios: default_n_scenarios(),
            mu: default_mu(),
            sigma: default_sigma(),
            steps_per_year: default_steps_per_year(),
            drift: Drift::default(),
        }
    }
}

impl GbmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("n_years", self.n_years)?;
        ensure_finite("mu", self.mu)?;
        ensure_finite("sigma", self.sigma)?;
        if self.sigma < 0.0 {
            return Err(ConfigError::InvalidModel {
                model: "GBM",
                reason: "sigma must be non-negative",
            });
        }
        if self.steps_per_year == 0 || self.n_scenarios == 0 {
            return Err(ConfigError::InvalidModel {
                model: "GBM",
                reason: "steps_per_year and n_scenarios must be positive",
            });
        }
        if self.n_steps() == 0 {
            return Err(ConfigError::InvalidModel {
                model: "GBM",
                reason: "horizon is shorter than one step",
            });
        }
        if self.drift == Drift::Compounded && self.mu <= -1.0 {
            return Err(ConfigError::InvalidModel {
                model: "GBM",
                reason: "compounded drift requires mu > -1",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.steps_per_year)
    }

    /// Number of periods in each generated path
    #[must_use]
    pub fn n_steps(&self) -> usize {
        (self.n_years * f64::from(self.steps_per_year)).round() as usize
    }

    /// Expected return of a single step
    #[must_use]
    pub fn step_mean(&self) -> f64 {
        match self.drift {
            Drift::Arithmetic => self.mu * self.dt(),
            Drift::Compounded => (1.0 + self.mu).powf(self.dt()) - 1.0,
        }
    }

    /// Standard deviation of a single step
    #[must_use]
    pub fn step_std(&self) -> f64 {
        self.sigma * self.dt().sqrt()
    }

    fn step_distribution(&self) -> Result<Normal<f64>, ConfigError> {
        Normal::new(self.step_mean(), self.step_std()).map_err(|_| ConfigError::InvalidModel {
            model: "GBM",
            reason: "step standard deviation must be non-negative and finite",
        })
    }

    /// Generate `n_scenarios` independent paths from a master seed
    pub fn generate(&self, seed: u64) -> Result<ReturnPaths, ConfigError> {
        self.validate()?;
        let dist = self.step_distribution()?;
        let n_steps = self.n_steps();

        tracing::debug!(
            n_scenarios = self.n_scenarios,
            n_steps,
            mu = self.mu,
            sigma = self.sigma,
            "generating GBM paths"
        );

        let seeds = path_seeds(seed, self.n_scenarios);
        let paths = map_seeds(&seeds, |rng| {
            (0..n_steps)
                .map(|_| dist.sample(rng))
                .collect::<ReturnSeries>()
        });
        ReturnPaths::new(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(n_scenarios: usize) -> GbmConfig {
        GbmConfig {
            n_years: 10.0,
            n_scenarios,
            mu: 0.07,
            sigma: 0.20,
            steps_per_year: 12,
            drift: Drift::Arithmetic,
        }
    }

    #[test]
    fn test_shape_and_determinism() {
        let config = monthly(50);
        let a = config.generate(42).unwrap();
        let b = config.generate(42).unwrap();

        assert_eq!(a.len(), 50);
        assert_eq!(a.n_periods(), 120);
        assert_eq!(a, b);
        assert_ne!(a, config.generate(43).unwrap());
    }

    #[test]
    fn test_paths_are_not_copies_of_each_other() {
        let paths = monthly(20).generate(1).unwrap();
        let first = paths.get(0).unwrap();
        assert!(paths.iter().skip(1).all(|p| p != first));
    }

    #[test]
    fn test_sample_moments() {
        let config = monthly(2_000);
        let paths = config.generate(2024).unwrap();
        let all: Vec<f64> = paths.flattened().collect();
        let n = all.len() as f64;
        let mean = all.iter().sum::<f64>() / n;
        let std = (all.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();

        // 240k draws: standard error of the mean is ~1.2e-4
        assert!(
            (mean - config.step_mean()).abs() < 1e-3,
            "mean {mean} vs {}",
            config.step_mean()
        );
        assert!(
            (std - config.step_std()).abs() < 0.01 * config.step_std() + 1e-4,
            "std {std} vs {}",
            config.step_std()
        );
    }

    #[test]
    fn test_zero_volatility_is_deterministic_drift() {
        let config = GbmConfig {
            sigma: 0.0,
            n_scenarios: 3,
            ..monthly(3)
        };
        let paths = config.generate(5).unwrap();
        for r in paths.flattened() {
            assert!((r - 0.07 / 12.0).abs() < 1e-15);
        }
    }

    #[test]
    fn test_compounded_drift() {
        let config = GbmConfig {
            drift: Drift::Compounded,
            ..monthly(1)
        };
        let expected = 1.07_f64.powf(1.0 / 12.0) - 1.0;
        assert!((config.step_mean() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_parameters() {
        let config = GbmConfig {
            sigma: -0.1,
            ..monthly(1)
        };
        assert!(matches!(
            config.generate(0),
            Err(ConfigError::InvalidModel { model: "GBM", .. })
        ));

        let config = GbmConfig {
            n_scenarios: 0,
            ..monthly(1)
        };
        assert!(config.validate().is_err());
    }
}
