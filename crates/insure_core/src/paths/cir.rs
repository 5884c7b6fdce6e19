//! Cox-Ingersoll-Ross short rate
//!
//! ```text
//! dr = a (b - r) dt + sigma sqrt(r) dW
//! ```
//!
//! Rates are simulated in instantaneous terms and reported annualised. The
//! square root only ever sees a non-negative rate, and each new rate is
//! reflected at zero.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::{map_seeds, path_seeds};
use crate::bonds::{ann_to_inst, inst_to_ann};
use crate::error::{ConfigError, ensure_finite, ensure_positive};
use crate::model::{ReturnPaths, ReturnSeries};

fn default_n_years() -> f64 {
    10.0
}

fn default_n_scenarios() -> usize {
    1
}

fn default_a() -> f64 {
    0.05
}

fn default_b() -> f64 {
    0.03
}

fn default_sigma() -> f64 {
    0.05
}

fn default_steps_per_year() -> u32 {
    12
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirConfig {
    /// Horizon, which is also the maturity of the zero-coupon bond
    #[serde(default = "default_n_years")]
    pub n_years: f64,
    #[serde(default = "default_n_scenarios")]
    pub n_scenarios: usize,
    /// Mean-reversion speed
    #[serde(default = "default_a")]
    pub a: f64,
    /// Long-run mean rate
    #[serde(default = "default_b")]
    pub b: f64,
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_steps_per_year")]
    pub steps_per_year: u32,
    /// Starting annualised rate; `b` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r0: Option<f64>,
}

impl Default for CirConfig {
    fn default() -> Self {
        Self {
            n_years: default_n_years(),
            n_scenarios: default_n_scenarios(),
            a: default_a(),
            b: default_b(),
            sigma: default_sigma(),
            steps_per_year: default_steps_per_year(),
            r0: None,
        }
    }
}

impl CirConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("n_years", self.n_years)?;
        ensure_positive("a", self.a)?;
        ensure_finite("b", self.b)?;
        ensure_positive("sigma", self.sigma)?;
        if self.b < 0.0 {
            return Err(ConfigError::InvalidModel {
                model: "CIR",
                reason: "long-run mean must be non-negative",
            });
        }
        if let Some(r0) = self.r0 {
            ensure_finite("r0", r0)?;
            if r0 < 0.0 {
                return Err(ConfigError::InvalidModel {
                    model: "CIR",
                    reason: "initial rate must be non-negative",
                });
            }
        }
        if self.steps_per_year == 0 || self.n_scenarios == 0 {
            return Err(ConfigError::InvalidModel {
                model: "CIR",
                reason: "steps_per_year and n_scenarios must be positive",
            });
        }
        Ok(())
    }

    /// `2ab >= sigma^2`: the continuous process never touches zero
    #[must_use]
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.a * self.b >= self.sigma * self.sigma
    }

    #[must_use]
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.steps_per_year)
    }

    /// Number of recorded points per path, including the starting rate
    #[must_use]
    pub fn n_points(&self) -> usize {
        (self.n_years * f64::from(self.steps_per_year)).round() as usize + 1
    }

    /// One step of the discretised recursion, in instantaneous terms
    #[must_use]
    pub fn step(&self, r: f64, z: f64) -> f64 {
        let dt = self.dt();
        let next = r + self.a * (self.b - r) * dt + self.sigma * (r.max(0.0) * dt).sqrt() * z;
        next.abs()
    }

    /// Closed-form zero-coupon bond price for time-to-maturity `ttm`
    /// and instantaneous short rate `r`
    #[must_use]
    pub fn zero_coupon_price(&self, ttm: f64, r: f64) -> f64 {
        let (a, b, sigma) = (self.a, self.b, self.sigma);
        let h = (a * a + 2.0 * sigma * sigma).sqrt();
        let growth = (h * ttm).exp_m1();
        let denom = 2.0 * h + (h + a) * growth;
        let big_a = (2.0 * h * ((h + a) * ttm / 2.0).exp() / denom).powf(2.0 * a * b / (sigma * sigma));
        let big_b = 2.0 * growth / denom;
        big_a * (-big_b * r).exp()
    }

    fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> (Vec<f64>, Vec<f64>) {
        let n = self.n_points();
        let dt = self.dt();
        let mut r = ann_to_inst(self.r0.unwrap_or(self.b));

        let mut rates = Vec::with_capacity(n);
        let mut prices = Vec::with_capacity(n);
        rates.push(inst_to_ann(r));
        prices.push(self.zero_coupon_price(self.n_years, r));

        for step in 1..n {
            let z: f64 = StandardNormal.sample(rng);
            r = self.step(r, z);
            rates.push(inst_to_ann(r));
            let ttm = (self.n_years - step as f64 * dt).max(0.0);
            prices.push(self.zero_coupon_price(ttm, r));
        }
        (rates, prices)
    }

    /// Simulate `n_scenarios` rate paths and the matching bond prices
    pub fn generate(&self, seed: u64) -> Result<RatePaths, ConfigError> {
        self.validate()?;
        if !self.satisfies_feller() {
            tracing::debug!(
                a = self.a,
                b = self.b,
                sigma = self.sigma,
                "CIR parameters violate the Feller condition; rates will be reflected at zero"
            );
        }

        let seeds = path_seeds(seed, self.n_scenarios);
        let (rates, prices): (Vec<Vec<f64>>, Vec<Vec<f64>>) = map_seeds(&seeds, |rng| self.sample_one(rng))
            .into_iter()
            .unzip();

        Ok(RatePaths {
            steps_per_year: self.steps_per_year,
            rates,
            zero_coupon_prices: prices,
        })
    }
}

/// Simulated short-rate scenarios with zero-coupon prices along each path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePaths {
    pub steps_per_year: u32,
    /// Annualised short rate; `rates[path][step]`
    pub rates: Vec<Vec<f64>>,
    /// Price of a zero-coupon bond maturing at the horizon
    pub zero_coupon_prices: Vec<Vec<f64>>,
}

impl RatePaths {
    #[must_use]
    pub fn n_scenarios(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn n_points(&self) -> usize {
        self.rates.first().map_or(0, Vec::len)
    }

    /// Cross-path average rate at each step
    #[must_use]
    pub fn mean_rates(&self) -> Vec<f64> {
        let n = self.n_scenarios() as f64;
        (0..self.n_points())
            .map(|step| self.rates.iter().map(|p| p[step]).sum::<f64>() / n)
            .collect()
    }

    /// Per-period zero-coupon bond returns, usable as a safe-asset series
    pub fn bond_returns(&self) -> Result<ReturnPaths, ConfigError> {
        let paths = self
            .zero_coupon_prices
            .iter()
            .map(|prices| {
                prices
                    .windows(2)
                    .map(|w| w[1] / w[0] - 1.0)
                    .collect::<ReturnSeries>()
            })
            .collect();
        ReturnPaths::new(paths)
    }
}
