//! Constant Proportion Portfolio Insurance
//!
//! Each period the portfolio is split in two: `multiplier × cushion` goes
//! to the risky asset (never less than zero, never more than the whole
//! portfolio) and the rest earns the riskless return. The cushion is
//! measured against whichever constraint binds: the floor from below, or
//! the cap from above when wealth is closer to the cap.
//!
//! In drawdown mode the floor follows `(1 - max_drawdown) × peak`, where the
//! peak includes the start-of-period wealth but not the period's return.
//!
//! The cap binds once wealth reaches the midpoint between floor and cap, so
//! the cushion is always `min(wealth - floor, cap - wealth)`. A rising
//! drawdown floor can overtake a cap fixed on initial wealth; from then on
//! the cushion is never positive and the whole portfolio sits in the
//! riskless asset.

use crate::config::{CapBase, CppiParameters};
use crate::error::{ConfigError, CppiError, Result};
use crate::model::{BindingConstraint, CppiRun, PortfolioState, ReturnSeries};

/// A validated CPPI strategy, ready to run over any number of paths
#[derive(Debug, Clone)]
pub struct Allocator {
    params: CppiParameters,
}

impl Allocator {
    pub fn new(params: CppiParameters) -> std::result::Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[must_use]
    pub fn params(&self) -> &CppiParameters {
        &self.params
    }

    /// Floor for a period given the running peak
    #[must_use]
    pub fn floor(&self, peak: f64) -> f64 {
        match self.params.drawdown {
            Some(dd) => (1.0 - dd) * peak,
            None => self.params.floor_ratio * self.params.initial_wealth,
        }
    }

    /// Cap for a period given the running peak, if a cap is configured
    #[must_use]
    pub fn cap(&self, peak: f64) -> Option<f64> {
        self.params.cap.map(|cap| match cap.base {
            CapBase::Initial => cap.ratio * self.params.initial_wealth,
            CapBase::Peak => cap.ratio * peak,
        })
    }

    /// Rebalance at `asset_value`, then apply one period of returns.
    ///
    /// `peak` is the running peak before this period; the returned state
    /// carries the updated one.
    #[must_use]
    pub fn step(
        &self,
        period: usize,
        asset_value: f64,
        peak: f64,
        risky_return: f64,
        riskless_return: f64,
    ) -> PortfolioState {
        let peak = peak.max(asset_value);
        let floor = self.floor(peak);
        let cap = self.cap(peak);

        let (binding, cushion) = match cap {
            Some(cap) if asset_value >= (floor + cap) / 2.0 => {
                (BindingConstraint::Cap, cap - asset_value)
            }
            _ => (BindingConstraint::Floor, asset_value - floor),
        };

        let risky_allocation = if cushion > 0.0 && asset_value > 0.0 {
            (self.params.multiplier * cushion).clamp(0.0, asset_value)
        } else {
            0.0
        };
        let riskless_allocation = asset_value - risky_allocation;

        let ending_value =
            risky_allocation * (1.0 + risky_return) + riskless_allocation * (1.0 + riskless_return);

        PortfolioState {
            period,
            asset_value,
            floor,
            cap,
            binding,
            cushion,
            risky_allocation,
            riskless_allocation,
            risky_return,
            riskless_return,
            ending_value,
            peak: peak.max(ending_value),
        }
    }

    /// Run the strategy over a risky return path.
    ///
    /// With no `safe` series every period earns
    /// `riskless_rate / periods_per_year` on the riskless leg.
    pub fn run(&self, risky: &ReturnSeries, safe: Option<&ReturnSeries>) -> Result<CppiRun> {
        if let Some(safe) = safe
            && safe.len() != risky.len()
        {
            return Err(CppiError::LengthMismatch {
                risky: risky.len(),
                safe: safe.len(),
            });
        }

        let fixed_safe = self.params.riskless_per_period();
        let mut states = Vec::with_capacity(risky.len());
        let mut asset_value = self.params.initial_wealth;
        let mut peak = self.params.initial_wealth;

        for (period, risky_return) in risky.iter().enumerate() {
            let riskless_return = safe
                .and_then(|s| s.get(period))
                .unwrap_or(fixed_safe);
            let state = self.step(period, asset_value, peak, risky_return, riskless_return);
            asset_value = state.ending_value;
            peak = state.peak;
            states.push(state);
        }

        Ok(CppiRun {
            params: self.params.clone(),
            states,
            risky_wealth: risky.wealth_index(self.params.initial_wealth),
        })
    }
}

/// Validate `params` and run a single path
pub fn run_cppi(
    risky: &ReturnSeries,
    safe: Option<&ReturnSeries>,
    params: &CppiParameters,
) -> Result<CppiRun> {
    Allocator::new(params.clone())?.run(risky, safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CapConfig;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_single_period_worked_example() {
        let params = CppiParameters {
            initial_wealth: 1000.0,
            floor_ratio: 0.8,
            multiplier: 3.0,
            riskless_rate: 0.03,
            ..Default::default()
        };
        let run = run_cppi(&ReturnSeries::new(vec![-0.10]), None, &params).unwrap();
        let s = run.states[0];

        assert!(approx(s.floor, 800.0));
        assert!(approx(s.cushion, 200.0));
        assert!(approx(s.risky_allocation, 600.0));
        assert!(approx(s.riskless_allocation, 400.0));
        assert!(approx(s.ending_value, 540.0 + 401.0));
        assert_eq!(s.binding, BindingConstraint::Floor);
        assert!(!s.violated());
    }

    #[test]
    fn test_risky_allocation_capped_at_wealth() {
        let params = CppiParameters {
            multiplier: 10.0,
            ..Default::default()
        };
        let run = run_cppi(&ReturnSeries::new(vec![0.05]), None, &params).unwrap();
        // 10 × 200 would be 2000, more than the whole portfolio
        assert!(approx(run.states[0].risky_allocation, 1000.0));
        assert!(approx(run.states[0].riskless_allocation, 0.0));
    }

    #[test]
    fn test_cap_binds_near_the_top() {
        let params = CppiParameters {
            initial_wealth: 100.0,
            floor_ratio: 0.8,
            multiplier: 3.0,
            riskless_rate: 0.0,
            cap: Some(CapConfig {
                ratio: 1.2,
                base: CapBase::Initial,
            }),
            ..Default::default()
        };
        let alloc = Allocator::new(params).unwrap();

        // Midpoint between 80 and 120 is 100, so the cap binds at 100
        let s = alloc.step(0, 100.0, 100.0, 0.0, 0.0);
        assert_eq!(s.binding, BindingConstraint::Cap);
        assert!(approx(s.cushion, 20.0));
        assert!(approx(s.risky_allocation, 60.0));

        let s = alloc.step(1, 95.0, 100.0, 0.0, 0.0);
        assert_eq!(s.binding, BindingConstraint::Floor);
        assert!(approx(s.cushion, 15.0));

        // Above the cap the cushion is negative and the portfolio de-risks
        let s = alloc.step(2, 130.0, 130.0, 0.0, 0.0);
        assert_eq!(s.binding, BindingConstraint::Cap);
        assert!(s.cushion < 0.0);
        assert_eq!(s.risky_allocation, 0.0);
    }

    #[test]
    fn test_peak_cap_moves_with_peak() {
        let params = CppiParameters {
            drawdown: Some(0.2),
            cap: Some(CapConfig {
                ratio: 1.5,
                base: CapBase::Peak,
            }),
            ..Default::default()
        };
        let alloc = Allocator::new(params).unwrap();
        let s = alloc.step(0, 2000.0, 1000.0, 0.0, 0.0);
        assert!(approx(s.cap.unwrap(), 3000.0));
        assert!(approx(s.floor, 1600.0));
    }

    #[test]
    fn test_drawdown_floor_uses_prior_peak() {
        let params = CppiParameters {
            initial_wealth: 100.0,
            drawdown: Some(0.2),
            multiplier: 2.0,
            riskless_rate: 0.0,
            ..Default::default()
        };
        let run = run_cppi(&ReturnSeries::new(vec![0.10, -0.05]), None, &params).unwrap();

        // Period 0: peak 100, floor 80, cushion 20, risky 40
        assert!(approx(run.states[0].floor, 80.0));
        assert!(approx(run.states[0].ending_value, 104.0));
        // Period 1: peak now 104, floor 83.2
        assert!(approx(run.states[1].floor, 83.2));
        assert!(approx(run.states[1].peak, 104.0));
    }

    #[test]
    fn test_safe_series_length_must_match() {
        let params = CppiParameters::default();
        let err = run_cppi(
            &ReturnSeries::constant(0.01, 3),
            Some(&ReturnSeries::constant(0.0, 2)),
            &params,
        )
        .unwrap_err();
        assert_eq!(err, CppiError::LengthMismatch { risky: 3, safe: 2 });
    }

    #[test]
    fn test_safe_series_overrides_flat_rate() {
        let params = CppiParameters {
            multiplier: 0.0,
            ..Default::default()
        };
        let run = run_cppi(
            &ReturnSeries::constant(0.05, 2),
            Some(&ReturnSeries::new(vec![0.01, 0.02])),
            &params,
        )
        .unwrap();
        assert!(approx(run.terminal_wealth(), 1000.0 * 1.01 * 1.02));
    }

    #[test]
    fn test_invalid_params_rejected_before_running() {
        let params = CppiParameters {
            floor_ratio: 1.5,
            ..Default::default()
        };
        let err = run_cppi(&ReturnSeries::constant(0.01, 3), None, &params).unwrap_err();
        assert_eq!(
            err,
            CppiError::Config(ConfigError::FloorRatioOutOfRange(1.5))
        );
    }

    #[test]
    fn test_risky_wealth_benchmark() {
        let run = run_cppi(
            &ReturnSeries::new(vec![0.1, 0.1]),
            None,
            &CppiParameters::default(),
        )
        .unwrap();
        assert!(approx(run.risky_wealth[1], 1210.0));
    }
}
