//! Fluent construction of `CppiParameters`
//!
//! ```ignore
//! let params = CppiBuilder::new()
//!     .initial_wealth(100.0)
//!     .multiplier(5.0)
//!     .cap(1.3, CapBase::Initial)
//!     .build()?;
//! ```

use super::{CapBase, CapConfig, CppiParameters};
use crate::error::ConfigError;

/// Builder for `CppiParameters`; `build` validates once
#[derive(Debug, Clone, Default)]
pub struct CppiBuilder {
    params: CppiParameters,
}

impl CppiBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn initial_wealth(mut self, wealth: f64) -> Self {
        self.params.initial_wealth = wealth;
        self
    }

    #[must_use]
    pub fn floor_ratio(mut self, ratio: f64) -> Self {
        self.params.floor_ratio = ratio;
        self
    }

    #[must_use]
    pub fn multiplier(mut self, m: f64) -> Self {
        self.params.multiplier = m;
        self
    }

    #[must_use]
    pub fn riskless_rate(mut self, annual_rate: f64) -> Self {
        self.params.riskless_rate = annual_rate;
        self
    }

    #[must_use]
    pub fn periods_per_year(mut self, periods: u32) -> Self {
        self.params.periods_per_year = periods;
        self
    }

    /// Switch to a drawdown-based floor
    #[must_use]
    pub fn drawdown(mut self, max_drawdown: f64) -> Self {
        self.params.drawdown = Some(max_drawdown);
        self
    }

    #[must_use]
    pub fn cap(mut self, ratio: f64, base: CapBase) -> Self {
        self.params.cap = Some(CapConfig { ratio, base });
        self
    }

    pub fn build(self) -> Result<CppiParameters, ConfigError> {
        self.params.validate()?;
        Ok(self.params)
    }
}
