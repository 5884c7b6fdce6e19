//! Strategy configuration
//!
//! `CppiParameters` holds everything the allocator needs. Fields carry serde
//! defaults so a scenario file only has to name what it changes:
//!
//! ```ignore
//! use insure_core::config::{CppiParameters, CapBase};
//!
//! let params = CppiParameters::builder()
//!     .initial_wealth(1_000.0)
//!     .floor_ratio(0.8)
//!     .multiplier(3.0)
//!     .riskless_rate(0.03)
//!     .drawdown(0.25)
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ensure_finite, ensure_positive};

mod builder;

pub use builder::CppiBuilder;

fn default_initial_wealth() -> f64 {
    1_000.0
}

fn default_floor_ratio() -> f64 {
    0.8
}

fn default_multiplier() -> f64 {
    3.0
}

fn default_riskless_rate() -> f64 {
    0.03
}

fn default_periods_per_year() -> u32 {
    12
}

/// What the cap ratio is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapBase {
    /// `ratio × initial_wealth`, fixed for the whole run
    #[default]
    Initial,
    /// `ratio × running peak wealth`
    Peak,
}

/// Upper wealth target used as an alternative binding constraint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapConfig {
    pub ratio: f64,
    #[serde(default)]
    pub base: CapBase,
}

/// Parameters of a CPPI run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CppiParameters {
    #[serde(default = "default_initial_wealth")]
    pub initial_wealth: f64,

    /// Floor as a fraction of initial wealth (fixed-floor mode only)
    #[serde(default = "default_floor_ratio")]
    pub floor_ratio: f64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Annual riskless rate, applied as `riskless_rate / periods_per_year`
    /// when no safe-asset series is supplied
    #[serde(default = "default_riskless_rate")]
    pub riskless_rate: f64,

    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,

    /// Maximum drawdown tolerated; when set the floor tracks
    /// `(1 - drawdown) × peak wealth` instead of the fixed floor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawdown: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<CapConfig>,
}

impl Default for CppiParameters {
    fn default() -> Self {
        Self {
            initial_wealth: default_initial_wealth(),
            floor_ratio: default_floor_ratio(),
            multiplier: default_multiplier(),
            riskless_rate: default_riskless_rate(),
            periods_per_year: default_periods_per_year(),
            drawdown: None,
            cap: None,
        }
    }
}

impl CppiParameters {
    #[must_use]
    pub fn builder() -> CppiBuilder {
        CppiBuilder::new()
    }

    /// Check every field once. Nothing is simulated with parameters that
    /// fail here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("initial_wealth", self.initial_wealth)?;
        ensure_finite("riskless_rate", self.riskless_rate)?;
        if self.periods_per_year == 0 {
            return Err(ConfigError::NotPositive {
                field: "periods_per_year",
                value: 0.0,
            });
        }

        ensure_finite("multiplier", self.multiplier)?;
        if self.multiplier < 0.0 {
            return Err(ConfigError::NegativeMultiplier(self.multiplier));
        }

        ensure_finite("floor_ratio", self.floor_ratio)?;
        if !(0.0..=1.0).contains(&self.floor_ratio) {
            return Err(ConfigError::FloorRatioOutOfRange(self.floor_ratio));
        }

        if let Some(dd) = self.drawdown {
            ensure_finite("drawdown", dd)?;
            if !(0.0..1.0).contains(&dd) {
                return Err(ConfigError::DrawdownOutOfRange(dd));
            }
        }

        if let Some(cap) = self.cap {
            ensure_finite("cap.ratio", cap.ratio)?;
            let floor = self.effective_floor_ratio();
            if cap.ratio <= floor {
                return Err(ConfigError::CapBelowFloor {
                    cap: cap.ratio,
                    floor,
                });
            }
        }

        Ok(())
    }

    /// Floor relative to the wealth it is measured against: the fixed
    /// ratio, or `1 - drawdown` in drawdown mode
    #[must_use]
    pub fn effective_floor_ratio(&self) -> f64 {
        match self.drawdown {
            Some(dd) => 1.0 - dd,
            None => self.floor_ratio,
        }
    }

    /// Riskless return earned in one period
    #[must_use]
    pub fn riskless_per_period(&self) -> f64 {
        self.riskless_rate / f64::from(self.periods_per_year)
    }

    #[must_use]
    pub fn with_multiplier(&self, multiplier: f64) -> Self {
        Self {
            multiplier,
            ..self.clone()
        }
    }
}
