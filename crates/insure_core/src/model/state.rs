use serde::{Deserialize, Serialize};

/// Which constraint sized the cushion in a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingConstraint {
    Floor,
    Cap,
}

/// One rebalancing period of a CPPI run
///
/// `asset_value` is the start-of-period wealth that gets split between the
/// risky and riskless legs; `ending_value` is the wealth after both legs
/// earn their returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub period: usize,
    pub asset_value: f64,
    pub floor: f64,
    pub cap: Option<f64>,
    pub binding: BindingConstraint,
    /// Distance to the binding constraint (may be negative)
    pub cushion: f64,
    pub risky_allocation: f64,
    pub riskless_allocation: f64,
    pub risky_return: f64,
    pub riskless_return: f64,
    pub ending_value: f64,
    /// Running peak wealth after this period
    pub peak: f64,
}

impl PortfolioState {
    /// Fraction of wealth held in the risky asset
    #[must_use]
    pub fn risky_weight(&self) -> f64 {
        if self.asset_value > 0.0 {
            self.risky_allocation / self.asset_value
        } else {
            0.0
        }
    }

    /// Wealth ended the period below the floor
    #[must_use]
    pub fn violated(&self) -> bool {
        self.ending_value < self.floor
    }

    /// How far the ending wealth fell below the floor (0 if it did not)
    #[must_use]
    pub fn shortfall(&self) -> f64 {
        (self.floor - self.ending_value).max(0.0)
    }
}
