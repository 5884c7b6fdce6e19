//! Fixed income and liability valuation
//!
//! Rates passed to [`discount`], [`present_value`] and
//! [`macaulay_duration`] must match the frequency of the cash-flow times:
//! annual rates with times in years, per-coupon rates with times in
//! coupon periods.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{ReturnPaths, ReturnSeries};

/// Instantaneous (continuously compounded) rate to annual rate
#[must_use]
pub fn inst_to_ann(r: f64) -> f64 {
    r.exp_m1()
}

/// Annual rate to instantaneous rate
#[must_use]
pub fn ann_to_inst(r: f64) -> f64 {
    r.ln_1p()
}

/// Price today of 1 paid at time `t`
#[must_use]
pub fn discount(t: f64, r: f64) -> f64 {
    (1.0 + r).powf(-t)
}

/// Amounts paid at given times
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlows {
    flows: Vec<(f64, f64)>,
}

impl CashFlows {
    /// `(time, amount)` pairs, in any order
    #[must_use]
    pub fn new(flows: Vec<(f64, f64)>) -> Self {
        Self { flows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.flows.iter().copied()
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.flows.iter().map(|(_, amount)| amount).sum()
    }
}

impl FromIterator<(f64, f64)> for CashFlows {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[must_use]
pub fn present_value(flows: &CashFlows, r: f64) -> f64 {
    flows.iter().map(|(t, amount)| discount(t, r) * amount).sum()
}

/// Current assets over the present value of the liabilities
#[must_use]
pub fn funding_ratio(assets: f64, liabilities: &CashFlows, r: f64) -> f64 {
    assets / present_value(liabilities, r)
}

/// Present-value weighted average time of the flows
#[must_use]
pub fn macaulay_duration(flows: &CashFlows, r: f64) -> Option<f64> {
    let (weighted, total) = flows.iter().fold((0.0, 0.0), |(w, s), (t, amount)| {
        let pv = discount(t, r) * amount;
        (w + t * pv, s + pv)
    });
    (total != 0.0).then(|| weighted / total)
}

/// Weight in `short` that, with the rest in `long`, matches the duration
/// of `liabilities`. All three are discounted at `r`.
#[must_use]
pub fn matching_weights(
    short: &CashFlows,
    long: &CashFlows,
    liabilities: &CashFlows,
    r: f64,
) -> Option<f64> {
    let d_short = macaulay_duration(short, r)?;
    let d_long = macaulay_duration(long, r)?;
    let d_liab = macaulay_duration(liabilities, r)?;
    let spread = d_long - d_short;
    (spread != 0.0).then(|| (d_long - d_liab) / spread)
}

fn default_maturity() -> f64 {
    10.0
}

fn default_principal() -> f64 {
    100.0
}

fn default_coupon_rate() -> f64 {
    0.03
}

fn default_coupons_per_year() -> u32 {
    12
}

/// A plain fixed-coupon bond
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    /// Years to maturity
    #[serde(default = "default_maturity")]
    pub maturity: f64,
    #[serde(default = "default_principal")]
    pub principal: f64,
    /// Annual coupon as a fraction of principal
    #[serde(default = "default_coupon_rate")]
    pub coupon_rate: f64,
    #[serde(default = "default_coupons_per_year")]
    pub coupons_per_year: u32,
}

impl Default for Bond {
    fn default() -> Self {
        Self {
            maturity: default_maturity(),
            principal: default_principal(),
            coupon_rate: default_coupon_rate(),
            coupons_per_year: default_coupons_per_year(),
        }
    }
}

impl Bond {
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::error::ensure_finite("maturity", self.maturity)?;
        crate::error::ensure_positive("principal", self.principal)?;
        crate::error::ensure_finite("coupon_rate", self.coupon_rate)?;
        if self.coupons_per_year == 0 {
            return Err(ConfigError::NotPositive {
                field: "coupons_per_year",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Single coupon payment
    #[must_use]
    pub fn coupon(&self) -> f64 {
        self.principal * self.coupon_rate / f64::from(self.coupons_per_year)
    }

    /// Same bond with a different remaining maturity
    #[must_use]
    pub fn with_maturity(&self, maturity: f64) -> Self {
        Self { maturity, ..*self }
    }
}

/// Coupons at times `1..=n` (in coupon periods) with the principal added
/// to the last one. Empty for a bond with no coupon periods left.
#[must_use]
pub fn bond_cash_flows(bond: &Bond) -> CashFlows {
    let n = (bond.maturity * f64::from(bond.coupons_per_year)).round().max(0.0) as usize;
    let coupon = bond.coupon();
    (1..=n)
        .map(|k| {
            let amount = if k == n { coupon + bond.principal } else { coupon };
            (k as f64, amount)
        })
        .collect()
}

/// Price of `bond` at an annual discount rate, applied per coupon period
#[must_use]
pub fn bond_price(bond: &Bond, discount_rate: f64) -> f64 {
    present_value(
        &bond_cash_flows(bond),
        discount_rate / f64::from(bond.coupons_per_year),
    )
}

/// Price `bond` along simulated rate paths.
///
/// Step `i` of each path is taken to fall `i / coupons_per_year` years
/// after issue; once the bond has matured its value is the final
/// principal plus coupon.
pub fn bond_price_paths(rates: &[Vec<f64>], bond: &Bond) -> Result<Vec<Vec<f64>>, ConfigError> {
    bond.validate()?;
    let per_year = f64::from(bond.coupons_per_year);
    let redeemed = bond.principal + bond.coupon();
    Ok(rates
        .iter()
        .map(|path| {
            path.iter()
                .enumerate()
                .map(|(step, &r)| {
                    let ttm = bond.maturity - step as f64 / per_year;
                    if ttm <= 0.0 {
                        redeemed
                    } else {
                        bond_price(&bond.with_maturity(ttm), r)
                    }
                })
                .collect()
        })
        .collect())
}

/// Per-period total returns (price change plus coupon) along each price
/// path, usable as a safe-asset series
pub fn bond_total_returns(prices: &[Vec<f64>], bond: &Bond) -> Result<ReturnPaths, ConfigError> {
    bond.validate()?;
    let coupon = bond.coupon();
    let paths = prices
        .iter()
        .map(|path| {
            path.windows(2)
                .map(|w| (w[1] + coupon) / w[0] - 1.0)
                .collect::<ReturnSeries>()
        })
        .collect();
    ReturnPaths::new(paths)
}

/// Funding ratio along a path for a single liability due at the horizon,
/// priced off the matching zero-coupon bond
#[must_use]
pub fn funding_ratio_path(wealth: &[f64], zcb_prices: &[f64], liability: f64) -> Vec<f64> {
    wealth
        .iter()
        .zip(zcb_prices)
        .map(|(w, p)| w / (liability * p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn liabilities() -> CashFlows {
        CashFlows::new(vec![(3.0, 1.0), (3.5, 1.5), (4.0, 2.0), (4.5, 2.5)])
    }

    #[test]
    fn test_rate_conversions_invert() {
        let r = 0.05;
        assert!(close(inst_to_ann(ann_to_inst(r)), r, 1e-15));
        assert!(ann_to_inst(r) < r);
    }

    #[test]
    fn test_discount_and_present_value() {
        assert!(close(discount(10.0, 0.03), 1.03_f64.powi(-10), 1e-15));
        assert!(close(present_value(&liabilities(), 0.03), 6.233_320_315_080_045, 1e-9));
        assert!(close(
            funding_ratio(5.0, &liabilities(), 0.03),
            0.802_140_712_695_877_7,
            1e-9
        ));
        // Higher rates shrink liabilities and improve funding
        assert!(funding_ratio(5.0, &liabilities(), 0.05) > funding_ratio(5.0, &liabilities(), 0.03));
    }

    #[test]
    fn test_bond_cash_flows() {
        let bond = Bond {
            maturity: 3.0,
            principal: 100.0,
            coupon_rate: 0.03,
            coupons_per_year: 2,
        };
        let cf = bond_cash_flows(&bond);
        assert_eq!(cf.len(), 6);
        let flows: Vec<_> = cf.iter().collect();
        assert_eq!(flows[0], (1.0, 1.5));
        assert_eq!(flows[5], (6.0, 101.5));
        assert!(close(cf.total(), 109.0, 1e-12));

        assert!(bond_cash_flows(&bond.with_maturity(0.0)).is_empty());
    }

    #[test]
    fn test_bond_price() {
        let bond = Bond {
            maturity: 20.0,
            principal: 1000.0,
            coupon_rate: 0.05,
            coupons_per_year: 2,
        };
        assert!(close(bond_price(&bond, 0.04), 1_136.777_396_203_690_4, 1e-6));
        // Priced at par when the coupon equals the yield
        assert!(close(bond_price(&Bond::default(), 0.03), 100.0, 1e-9));
    }

    #[test]
    fn test_macaulay_duration() {
        let bond = Bond {
            maturity: 3.0,
            principal: 1000.0,
            coupon_rate: 0.06,
            coupons_per_year: 2,
        };
        let d = macaulay_duration(&bond_cash_flows(&bond), 0.03).unwrap();
        assert!(close(d, 5.579_707_187_194_534, 1e-9));

        // A zero-coupon flow has duration equal to its maturity
        let zero = CashFlows::new(vec![(7.0, 100.0)]);
        assert!(close(macaulay_duration(&zero, 0.05).unwrap(), 7.0, 1e-12));
        assert_eq!(macaulay_duration(&CashFlows::default(), 0.05), None);
    }

    #[test]
    fn test_matching_weights() {
        let annual = |maturity| Bond {
            maturity,
            principal: 1000.0,
            coupon_rate: 0.05,
            coupons_per_year: 1,
        };
        let short = bond_cash_flows(&annual(10.0));
        let long = bond_cash_flows(&annual(20.0));
        let liab = CashFlows::new(vec![(10.0, 100_000.0), (12.0, 100_000.0)]);

        let w = matching_weights(&short, &long, &liab, 0.04).unwrap();
        assert!(close(w, 0.482_630_920_694_789_6, 1e-9));

        // The mix carries the liability duration
        let d_short = macaulay_duration(&short, 0.04).unwrap();
        let d_long = macaulay_duration(&long, 0.04).unwrap();
        let d_liab = macaulay_duration(&liab, 0.04).unwrap();
        assert!(close(w * d_short + (1.0 - w) * d_long, d_liab, 1e-9));

        assert_eq!(matching_weights(&short, &short, &liab, 0.04), None);
    }

    #[test]
    fn test_bond_price_paths_and_returns() {
        let bond = Bond {
            maturity: 1.0,
            principal: 100.0,
            coupon_rate: 0.03,
            coupons_per_year: 12,
        };
        let rates = vec![vec![0.03; 14]];
        let prices = bond_price_paths(&rates, &bond).unwrap();

        assert_eq!(prices[0].len(), 14);
        assert!(close(prices[0][0], 100.0, 1e-9));
        // Matured from step 12 onwards
        assert!(close(prices[0][12], 100.25, 1e-12));
        assert!(close(prices[0][13], 100.25, 1e-12));

        let returns = bond_total_returns(&prices, &bond).unwrap();
        assert_eq!(returns.n_periods(), 13);
        // At par with flat rates, each month earns the coupon yield
        let first = returns.paths()[0].get(0).unwrap();
        assert!(close(first, 0.0025, 1e-9));
    }

    #[test]
    fn test_bond_paths_reject_invalid_bond() {
        let bond = Bond {
            coupons_per_year: 0,
            ..Default::default()
        };
        let rates = vec![vec![0.03; 4]];
        assert_eq!(
            bond_price_paths(&rates, &bond),
            Err(ConfigError::NotPositive {
                field: "coupons_per_year",
                value: 0.0,
            })
        );
        assert!(bond_total_returns(&[vec![100.0, 101.0]], &bond).is_err());

        let unpriced = Bond {
            principal: 0.0,
            ..Default::default()
        };
        assert!(bond_price_paths(&rates, &unpriced).is_err());
    }

    #[test]
    fn test_funding_ratio_path() {
        let fr = funding_ratio_path(&[100.0, 110.0, 90.0], &[0.8, 0.85, 0.9], 100.0);
        assert_eq!(fr.len(), 3);
        assert!(close(fr[0], 1.25, 1e-12));
        assert!(close(fr[2], 1.0, 1e-12));
    }
}
