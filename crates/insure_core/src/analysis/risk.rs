//! Return and risk statistics of a single return series
//!
//! All functions take per-period returns as plain slices so they work on
//! a `ReturnSeries`, a strategy's realised returns, or any column of
//! historical data. Statistics that are undefined for the input (empty
//! series, zero variance) come back as `None` instead of NaN.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::summary::percentile;

fn mean(r: &[f64]) -> Option<f64> {
    (!r.is_empty()).then(|| r.iter().sum::<f64>() / r.len() as f64)
}

/// Standard deviation with `ddof` degrees of freedom removed
fn std_dev(r: &[f64], ddof: usize) -> Option<f64> {
    if r.len() <= ddof {
        return None;
    }
    let m = mean(r)?;
    let ss: f64 = r.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (r.len() - ddof) as f64).sqrt())
}

/// Central moment of order `k` divided by the population std to the `k`
fn standardized_moment(r: &[f64], k: i32) -> Option<f64> {
    let m = mean(r)?;
    let sigma = std_dev(r, 0)?;
    if sigma == 0.0 {
        return None;
    }
    let moment = r.iter().map(|x| (x - m).powi(k)).sum::<f64>() / r.len() as f64;
    Some(moment / sigma.powi(k))
}

fn standard_normal_quantile(p: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) {
        return None;
    }
    Some(Normal::new(0.0, 1.0).ok()?.inverse_cdf(p))
}

/// Total return from compounding every period (0 for an empty series)
#[must_use]
pub fn compound(r: &[f64]) -> f64 {
    r.iter().map(|x| x.ln_1p()).sum::<f64>().exp_m1()
}

/// Geometric annual return of `r` sampled `periods_per_year` times a year
#[must_use]
pub fn annualize_returns(r: &[f64], periods_per_year: f64) -> Option<f64> {
    if r.is_empty() {
        return None;
    }
    let growth: f64 = r.iter().map(|x| 1.0 + x).product();
    Some(growth.powf(periods_per_year / r.len() as f64) - 1.0)
}

/// Sample volatility scaled by `sqrt(periods_per_year)`
#[must_use]
pub fn annualize_vol(r: &[f64], periods_per_year: f64) -> Option<f64> {
    std_dev(r, 1).map(|s| s * periods_per_year.sqrt())
}

/// Annualised excess return over annualised volatility.
///
/// `riskfree_rate` is annual and converted to a per-period rate by
/// compounding, `(1 + rf)^(1/ppy) - 1`.
#[must_use]
pub fn sharpe_ratio(r: &[f64], riskfree_rate: f64, periods_per_year: f64) -> Option<f64> {
    let rf_per_period = (1.0 + riskfree_rate).powf(1.0 / periods_per_year) - 1.0;
    let excess: Vec<f64> = r.iter().map(|x| x - rf_per_period).collect();
    let ann_excess = annualize_returns(&excess, periods_per_year)?;
    let ann_vol = annualize_vol(r, periods_per_year)?;
    (ann_vol > 0.0).then(|| ann_excess / ann_vol)
}

/// Wealth index with its running peak and drawdown from that peak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawdowns {
    pub wealth: Vec<f64>,
    pub previous_peaks: Vec<f64>,
    /// `(wealth - peak) / peak`, always <= 0
    pub drawdowns: Vec<f64>,
}

#[must_use]
pub fn drawdown(r: &[f64], initial_wealth: f64) -> Drawdowns {
    let mut wealth = Vec::with_capacity(r.len());
    let mut previous_peaks = Vec::with_capacity(r.len());
    let mut drawdowns = Vec::with_capacity(r.len());

    let mut value = initial_wealth;
    let mut peak = f64::NEG_INFINITY;
    for x in r {
        value *= 1.0 + x;
        peak = peak.max(value);
        wealth.push(value);
        previous_peaks.push(peak);
        drawdowns.push((value - peak) / peak);
    }

    Drawdowns {
        wealth,
        previous_peaks,
        drawdowns,
    }
}

/// Worst drawdown of the series, as a non-positive fraction
#[must_use]
pub fn max_drawdown(r: &[f64]) -> Option<f64> {
    drawdown(r, 1.0).drawdowns.into_iter().reduce(f64::min)
}

/// Population skewness
#[must_use]
pub fn skewness(r: &[f64]) -> Option<f64> {
    standardized_moment(r, 3)
}

/// Population kurtosis (not excess; a normal sample is near 3)
#[must_use]
pub fn kurtosis(r: &[f64]) -> Option<f64> {
    standardized_moment(r, 4)
}

/// Population standard deviation of the negative returns only
#[must_use]
pub fn semideviation(r: &[f64]) -> Option<f64> {
    let negative: Vec<f64> = r.iter().copied().filter(|x| *x < 0.0).collect();
    std_dev(&negative, 0)
}

/// Historic VaR at `level` percent, reported as a positive loss
#[must_use]
pub fn var_historic(r: &[f64], level: f64) -> Option<f64> {
    percentile(r, level / 100.0).map(|p| -p)
}

/// Mean loss of the returns at or beyond the historic VaR
#[must_use]
pub fn cvar_historic(r: &[f64], level: f64) -> Option<f64> {
    let var = var_historic(r, level)?;
    let tail: Vec<f64> = r.iter().copied().filter(|x| *x <= -var).collect();
    mean(&tail).map(|m| -m)
}

/// Parametric VaR assuming normally distributed returns
#[must_use]
pub fn var_gaussian(r: &[f64], level: f64) -> Option<f64> {
    let z = standard_normal_quantile(level / 100.0)?;
    Some(-(mean(r)? + z * std_dev(r, 0)?))
}

/// Parametric VaR with the Cornish-Fisher skew and kurtosis correction
#[must_use]
pub fn var_cornish_fisher(r: &[f64], level: f64) -> Option<f64> {
    let z = standard_normal_quantile(level / 100.0)?;
    let s = skewness(r)?;
    let k = kurtosis(r)?;
    let z = z + (z.powi(2) - 1.0) * s / 6.0 + (z.powi(3) - 3.0 * z) * (k - 3.0) / 24.0
        - (2.0 * z.powi(3) - 5.0 * z) * s.powi(2) / 36.0;
    Some(-(mean(r)? + z * std_dev(r, 0)?))
}

/// Level used for the VaR figures in [`ReturnSummary`]
pub const SUMMARY_VAR_LEVEL: f64 = 5.0;

/// Headline statistics of a return series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSummary {
    pub annualized_return: f64,
    pub annualized_vol: f64,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    /// Cornish-Fisher VaR at 5%
    pub cornish_fisher_var: Option<f64>,
    /// Historic CVaR at 5%
    pub historic_cvar: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
}

/// Needs at least two periods, for the sample volatility
#[must_use]
pub fn summary_stats(
    r: &[f64],
    periods_per_year: f64,
    riskfree_rate: f64,
) -> Option<ReturnSummary> {
    Some(ReturnSummary {
        annualized_return: annualize_returns(r, periods_per_year)?,
        annualized_vol: annualize_vol(r, periods_per_year)?,
        skewness: skewness(r),
        kurtosis: kurtosis(r),
        cornish_fisher_var: var_cornish_fisher(r, SUMMARY_VAR_LEVEL),
        historic_cvar: cvar_historic(r, SUMMARY_VAR_LEVEL),
        sharpe_ratio: sharpe_ratio(r, riskfree_rate, periods_per_year),
        max_drawdown: max_drawdown(r)?,
    })
}
