//! Static mean-variance helpers for comparing the risky and safe legs

use serde::{Deserialize, Serialize};

/// Weighted sum of asset returns; `None` if the lengths differ
#[must_use]
pub fn portfolio_return(weights: &[f64], returns: &[f64]) -> Option<f64> {
    (weights.len() == returns.len())
        .then(|| weights.iter().zip(returns).map(|(w, r)| w * r).sum())
}

/// `sqrt(w' Σ w)`; `None` unless `cov` is square with one row per weight
#[must_use]
pub fn portfolio_vol(weights: &[f64], cov: &[Vec<f64>]) -> Option<f64> {
    let n = weights.len();
    if cov.len() != n || cov.iter().any(|row| row.len() != n) {
        return None;
    }
    let variance: f64 = weights
        .iter()
        .zip(cov)
        .map(|(wi, row)| wi * row.iter().zip(weights).map(|(c, wj)| c * wj).sum::<f64>())
        .sum();
    Some(variance.max(0.0).sqrt())
}

/// One portfolio on a two-asset frontier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// Weight in the first asset; the rest is in the second
    pub weight: f64,
    pub volatility: f64,
    pub expected_return: f64,
}

/// Trace `n_points` evenly spaced mixes from all-second-asset (`w = 0`)
/// to all-first-asset (`w = 1`)
#[must_use]
pub fn two_asset_frontier(n_points: usize, er: [f64; 2], cov: [[f64; 2]; 2]) -> Vec<FrontierPoint> {
    let cov: Vec<Vec<f64>> = cov.iter().map(|row| row.to_vec()).collect();
    let denom = n_points.saturating_sub(1).max(1) as f64;

    (0..n_points)
        .filter_map(|i| {
            let weight = i as f64 / denom;
            let w = [weight, 1.0 - weight];
            Some(FrontierPoint {
                weight,
                volatility: portfolio_vol(&w, &cov)?,
                expected_return: portfolio_return(&w, &er)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portfolio_return() {
        let r = portfolio_return(&[0.6, 0.4], &[0.10, 0.02]).unwrap();
        assert!((r - 0.068).abs() < 1e-12);
        assert_eq!(portfolio_return(&[1.0], &[0.1, 0.2]), None);
    }

    #[test]
    fn test_portfolio_vol() {
        let cov = vec![vec![0.04, 0.0], vec![0.0, 0.01]];
        let vol = portfolio_vol(&[0.5, 0.5], &cov).unwrap();
        assert!((vol - (0.25_f64 * 0.04 + 0.25 * 0.01).sqrt()).abs() < 1e-12);
        assert_eq!(portfolio_vol(&[0.5, 0.5], &[vec![0.04]]), None);
    }

    #[test]
    fn test_two_asset_frontier_endpoints_and_diversification() {
        let er = [0.08, 0.03];
        let cov = [[0.04, -0.002], [-0.002, 0.0025]];
        let frontier = two_asset_frontier(11, er, cov);

        assert_eq!(frontier.len(), 11);
        let first = frontier[0];
        let last = frontier[10];
        assert_eq!(first.weight, 0.0);
        assert!((first.expected_return - 0.03).abs() < 1e-12);
        assert!((first.volatility - 0.05).abs() < 1e-12);
        assert_eq!(last.weight, 1.0);
        assert!((last.volatility - 0.2).abs() < 1e-12);

        // Negative correlation: some mix is less volatile than either asset
        let min_vol = frontier.iter().map(|p| p.volatility).fold(f64::INFINITY, f64::min);
        assert!(min_vol < first.volatility);
    }
}
