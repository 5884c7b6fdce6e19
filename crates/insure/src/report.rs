//! Plain-text rendering of command reports

use std::fmt;

use insure_core::analysis::Distribution;
use insure_core::analysis::risk::ReturnSummary;

use crate::commands::{BacktestReport, FundingSummary, RatesReport, SimulationReport, SweepReport};

/// Wealth with thousands separators and two decimals, e.g. `12,345.67`
pub fn format_amount(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}.{frac}")
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn format_optional(value: Option<f64>, format: fn(f64) -> String) -> String {
    value.map_or_else(|| "n/a".to_string(), format)
}

fn write_distribution(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    dist: &Distribution,
    format: fn(f64) -> String,
) -> fmt::Result {
    writeln!(f, "{label}")?;
    writeln!(
        f,
        "  mean {}  std {}  min {}  max {}",
        format(dist.mean),
        format(dist.std_dev),
        format(dist.min),
        format(dist.max)
    )?;
    let percentiles: Vec<String> = dist
        .percentiles
        .iter()
        .map(|(p, v)| format!("p{:.0} {}", p * 100.0, format(*v)))
        .collect();
    if !percentiles.is_empty() {
        writeln!(f, "  {}", percentiles.join("  "))?;
    }
    Ok(())
}

fn write_return_summary(f: &mut fmt::Formatter<'_>, label: &str, s: &ReturnSummary) -> fmt::Result {
    writeln!(f, "{label}")?;
    writeln!(
        f,
        "  return {}  vol {}  sharpe {}  max drawdown {}",
        format_percentage(s.annualized_return),
        format_percentage(s.annualized_vol),
        format_optional(s.sharpe_ratio, |v| format!("{v:.2}")),
        format_percentage(s.max_drawdown),
    )?;
    writeln!(
        f,
        "  skew {}  kurtosis {}  CF VaR(5%) {}  CVaR(5%) {}",
        format_optional(s.skewness, |v| format!("{v:.2}")),
        format_optional(s.kurtosis, |v| format!("{v:.2}")),
        format_optional(s.cornish_fisher_var, format_percentage),
        format_optional(s.historic_cvar, format_percentage),
    )
}

impl fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backtest over {} periods", self.n_periods)?;
        writeln!(f, "  CPPI terminal wealth   {}", format_amount(self.terminal_wealth))?;
        writeln!(f, "  Risky buy-and-hold     {}", format_amount(self.risky_terminal_wealth))?;
        writeln!(f, "  Terminal floor         {}", format_amount(self.terminal_floor))?;
        writeln!(
            f,
            "  Floor breached         {}",
            if self.violated { "yes" } else { "no" }
        )?;
        if self.violated {
            writeln!(f, "  Worst shortfall        {}", format_amount(self.max_shortfall))?;
        }
        if let Some(stats) = &self.strategy_stats {
            write_return_summary(f, "CPPI returns", stats)?;
        }
        if let Some(stats) = &self.risky_stats {
            write_return_summary(f, "Risky returns", stats)?;
        }
        Ok(())
    }
}

fn write_funding(f: &mut fmt::Formatter<'_>, funding: &FundingSummary) -> fmt::Result {
    writeln!(f, "Funding against a liability of {}", format_amount(funding.liability))?;
    write_distribution(f, "  initial funding ratio", &funding.initial_ratio, |v| format!("{v:.3}"))?;
    write_distribution(f, "  terminal funding ratio", &funding.terminal_ratio, |v| format!("{v:.3}"))?;
    writeln!(f, "  underfunded at horizon {}", format_percentage(funding.underfunded_rate))
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(
            f,
            "Simulated {} paths (seed {}, {:?} safe asset)",
            s.num_paths, self.seed, self.safe_asset
        )?;
        write_distribution(f, "Terminal wealth", &s.terminal, format_amount)?;
        writeln!(
            f,
            "Floor violations ({:?}): {} ({})",
            s.mode,
            s.violations,
            format_percentage(s.violation_rate)
        )?;
        if let Some(shortfall) = s.conditional_shortfall {
            writeln!(f, "Mean shortfall when violated: {}", format_amount(shortfall))?;
        }
        if let Some(funding) = &self.funding {
            write_funding(f, funding)?;
        }
        Ok(())
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Multiplier sweep (seed {})", self.seed)?;
        writeln!(
            f,
            "{:>10}  {:>10}  {:>14}  {:>14}  {:>14}",
            "multiplier", "violations", "mean wealth", "median wealth", "shortfall"
        )?;
        for point in &self.points {
            let s = &point.summary;
            writeln!(
                f,
                "{:>10.2}  {:>10}  {:>14}  {:>14}  {:>14}",
                point.multiplier,
                format_percentage(s.violation_rate),
                format_amount(s.terminal.mean),
                format_optional(s.terminal.median(), format_amount),
                format_optional(s.conditional_shortfall, format_amount),
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for RatesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CIR short rate, {} scenarios (seed {})", self.n_scenarios, self.seed)?;
        if !self.satisfies_feller {
            writeln!(f, "  Feller condition fails: rates may touch zero")?;
        }
        let by_year: Vec<String> = self
            .mean_rate_by_year
            .iter()
            .enumerate()
            .map(|(year, r)| format!("y{year} {}", format_percentage(*r)))
            .collect();
        writeln!(f, "Mean rate by year: {}", by_year.join("  "))?;
        write_distribution(f, "Terminal rate", &self.terminal_rate, format_percentage)?;
        write_distribution(f, "Zero-coupon price today", &self.initial_bond_price, |v| {
            format!("{v:.4}")
        })?;
        write_distribution(f, "Bond return to maturity (annualised)", &self.bond_return, format_percentage)?;
        if let Some(funding) = &self.initial_funding_ratio {
            write_distribution(f, "Initial funding ratio", funding, |v| format!("{v:.3}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{backtest, sweep};
    use crate::scenario::Scenario;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(941.0), "941.00");
        assert_eq!(format_amount(1_234.5), "1,234.50");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-12_000.0), "-12,000.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.0525), "5.25%");
    }

    #[test]
    fn test_backtest_text() {
        let report = backtest(&Scenario::from_yaml("returns: [-0.10]").unwrap()).unwrap();
        let text = report.to_string();
        assert!(text.contains("941.00"));
        assert!(text.contains("Floor breached         no"));
    }

    #[test]
    fn test_sweep_text_has_one_row_per_multiplier() {
        let scenario = Scenario::from_yaml(
            "market:\n  n_years: 1\n  n_scenarios: 20\nmultipliers: [1, 2, 3]\n",
        )
        .unwrap();
        let text = sweep(&scenario).unwrap().to_string();
        // Title, header, three rows
        assert_eq!(text.lines().count(), 5);
    }
}
