//! Portfolio insurance simulation library
//!
//! This crate runs Constant Proportion Portfolio Insurance (CPPI) over
//! historical or simulated return paths and reports how well the floor
//! held up. It supports:
//! - Fixed floors, drawdown-based floors and an optional upside cap
//! - Geometric Brownian motion paths for the risky asset
//! - Cox-Ingersoll-Ross short rates with zero-coupon bond prices, usable
//!   as a stochastic safe asset
//! - Batch runs across thousands of paths, in parallel with the
//!   `parallel` feature
//! - Terminal wealth distributions, floor-violation rates and multiplier
//!   sweeps
//! - Return and risk statistics, bond pricing and liability matching
//!
//! # Example
//!
//! ```ignore
//! use insure_core::{CppiParameters, GbmConfig, ViolationMode, monte_carlo, summarize};
//!
//! let params = CppiParameters::builder()
//!     .multiplier(4.0)
//!     .drawdown(0.25)
//!     .build()?;
//! let gbm = GbmConfig { n_scenarios: 5_000, sigma: 0.2, ..Default::default() };
//!
//! let batch = monte_carlo(&gbm, &params, 42)?;
//! let summary = summarize(&batch, ViolationMode::AnyPeriod);
//! println!("violation rate: {:.2}%", summary.violation_rate * 100.0);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod allocator;
pub mod analysis;
pub mod bonds;
pub mod error;
pub mod paths;
pub mod portfolio;
pub mod simulation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use allocator::{Allocator, run_cppi};
pub use analysis::{BatchSummary, ViolationMode, summarize};
pub use config::{CapBase, CapConfig, CppiBuilder, CppiParameters};
pub use error::{ConfigError, CppiError};
pub use model::{CppiRun, PortfolioState, ReturnPaths, ReturnSeries, SimulationBatch};
pub use paths::{CirConfig, GbmConfig, RatePaths};
pub use simulation::{SweepPoint, monte_carlo, simulate_batch, sweep_multipliers};
