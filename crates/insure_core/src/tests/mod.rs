//! Cross-module tests for the insurance engine
//!
//! Tests are organized by topic:
//! - `allocator_properties` - Invariants every CPPI run must satisfy
//! - `batch_scenario` - Large Monte Carlo batches and multiplier sweeps
//! - `liabilities` - Stochastic rates as the safe asset, funding ratios
//! - `scenario_files` - Parameter types loaded from serialized input
