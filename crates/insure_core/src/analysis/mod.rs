//! Post-simulation analysis
//!
//! - [`summary`]: cross-path statistics of a batch (terminal wealth
//!   distribution, floor violations)
//! - [`risk`]: return and risk statistics of a single series

pub mod risk;
pub mod summary;

pub use risk::{ReturnSummary, summary_stats};
pub use summary::{BatchSummary, Distribution, ViolationMode, percentile, summarize};
