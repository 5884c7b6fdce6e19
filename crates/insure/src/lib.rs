//! Command-line front end for the portfolio insurance simulator
//!
//! Scenarios are YAML files (see [`scenario`]); each subcommand in
//! [`commands`] turns one into a report that prints as text or JSON.

pub mod commands;
pub mod logging;
pub mod report;
pub mod scenario;

pub use logging::init_logging;
pub use scenario::{SafeAsset, Scenario};
