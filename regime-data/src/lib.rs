//! Fiscal-year configuration loading for the regime comparison engine.
//!
//! Bracket schedules, deduction caps and filing rules are kept in CSV files,
//! one row per bracket, cap or rule, tagged with the fiscal year they apply
//! to. [`ConfigLoader`] parses the rows and [`FiscalYearConfig::assemble`]
//! turns one year's rows into validated engine inputs.

mod config;
mod error;
pub mod loader;

pub use config::{FiscalYearConfig, available_fiscal_years};
pub use error::ConfigLoaderError;
pub use loader::{BracketRecord, CapRecord, ConfigLoader, FilingRuleRecord};
