use regime_core::{BracketTableError, Regime};
use thiserror::Error;

/// Errors that can occur when loading fiscal-year configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown regime code '{0}' (expected 'old' or 'new')")]
    UnknownRegime(String),

    #[error("Invalid value '{value}' in column {column} (expected yes, no or empty)")]
    InvalidPredicate { column: &'static str, value: String },

    #[error("No {regime} bracket schedule for fiscal year {fiscal_year}")]
    MissingSchedule { fiscal_year: String, regime: Regime },

    #[error("Invalid {regime} bracket schedule for fiscal year {fiscal_year}: {source}")]
    InvalidBracketTable {
        fiscal_year: String,
        regime: Regime,
        source: BracketTableError,
    },

    #[error("Duplicate {regime} cap for category '{category}' in fiscal year {fiscal_year}")]
    DuplicateCap {
        fiscal_year: String,
        regime: Regime,
        category: String,
    },

    #[error("Negative cap {cap} for category '{category}'")]
    NegativeCap { category: String, cap: String },

    #[error("No filing rules for fiscal year {0}")]
    NoFilingRules(String),
}

impl From<csv::Error> for ConfigLoaderError {
    fn from(err: csv::Error) -> Self {
        ConfigLoaderError::CsvParse(err.to_string())
    }
}
