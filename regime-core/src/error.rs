use thiserror::Error;

use crate::models::BracketTableError;

/// Failures surfaced by the engine. No partial result accompanies any of them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxEngineError {
    /// A numeric argument was negative, NaN or infinite, or violated a
    /// cross-field constraint.
    #[error("invalid input for {field}: {value}")]
    InvalidInput { field: &'static str, value: String },

    #[error("invalid bracket table: {0}")]
    InvalidBracketTable(#[from] BracketTableError),

    /// The filing decision table has no rule matching the income profile.
    #[error("no filing rule matches the income profile")]
    NoMatchingFilingRule,
}

impl TaxEngineError {
    pub(crate) fn invalid_input(
        field: &'static str,
        value: impl ToString,
    ) -> Self {
        Self::InvalidInput {
            field,
            value: value.to_string(),
        }
    }
}
