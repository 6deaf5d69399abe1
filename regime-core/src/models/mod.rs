mod chart_series;
mod deduction;
mod filing_rules;
mod historical_point;
mod income_profile;
mod regime;
mod tax_bracket;
mod tax_computation;

pub use chart_series::{ChartSeries, RegimeBreakdown, Series, SeriesKind};
pub use deduction::{CapsTable, DeductionLineItem, DeductionSummary};
pub use filing_rules::{FilingRule, FilingRules};
pub use historical_point::HistoricalPoint;
pub use income_profile::{IncomeComposition, IncomeProfile};
pub use regime::Regime;
pub use tax_bracket::{BracketTable, BracketTableError, TaxBracket};
pub use tax_computation::{ComparisonInput, TaxBalance, TaxComputationResult};
