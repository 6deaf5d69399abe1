use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A previously recorded computation, supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub gross_income: Decimal,
    pub taxable_income: Decimal,
    pub total_tax: Decimal,
    #[serde(alias = "created_at")]
    pub timestamp: DateTime<Utc>,
}
