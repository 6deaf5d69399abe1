use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Income-composition facts used to pick a filing form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeComposition {
    pub has_business_income: bool,
    pub presumptive_taxation: bool,

    /// Capital gains, digital-asset income and similar special categories.
    pub has_special_category_income: bool,
}

/// Aggregated gross income for one taxpayer.
///
/// Summing individual income sources is the caller's job; the engine only
/// sees the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeProfile {
    pub gross_income: Decimal,
    #[serde(default)]
    pub composition: IncomeComposition,
}

impl IncomeProfile {
    pub fn new(gross_income: Decimal) -> Self {
        Self {
            gross_income,
            composition: IncomeComposition::default(),
        }
    }

    pub fn with_composition(
        mut self,
        composition: IncomeComposition,
    ) -> Self {
        self.composition = composition;
        self
    }
}
