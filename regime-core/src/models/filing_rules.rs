use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::IncomeProfile;

/// One row of the filing-form decision table.
///
/// Each predicate is tri-state: `Some(true)` requires the fact to hold,
/// `Some(false)` requires it to be absent, `None` ignores it.
/// `max_gross_income` is an inclusive ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRule {
    pub form: String,
    #[serde(default)]
    pub business_income: Option<bool>,
    #[serde(default)]
    pub presumptive_taxation: Option<bool>,
    #[serde(default)]
    pub special_category_income: Option<bool>,
    #[serde(default)]
    pub max_gross_income: Option<Decimal>,
}

impl FilingRule {
    /// A rule that matches every profile.
    pub fn catch_all(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            business_income: None,
            presumptive_taxation: None,
            special_category_income: None,
            max_gross_income: None,
        }
    }

    pub fn matches(
        &self,
        profile: &IncomeProfile,
    ) -> bool {
        let composition = &profile.composition;
        predicate_holds(self.business_income, composition.has_business_income)
            && predicate_holds(self.presumptive_taxation, composition.presumptive_taxation)
            && predicate_holds(
                self.special_category_income,
                composition.has_special_category_income,
            )
            && self
                .max_gross_income
                .is_none_or(|ceiling| profile.gross_income <= ceiling)
    }
}

fn predicate_holds(
    expected: Option<bool>,
    actual: bool,
) -> bool {
    expected.is_none_or(|expected| expected == actual)
}

/// Ordered decision table; the first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilingRules {
    rules: Vec<FilingRule>,
}

impl FilingRules {
    pub fn new(rules: Vec<FilingRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FilingRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The form of the first rule matching `profile`, if any.
    pub fn suggest(
        &self,
        profile: &IncomeProfile,
    ) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(profile))
            .map(|rule| rule.form.as_str())
    }
}
