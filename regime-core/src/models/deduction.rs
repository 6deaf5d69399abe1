use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One claimed deduction, before any cap is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLineItem {
    pub category: String,
    pub amount: Decimal,
}

impl DeductionLineItem {
    pub fn new(
        category: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            category: category.into(),
            amount,
        }
    }
}

/// Maximum amount each deduction category may reduce taxable income by.
///
/// Categories without an entry are uncapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapsTable {
    caps: BTreeMap<String, Decimal>,
}

impl CapsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cap for `category`, returning the previous cap if one existed.
    pub fn insert(
        &mut self,
        category: impl Into<String>,
        cap: Decimal,
    ) -> Option<Decimal> {
        self.caps.insert(category.into(), cap)
    }

    pub fn cap_for(
        &self,
        category: &str,
    ) -> Option<Decimal> {
        self.caps.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.caps.iter().map(|(category, cap)| (category.as_str(), *cap))
    }

    pub fn len(&self) -> usize {
        self.caps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Decimal)> for CapsTable {
    fn from_iter<I: IntoIterator<Item = (K, Decimal)>>(iter: I) -> Self {
        Self {
            caps: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Outcome of aggregating deduction line items against a caps table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionSummary {
    /// Sum of capped amounts, never more than gross income.
    pub total_deductions: Decimal,

    /// Amount allowed per category after its cap, keyed by category.
    pub per_category_applied: BTreeMap<String, Decimal>,

    /// `gross_income - total_deductions`, floored at zero.
    pub taxable_income: Decimal,

    /// Whether the capped sum exceeded gross income and was cut back.
    pub clamped_to_gross: bool,
}
