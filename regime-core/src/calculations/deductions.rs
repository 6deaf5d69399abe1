//! Deduction aggregation with per-category caps.
//!
//! Line items are grouped by category, each category is clamped to its cap,
//! and the capped total is clamped to gross income so taxable income never
//! goes negative.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::ensure_non_negative;
use crate::{CapsTable, DeductionLineItem, DeductionSummary, TaxEngineError};

/// Aggregator bound to one caps table.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use regime_core::calculations::DeductionAggregator;
/// use regime_core::{CapsTable, DeductionLineItem};
///
/// let caps: CapsTable = [("retirement", dec!(150000))].into_iter().collect();
/// let items = vec![
///     DeductionLineItem::new("retirement", dec!(200000)),
///     DeductionLineItem::new("medical", dec!(12000)),
/// ];
///
/// let summary = DeductionAggregator::new(&caps)
///     .aggregate(&items, dec!(1000000))
///     .unwrap();
///
/// assert_eq!(summary.total_deductions, dec!(162000));
/// assert_eq!(summary.taxable_income, dec!(838000));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DeductionAggregator<'a> {
    caps: &'a CapsTable,
}

impl<'a> DeductionAggregator<'a> {
    pub fn new(caps: &'a CapsTable) -> Self {
        Self { caps }
    }

    /// Sums, caps and clamps `line_items` against `gross_income`.
    ///
    /// `per_category_applied` holds each category's amount after its cap but
    /// before the gross-income clamp.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::InvalidInput`] if `gross_income`, any line
    /// item amount or any configured cap is negative, or if the amounts sum
    /// past [`Decimal::MAX`].
    pub fn aggregate(
        &self,
        line_items: &[DeductionLineItem],
        gross_income: Decimal,
    ) -> Result<DeductionSummary, TaxEngineError> {
        let gross_income = ensure_non_negative("gross_income", gross_income)?;
        for (_, cap) in self.caps.iter() {
            ensure_non_negative("deduction_cap", cap)?;
        }

        let claimed = self.claimed_by_category(line_items)?;
        let per_category_applied = self.apply_caps(claimed);

        let capped_total = per_category_applied
            .values()
            .try_fold(Decimal::ZERO, |total, &amount| checked_sum(total, amount))?;
        let clamped_to_gross = capped_total > gross_income;
        let total_deductions = if clamped_to_gross {
            warn!(
                capped_total = %capped_total,
                gross_income = %gross_income,
                "Deductions exceed gross income; clamping to gross income"
            );
            gross_income
        } else {
            capped_total
        };

        let taxable_income = (gross_income - total_deductions).max(Decimal::ZERO);
        debug!(
            total_deductions = %total_deductions,
            taxable_income = %taxable_income,
            "aggregated deductions"
        );

        Ok(DeductionSummary {
            total_deductions,
            per_category_applied,
            taxable_income,
            clamped_to_gross,
        })
    }

    /// Sums line items per category after validating each amount.
    fn claimed_by_category(
        &self,
        line_items: &[DeductionLineItem],
    ) -> Result<BTreeMap<String, Decimal>, TaxEngineError> {
        let mut claimed = BTreeMap::new();
        for item in line_items {
            let amount = ensure_non_negative("deduction_amount", item.amount)?;
            let total = claimed
                .entry(item.category.clone())
                .or_insert(Decimal::ZERO);
            *total = checked_sum(*total, amount)?;
        }
        Ok(claimed)
    }

    /// Clamps each category's claimed total to its cap, if it has one.
    fn apply_caps(
        &self,
        claimed: BTreeMap<String, Decimal>,
    ) -> BTreeMap<String, Decimal> {
        claimed
            .into_iter()
            .map(|(category, amount)| {
                let applied = match self.caps.cap_for(&category) {
                    Some(cap) if amount > cap => {
                        warn!(
                            category = %category,
                            claimed = %amount,
                            cap = %cap,
                            "Deduction exceeds category cap; clamping to cap"
                        );
                        cap
                    }
                    _ => amount,
                };
                (category, applied)
            })
            .collect()
    }
}

fn checked_sum(
    total: Decimal,
    amount: Decimal,
) -> Result<Decimal, TaxEngineError> {
    total
        .checked_add(amount)
        .ok_or_else(|| TaxEngineError::invalid_input("deduction_amount", amount))
}
