use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DeductionSummary, IncomeProfile, Regime};

/// Everything the regime comparison needs besides configuration.
///
/// The two taxable bases are labelled separately because the regimes need not
/// share one: a schedule that disallows most deductions is typically applied
/// to a different base than one that allows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub profile: IncomeProfile,
    pub total_deductions: Decimal,
    pub taxable_income_old: Decimal,
    pub taxable_income_new: Decimal,

    /// Tax already withheld or prepaid, if known.
    #[serde(default)]
    pub taxes_paid: Option<Decimal>,
}

impl ComparisonInput {
    /// Builds an input whose old-regime base comes from an aggregated
    /// deduction summary.
    pub fn from_summary(
        profile: IncomeProfile,
        summary: &DeductionSummary,
        taxable_income_new: Decimal,
    ) -> Self {
        Self {
            profile,
            total_deductions: summary.total_deductions,
            taxable_income_old: summary.taxable_income,
            taxable_income_new,
            taxes_paid: None,
        }
    }

    pub fn with_taxes_paid(
        mut self,
        taxes_paid: Decimal,
    ) -> Self {
        self.taxes_paid = Some(taxes_paid);
        self
    }
}

/// Net position after comparing a regime's tax with what was already paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum TaxBalance {
    Payable(Decimal),
    Refund(Decimal),
    Settled,
}

impl TaxBalance {
    pub fn from_tax_and_paid(
        tax: Decimal,
        paid: Decimal,
    ) -> Self {
        let difference = tax - paid;
        if difference > Decimal::ZERO {
            Self::Payable(difference)
        } else if difference < Decimal::ZERO {
            Self::Refund(-difference)
        } else {
            Self::Settled
        }
    }
}

/// Outcome of running both regimes for one taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputationResult {
    pub gross_income: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income_old: Decimal,
    pub taxable_income_new: Decimal,
    pub tax_old: Decimal,
    pub tax_new: Decimal,

    /// Regime with the strictly lower tax; `New` on a tie.
    pub efficient_regime: Regime,

    /// Share of the higher tax saved by choosing the efficient regime.
    pub savings_percent: Decimal,

    /// Deductions as a share of gross income, capped at 100.
    pub deduction_efficiency_percent: Decimal,

    pub suggested_form: String,

    pub balance_old: Option<TaxBalance>,
    pub balance_new: Option<TaxBalance>,
}

impl TaxComputationResult {
    pub fn tax_for(
        &self,
        regime: Regime,
    ) -> Decimal {
        match regime {
            Regime::Old => self.tax_old,
            Regime::New => self.tax_new,
        }
    }

    pub fn taxable_income_for(
        &self,
        regime: Regime,
    ) -> Decimal {
        match regime {
            Regime::Old => self.taxable_income_old,
            Regime::New => self.taxable_income_new,
        }
    }

    /// Absolute difference between the two regimes' tax.
    pub fn savings_amount(&self) -> Decimal {
        (self.tax_old - self.tax_new).abs()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn balance_payable_when_tax_exceeds_paid() {
        assert_eq!(
            TaxBalance::from_tax_and_paid(dec!(60000), dec!(45000)),
            TaxBalance::Payable(dec!(15000))
        );
    }

    #[test]
    fn balance_refund_when_paid_exceeds_tax() {
        assert_eq!(
            TaxBalance::from_tax_and_paid(dec!(60000), dec!(72000)),
            TaxBalance::Refund(dec!(12000))
        );
    }

    #[test]
    fn balance_settled_when_equal() {
        assert_eq!(
            TaxBalance::from_tax_and_paid(dec!(60000), dec!(60000)),
            TaxBalance::Settled
        );
    }

    #[test]
    fn from_summary_uses_deducted_base_for_old_regime() {
        let summary = DeductionSummary {
            total_deductions: dec!(150000),
            per_category_applied: Default::default(),
            taxable_income: dec!(850000),
            clamped_to_gross: false,
        };

        let input = ComparisonInput::from_summary(
            IncomeProfile::new(dec!(1000000)),
            &summary,
            dec!(925000),
        );

        assert_eq!(input.total_deductions, dec!(150000));
        assert_eq!(input.taxable_income_old, dec!(850000));
        assert_eq!(input.taxable_income_new, dec!(925000));
        assert_eq!(input.taxes_paid, None);
    }
}
