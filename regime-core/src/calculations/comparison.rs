//! Side-by-side computation of the old and new regimes.
//!
//! # Result Fields
//!
//! | Field                          | Derivation |
//! |--------------------------------|------------|
//! | `tax_old` / `tax_new`          | Bracket tax on each regime's own taxable base |
//! | `efficient_regime`             | Strictly lower tax; `New` on an exact tie |
//! | `savings_percent`              | `(max - min) / max(tax_old, tax_new, 1) × 100` |
//! | `deduction_efficiency_percent` | `min(deductions / max(gross, 1) × 100, 100)` |
//! | `suggested_form`               | First matching row of the filing decision table |
//! | `balance_old` / `balance_new`  | Tax minus taxes paid, when taxes paid is known |
//!
//! Percentages are rounded to two decimal places. Every input is validated
//! before any tax is computed, and a failure yields no partial result.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use regime_core::calculations::RegimeComparator;
//! use regime_core::{
//!     BracketTable, ComparisonInput, FilingRule, FilingRules, IncomeProfile, Regime,
//!     TaxBracket,
//! };
//!
//! let old = BracketTable::new(vec![
//!     TaxBracket::new(dec!(0), Some(dec!(250000)), dec!(0)),
//!     TaxBracket::new(dec!(250000), Some(dec!(500000)), dec!(0.05)),
//!     TaxBracket::new(dec!(500000), Some(dec!(1000000)), dec!(0.20)),
//!     TaxBracket::new(dec!(1000000), None, dec!(0.30)),
//! ])
//! .unwrap();
//! let new = BracketTable::new(vec![
//!     TaxBracket::new(dec!(0), Some(dec!(300000)), dec!(0)),
//!     TaxBracket::new(dec!(300000), Some(dec!(600000)), dec!(0.05)),
//!     TaxBracket::new(dec!(600000), Some(dec!(900000)), dec!(0.10)),
//!     TaxBracket::new(dec!(900000), Some(dec!(1200000)), dec!(0.15)),
//!     TaxBracket::new(dec!(1200000), Some(dec!(1500000)), dec!(0.20)),
//!     TaxBracket::new(dec!(1500000), None, dec!(0.30)),
//! ])
//! .unwrap();
//! let rules = FilingRules::new(vec![FilingRule::catch_all("ITR-1")]);
//!
//! let input = ComparisonInput {
//!     profile: IncomeProfile::new(dec!(1000000)),
//!     total_deductions: dec!(0),
//!     taxable_income_old: dec!(1000000),
//!     taxable_income_new: dec!(1000000),
//!     taxes_paid: None,
//! };
//!
//! let result = RegimeComparator::new(&old, &new, &rules).compare(&input).unwrap();
//!
//! assert_eq!(result.tax_old, dec!(112500));
//! assert_eq!(result.tax_new, dec!(60000));
//! assert_eq!(result.efficient_regime, Regime::New);
//! assert_eq!(result.savings_percent, dec!(46.67));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::BracketTaxCalculator;
use crate::calculations::common::{ensure_non_negative, round_half_up};
use crate::{
    BracketTable, ComparisonInput, FilingRules, Regime, TaxBalance, TaxComputationResult,
    TaxEngineError,
};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Comparator bound to both regimes' schedules and the filing decision table.
#[derive(Debug, Clone, Copy)]
pub struct RegimeComparator<'a> {
    brackets_old: &'a BracketTable,
    brackets_new: &'a BracketTable,
    filing_rules: &'a FilingRules,
}

impl<'a> RegimeComparator<'a> {
    pub fn new(
        brackets_old: &'a BracketTable,
        brackets_new: &'a BracketTable,
        filing_rules: &'a FilingRules,
    ) -> Self {
        Self {
            brackets_old,
            brackets_new,
            filing_rules,
        }
    }

    /// Runs both regimes and derives the comparison metrics.
    ///
    /// # Errors
    ///
    /// - [`TaxEngineError::InvalidInput`] if any amount is negative or total
    ///   deductions exceed gross income
    /// - [`TaxEngineError::NoMatchingFilingRule`] if no filing rule matches
    pub fn compare(
        &self,
        input: &ComparisonInput,
    ) -> Result<TaxComputationResult, TaxEngineError> {
        self.validate(input)?;

        let suggested_form = self
            .filing_rules
            .suggest(&input.profile)
            .ok_or(TaxEngineError::NoMatchingFilingRule)?
            .to_string();

        let tax_old =
            BracketTaxCalculator::new(self.brackets_old).compute(input.taxable_income_old)?;
        let tax_new =
            BracketTaxCalculator::new(self.brackets_new).compute(input.taxable_income_new)?;

        let efficient_regime = self.efficient_regime(tax_old, tax_new);
        let savings_percent = self.savings_percent(tax_old, tax_new);
        let deduction_efficiency_percent =
            self.deduction_efficiency_percent(input.total_deductions, input.profile.gross_income);

        let balance_old = input
            .taxes_paid
            .map(|paid| TaxBalance::from_tax_and_paid(tax_old, paid));
        let balance_new = input
            .taxes_paid
            .map(|paid| TaxBalance::from_tax_and_paid(tax_new, paid));

        debug!(
            tax_old = %tax_old,
            tax_new = %tax_new,
            efficient_regime = %efficient_regime,
            savings_percent = %savings_percent,
            suggested_form = %suggested_form,
            "compared regimes"
        );

        Ok(TaxComputationResult {
            gross_income: input.profile.gross_income,
            total_deductions: input.total_deductions,
            taxable_income_old: input.taxable_income_old,
            taxable_income_new: input.taxable_income_new,
            tax_old,
            tax_new,
            efficient_regime,
            savings_percent,
            deduction_efficiency_percent,
            suggested_form,
            balance_old,
            balance_new,
        })
    }

    /// Checks every numeric field before any arithmetic runs.
    fn validate(
        &self,
        input: &ComparisonInput,
    ) -> Result<(), TaxEngineError> {
        let gross_income = ensure_non_negative("gross_income", input.profile.gross_income)?;
        let total_deductions = ensure_non_negative("total_deductions", input.total_deductions)?;
        ensure_non_negative("taxable_income_old", input.taxable_income_old)?;
        ensure_non_negative("taxable_income_new", input.taxable_income_new)?;
        if let Some(paid) = input.taxes_paid {
            ensure_non_negative("taxes_paid", paid)?;
        }
        if total_deductions > gross_income {
            return Err(TaxEngineError::invalid_input(
                "total_deductions",
                format!("{total_deductions} exceeds gross income {gross_income}"),
            ));
        }
        Ok(())
    }

    /// Lower tax wins; a tie goes to the new regime.
    fn efficient_regime(
        &self,
        tax_old: Decimal,
        tax_new: Decimal,
    ) -> Regime {
        if tax_old < tax_new {
            Regime::Old
        } else {
            Regime::New
        }
    }

    fn savings_percent(
        &self,
        tax_old: Decimal,
        tax_new: Decimal,
    ) -> Decimal {
        let higher = tax_old.max(tax_new);
        let lower = tax_old.min(tax_new);
        let denominator = higher.max(Decimal::ONE);
        round_half_up((higher - lower) / denominator * ONE_HUNDRED)
    }

    fn deduction_efficiency_percent(
        &self,
        total_deductions: Decimal,
        gross_income: Decimal,
    ) -> Decimal {
        let denominator = gross_income.max(Decimal::ONE);
        round_half_up((total_deductions / denominator * ONE_HUNDRED).min(ONE_HUNDRED))
    }
}
