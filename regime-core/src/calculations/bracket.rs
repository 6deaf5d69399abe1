//! Progressive tax on one taxable-income figure against one bracket table.
//!
//! Each bracket taxes only the slice of income that falls inside its own
//! range. The per-bracket amounts are accumulated at full precision and the
//! total is rounded once, to the nearest currency unit.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use regime_core::calculations::BracketTaxCalculator;
//! use regime_core::{BracketTable, TaxBracket};
//!
//! let table = BracketTable::new(vec![
//!     TaxBracket::new(dec!(0), Some(dec!(300000)), dec!(0)),
//!     TaxBracket::new(dec!(300000), Some(dec!(600000)), dec!(0.05)),
//!     TaxBracket::new(dec!(600000), Some(dec!(900000)), dec!(0.10)),
//!     TaxBracket::new(dec!(900000), Some(dec!(1200000)), dec!(0.15)),
//!     TaxBracket::new(dec!(1200000), Some(dec!(1500000)), dec!(0.20)),
//!     TaxBracket::new(dec!(1500000), None, dec!(0.30)),
//! ])
//! .unwrap();
//!
//! let calculator = BracketTaxCalculator::new(&table);
//!
//! // 0 + 5% of 300,000 + 10% of 300,000 + 15% of 100,000
//! assert_eq!(calculator.compute(dec!(1000000)).unwrap(), dec!(60000));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{ensure_non_negative, round_to_currency_unit};
use crate::{BracketTable, TaxEngineError};

/// Calculator bound to one validated bracket table.
#[derive(Debug, Clone, Copy)]
pub struct BracketTaxCalculator<'a> {
    table: &'a BracketTable,
}

impl<'a> BracketTaxCalculator<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self { table }
    }

    /// Computes the tax owed on `taxable_income`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::InvalidInput`] if `taxable_income` is
    /// negative.
    pub fn compute(
        &self,
        taxable_income: Decimal,
    ) -> Result<Decimal, TaxEngineError> {
        let income = ensure_non_negative("taxable_income", taxable_income)?;

        let mut tax = Decimal::ZERO;
        for bracket in self.table {
            if bracket.min_income >= income {
                break;
            }
            let upper = bracket.max_income.map_or(income, |max| max.min(income));
            tax += (upper - bracket.min_income) * bracket.tax_rate;
        }

        let tax = round_to_currency_unit(tax);
        debug!(taxable_income = %income, tax = %tax, "computed bracket tax");
        Ok(tax)
    }

    /// The marginal rate applying to the last unit of `taxable_income`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::InvalidInput`] if `taxable_income` is
    /// negative.
    pub fn marginal_rate(
        &self,
        taxable_income: Decimal,
    ) -> Result<Decimal, TaxEngineError> {
        let income = ensure_non_negative("taxable_income", taxable_income)?;
        self.table
            .bracket_for(income)
            .map(|bracket| bracket.tax_rate)
            .ok_or_else(|| TaxEngineError::invalid_input("taxable_income", income))
    }
}
