//! Merges historical observations with the current computation into
//! chart-ready series sharing one label domain.
//!
//! The domain is every distinct gross income seen, sorted numerically. The
//! historical line is sparse over that domain. The current computation is a
//! single point with two tax figures, so each figure is drawn as a flat
//! reference line across the whole domain rather than interpolated.
//!
//! When several historical points share a gross income the chronologically
//! latest one wins; equal timestamps fall back to comparing the recorded
//! values, so the output never depends on input order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::ensure_non_negative;
use crate::{
    ChartSeries, HistoricalPoint, Regime, RegimeBreakdown, Series, SeriesKind,
    TaxComputationResult, TaxEngineError,
};

/// Stateless reconciler for the comparison chart.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesReconciler;

impl SeriesReconciler {
    /// Aligns `historical` and `current` onto one sorted gross-income domain.
    ///
    /// An empty `historical` slice is not an error; it produces a one-label
    /// domain holding the current gross income.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::InvalidInput`] if any gross income, taxable
    /// income or tax figure is negative.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use rust_decimal_macros::dec;
    /// use regime_core::calculations::SeriesReconciler;
    /// use regime_core::{HistoricalPoint, Regime, SeriesKind, TaxComputationResult};
    ///
    /// let current = TaxComputationResult {
    ///     gross_income: dec!(1000000),
    ///     total_deductions: dec!(0),
    ///     taxable_income_old: dec!(1000000),
    ///     taxable_income_new: dec!(1000000),
    ///     tax_old: dec!(112500),
    ///     tax_new: dec!(60000),
    ///     efficient_regime: Regime::New,
    ///     savings_percent: dec!(46.67),
    ///     deduction_efficiency_percent: dec!(0),
    ///     suggested_form: "ITR-1".to_string(),
    ///     balance_old: None,
    ///     balance_new: None,
    /// };
    /// let history = vec![HistoricalPoint {
    ///     gross_income: dec!(800000),
    ///     taxable_income: dec!(800000),
    ///     total_tax: dec!(35000),
    ///     timestamp: Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
    /// }];
    ///
    /// let chart = SeriesReconciler::reconcile(&history, &current).unwrap();
    ///
    /// assert_eq!(chart.labels, vec![dec!(800000), dec!(1000000)]);
    /// assert_eq!(chart.value_at(SeriesKind::HistoricalTax, dec!(1000000)), None);
    /// assert_eq!(
    ///     chart.value_at(SeriesKind::UserNewRegimeTax, dec!(800000)),
    ///     Some(dec!(60000))
    /// );
    /// ```
    pub fn reconcile(
        historical: &[HistoricalPoint],
        current: &TaxComputationResult,
    ) -> Result<ChartSeries, TaxEngineError> {
        Self::validate(historical, current)?;

        let historical_tax = Self::historical_lookup(historical);

        let mut domain: BTreeSet<Decimal> = historical_tax.keys().copied().collect();
        domain.insert(current.gross_income.normalize());
        let labels: Vec<Decimal> = domain.into_iter().collect();

        let historical_values = labels
            .iter()
            .map(|gross| historical_tax.get(gross).copied())
            .collect();
        let constant = |tax: Decimal| vec![Some(tax); labels.len()];

        let series = vec![
            Series {
                kind: SeriesKind::HistoricalTax,
                values: historical_values,
            },
            Series {
                kind: SeriesKind::UserOldRegimeTax,
                values: constant(current.tax_old),
            },
            Series {
                kind: SeriesKind::UserNewRegimeTax,
                values: constant(current.tax_new),
            },
        ];

        debug!(
            historical_points = historical.len(),
            labels = labels.len(),
            "reconciled comparison series"
        );

        Ok(ChartSeries { labels, series })
    }

    /// Bar and slice figures summarising one computation.
    ///
    /// The tax-paid slice is the efficient regime's tax.
    pub fn breakdown(result: &TaxComputationResult) -> RegimeBreakdown {
        RegimeBreakdown {
            bars: Regime::ALL
                .iter()
                .map(|&regime| (regime, result.tax_for(regime)))
                .collect(),
            tax_paid: result.tax_for(result.efficient_regime),
            savings: result.savings_amount(),
            deductions_used: result.total_deductions,
        }
    }

    fn validate(
        historical: &[HistoricalPoint],
        current: &TaxComputationResult,
    ) -> Result<(), TaxEngineError> {
        ensure_non_negative("gross_income", current.gross_income)?;
        ensure_non_negative("tax_old", current.tax_old)?;
        ensure_non_negative("tax_new", current.tax_new)?;
        for point in historical {
            ensure_non_negative("historical_gross_income", point.gross_income)?;
            ensure_non_negative("historical_taxable_income", point.taxable_income)?;
            ensure_non_negative("historical_total_tax", point.total_tax)?;
        }
        Ok(())
    }

    /// Gross income → total tax, latest observation winning per key.
    ///
    /// Keys and values are normalized so `1000.0` and `1000.00` share one
    /// label and equal taxes serialize identically whichever point wins.
    fn historical_lookup(historical: &[HistoricalPoint]) -> BTreeMap<Decimal, Decimal> {
        let mut ordered: Vec<&HistoricalPoint> = historical.iter().collect();
        ordered.sort_by(|a, b| chronological(a, b));

        ordered
            .into_iter()
            .map(|point| (point.gross_income.normalize(), point.total_tax.normalize()))
            .collect()
    }
}

fn chronological(
    a: &HistoricalPoint,
    b: &HistoricalPoint,
) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.total_tax.cmp(&b.total_tax))
        .then_with(|| a.taxable_income.cmp(&b.taxable_income))
}
