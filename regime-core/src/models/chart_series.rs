use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Regime;

/// Named lines drawn on the comparison chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    HistoricalTax,
    UserOldRegimeTax,
    UserNewRegimeTax,
}

impl SeriesKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HistoricalTax => "Historical Tax",
            Self::UserOldRegimeTax => "Your Tax (Old Regime)",
            Self::UserNewRegimeTax => "Your Tax (New Regime)",
        }
    }
}

/// One line's y-values, index-aligned with [`ChartSeries::labels`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub kind: SeriesKind,
    pub values: Vec<Option<Decimal>>,
}

/// Label domain plus per-line values sharing it.
///
/// `labels` is sorted ascending by numeric value and every
/// `series[i].values` has the same length as `labels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<Decimal>,
    pub series: Vec<Series>,
}

impl ChartSeries {
    pub fn series(
        &self,
        kind: SeriesKind,
    ) -> Option<&Series> {
        self.series.iter().find(|s| s.kind == kind)
    }

    /// `(x, y)` pairs for one line, `None` where the line has no point.
    pub fn points(
        &self,
        kind: SeriesKind,
    ) -> impl Iterator<Item = (Decimal, Option<Decimal>)> + '_ {
        let values = self.series(kind).map(|s| s.values.as_slice()).unwrap_or(&[]);
        self.labels.iter().copied().zip(values.iter().copied())
    }

    pub fn value_at(
        &self,
        kind: SeriesKind,
        label: Decimal,
    ) -> Option<Decimal> {
        let index = self.labels.binary_search(&label).ok()?;
        self.series(kind)?.values.get(index).copied().flatten()
    }
}

/// Summary figures for the side-by-side regime bar chart and the
/// breakdown pie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeBreakdown {
    pub bars: Vec<(Regime, Decimal)>,
    pub tax_paid: Decimal,
    pub savings: Decimal,
    pub deductions_used: Decimal,
}
