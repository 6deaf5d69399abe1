//! Tax calculation modules for the regime comparison engine.
//!
//! Leaf-first: bracket tax, deduction aggregation, the regime comparison that
//! combines them, and the reconciler that turns results into chart series.

pub mod bracket;
pub mod common;
pub mod comparison;
pub mod deductions;
pub mod series;

pub use bracket::BracketTaxCalculator;
pub use comparison::RegimeComparator;
pub use deductions::DeductionAggregator;
pub use series::SeriesReconciler;
