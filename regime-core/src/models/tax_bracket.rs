use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contiguous income sub-range taxed at one marginal rate.
///
/// `max_income` of `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Whether `income` falls in `[min_income, max_income)`.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.min_income && self.max_income.is_none_or(|max| income < max)
    }
}

/// Structural defects that make a bracket table unusable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("lowest bracket must start at 0, got {0}")]
    NonZeroStart(Decimal),

    #[error("bracket {index} has rate {rate}; rates must be between 0 and 1")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("bracket {index} has an upper bound that does not exceed its lower bound")]
    EmptyRange { index: usize },

    #[error("gap before bracket {index}: expected lower bound {expected}, got {found}")]
    Gap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} overlaps its predecessor: expected lower bound {expected}, got {found}")]
    Overlap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} has a lower rate than the bracket below it")]
    DecreasingRate { index: usize },

    #[error("bracket {index} is open-ended but is not the last bracket")]
    OpenEndedNotLast { index: usize },

    #[error("last bracket must be open-ended")]
    MissingOpenEnded,
}

/// An ordered, validated progressive rate schedule covering `[0, ∞)`.
///
/// The only way to obtain a table is through [`BracketTable::new`] (or
/// deserialization, which runs the same checks), so calculators never see a
/// malformed schedule.
///
/// ```
/// use rust_decimal_macros::dec;
/// use regime_core::{BracketTable, TaxBracket};
///
/// let table = BracketTable::new(vec![
///     TaxBracket::new(dec!(0), Some(dec!(300000)), dec!(0)),
///     TaxBracket::new(dec!(300000), None, dec!(0.05)),
/// ])
/// .unwrap();
///
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates and wraps an ascending list of brackets.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] if the list is empty, does not start at
    /// zero, has gaps or overlaps, has a rate outside `[0, 1]`, has a rate
    /// lower than the bracket beneath it, or does not end with exactly one
    /// open-ended bracket.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        let first = brackets.first().ok_or(BracketTableError::Empty)?;
        if first.min_income != Decimal::ZERO {
            return Err(BracketTableError::NonZeroStart(first.min_income));
        }

        let last_index = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
                return Err(BracketTableError::InvalidRate {
                    index,
                    rate: bracket.tax_rate,
                });
            }
            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(BracketTableError::EmptyRange { index });
                }
                None if index != last_index => {
                    return Err(BracketTableError::OpenEndedNotLast { index });
                }
                _ => {}
            }
        }

        for (index, pair) in brackets.windows(2).enumerate() {
            let (below, above) = (&pair[0], &pair[1]);
            let index = index + 1;
            // `below` is bounded here; only the last bracket may be open-ended.
            let expected = below.max_income.unwrap_or(Decimal::MAX);
            if above.min_income > expected {
                return Err(BracketTableError::Gap {
                    index,
                    expected,
                    found: above.min_income,
                });
            }
            if above.min_income < expected {
                return Err(BracketTableError::Overlap {
                    index,
                    expected,
                    found: above.min_income,
                });
            }
            if above.tax_rate < below.tax_rate {
                return Err(BracketTableError::DecreasingRate { index });
            }
        }

        if brackets[last_index].max_income.is_some() {
            return Err(BracketTableError::MissingOpenEnded);
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaxBracket> {
        self.brackets.iter()
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    /// Always `false`; a validated table holds at least one bracket.
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// The bracket whose range contains `income`.
    ///
    /// Negative incomes fall below every bracket and yield `None`.
    pub fn bracket_for(
        &self,
        income: Decimal,
    ) -> Option<&TaxBracket> {
        self.brackets.iter().find(|b| b.contains(income))
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

impl<'a> IntoIterator for &'a BracketTable {
    type Item = &'a TaxBracket;
    type IntoIter = std::slice::Iter<'a, TaxBracket>;

    fn into_iter(self) -> Self::IntoIter {
        self.brackets.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn two_slab() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(250000)), dec!(0)),
            TaxBracket::new(dec!(250000), Some(dec!(500000)), dec!(0.05)),
            TaxBracket::new(dec!(500000), None, dec!(0.20)),
        ]
    }

    // =========================================================================
    // BracketTable::new tests
    // =========================================================================

    #[test]
    fn new_accepts_contiguous_progressive_table() {
        let table = BracketTable::new(two_slab()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.brackets()[2].max_income, None);
    }

    #[test]
    fn new_accepts_single_open_ended_bracket() {
        let table = BracketTable::new(vec![TaxBracket::new(dec!(0), None, dec!(0.10))]);

        assert!(table.is_ok());
    }

    #[test]
    fn new_rejects_empty_table() {
        assert_eq!(BracketTable::new(vec![]), Err(BracketTableError::Empty));
    }

    #[test]
    fn new_rejects_table_not_starting_at_zero() {
        let mut brackets = two_slab();
        brackets[0].min_income = dec!(1000);

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::NonZeroStart(dec!(1000)))
        );
    }

    #[test]
    fn new_rejects_gap_between_brackets() {
        let mut brackets = two_slab();
        brackets[1].min_income = dec!(260000);

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::Gap {
                index: 1,
                expected: dec!(250000),
                found: dec!(260000),
            })
        );
    }

    #[test]
    fn new_rejects_overlapping_brackets() {
        let mut brackets = two_slab();
        brackets[2].min_income = dec!(450000);

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::Overlap {
                index: 2,
                expected: dec!(500000),
                found: dec!(450000),
            })
        );
    }

    #[test]
    fn new_rejects_decreasing_rates() {
        let mut brackets = two_slab();
        brackets[2].tax_rate = dec!(0.01);

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::DecreasingRate { index: 2 })
        );
    }

    #[test]
    fn new_rejects_rate_above_one() {
        let mut brackets = two_slab();
        brackets[2].tax_rate = dec!(1.5);

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::InvalidRate {
                index: 2,
                rate: dec!(1.5),
            })
        );
    }

    #[test]
    fn new_rejects_negative_rate() {
        let mut brackets = two_slab();
        brackets[0].tax_rate = dec!(-0.05);

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::InvalidRate {
                index: 0,
                rate: dec!(-0.05),
            })
        );
    }

    #[test]
    fn new_rejects_inverted_range() {
        let mut brackets = two_slab();
        brackets[1].max_income = Some(dec!(250000));

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::EmptyRange { index: 1 })
        );
    }

    #[test]
    fn new_rejects_open_ended_bracket_in_the_middle() {
        let mut brackets = two_slab();
        brackets[1].max_income = None;

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::OpenEndedNotLast { index: 1 })
        );
    }

    #[test]
    fn new_rejects_bounded_last_bracket() {
        let mut brackets = two_slab();
        brackets[2].max_income = Some(dec!(1000000));

        assert_eq!(
            BracketTable::new(brackets),
            Err(BracketTableError::MissingOpenEnded)
        );
    }

    // =========================================================================
    // bracket_for tests
    // =========================================================================

    #[test]
    fn bracket_for_uses_half_open_ranges() {
        let table = BracketTable::new(two_slab()).unwrap();

        assert_eq!(table.bracket_for(dec!(249999.99)).unwrap().tax_rate, dec!(0));
        assert_eq!(table.bracket_for(dec!(250000)).unwrap().tax_rate, dec!(0.05));
        assert_eq!(table.bracket_for(dec!(9000000)).unwrap().tax_rate, dec!(0.20));
    }

    #[test]
    fn bracket_for_negative_income_is_none() {
        let table = BracketTable::new(two_slab()).unwrap();

        assert_eq!(table.bracket_for(dec!(-1)), None);
    }

    // =========================================================================
    // serde tests
    // =========================================================================

    #[test]
    fn deserialize_runs_validation() {
        let json = r#"[
            {"min_income": "0", "max_income": "100", "tax_rate": "0.1"},
            {"min_income": "150", "max_income": null, "tax_rate": "0.2"}
        ]"#;

        let result: Result<BracketTable, _> = serde_json::from_str(json);

        let err = result.unwrap_err().to_string();
        assert!(err.contains("gap before bracket 1"), "unexpected error: {err}");
    }

    #[test]
    fn deserialize_accepts_valid_table() {
        let json = r#"[
            {"min_income": "0", "max_income": "100", "tax_rate": "0.1"},
            {"min_income": "100", "max_income": null, "tax_rate": "0.2"}
        ]"#;

        let table: BracketTable = serde_json::from_str(json).unwrap();

        assert_eq!(table.len(), 2);
    }
}
