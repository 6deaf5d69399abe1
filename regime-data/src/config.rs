use std::collections::BTreeSet;

use regime_core::calculations::{DeductionAggregator, RegimeComparator};
use regime_core::{BracketTable, CapsTable, FilingRule, FilingRules, Regime, TaxBracket};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::ConfigLoaderError;
use crate::loader::{BracketRecord, CapRecord, FilingRuleRecord, parse_predicate, parse_regime};

/// Everything the engine needs for one fiscal year, validated.
///
/// Built once per fiscal year from the parsed CSV rows and handed to the
/// engine as immutable parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalYearConfig {
    pub fiscal_year: String,
    pub brackets_old: BracketTable,
    pub brackets_new: BracketTable,
    pub caps_old: CapsTable,
    pub caps_new: CapsTable,
    pub filing_rules: FilingRules,
}

impl FiscalYearConfig {
    /// Selects `fiscal_year`'s rows and builds the validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoaderError`] if either regime's schedule is missing
    /// or malformed, a regime code or predicate is unrecognised, a cap is
    /// negative or duplicated, or the year has no filing rules.
    pub fn assemble(
        fiscal_year: &str,
        brackets: &[BracketRecord],
        caps: &[CapRecord],
        rules: &[FilingRuleRecord],
    ) -> Result<Self, ConfigLoaderError> {
        let config = Self {
            fiscal_year: fiscal_year.to_string(),
            brackets_old: bracket_table(fiscal_year, Regime::Old, brackets)?,
            brackets_new: bracket_table(fiscal_year, Regime::New, brackets)?,
            caps_old: caps_table(fiscal_year, Regime::Old, caps)?,
            caps_new: caps_table(fiscal_year, Regime::New, caps)?,
            filing_rules: filing_rules(fiscal_year, rules)?,
        };

        info!(
            fiscal_year = %fiscal_year,
            old_brackets = config.brackets_old.len(),
            new_brackets = config.brackets_new.len(),
            filing_rules = config.filing_rules.rules().len(),
            "assembled fiscal year configuration"
        );

        Ok(config)
    }

    pub fn brackets(
        &self,
        regime: Regime,
    ) -> &BracketTable {
        match regime {
            Regime::Old => &self.brackets_old,
            Regime::New => &self.brackets_new,
        }
    }

    pub fn caps(
        &self,
        regime: Regime,
    ) -> &CapsTable {
        match regime {
            Regime::Old => &self.caps_old,
            Regime::New => &self.caps_new,
        }
    }

    pub fn aggregator(
        &self,
        regime: Regime,
    ) -> DeductionAggregator<'_> {
        DeductionAggregator::new(self.caps(regime))
    }

    pub fn comparator(&self) -> RegimeComparator<'_> {
        RegimeComparator::new(&self.brackets_old, &self.brackets_new, &self.filing_rules)
    }
}

/// Distinct fiscal years named in a bracket file, sorted.
pub fn available_fiscal_years(brackets: &[BracketRecord]) -> Vec<String> {
    brackets
        .iter()
        .map(|r| r.fiscal_year.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn bracket_table(
    fiscal_year: &str,
    regime: Regime,
    records: &[BracketRecord],
) -> Result<BracketTable, ConfigLoaderError> {
    let mut brackets = Vec::new();
    for record in records.iter().filter(|r| r.fiscal_year == fiscal_year) {
        if parse_regime(&record.regime)? == regime {
            brackets.push(TaxBracket::new(
                record.min_income,
                record.max_income,
                record.rate,
            ));
        }
    }

    if brackets.is_empty() {
        return Err(ConfigLoaderError::MissingSchedule {
            fiscal_year: fiscal_year.to_string(),
            regime,
        });
    }

    brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
    BracketTable::new(brackets).map_err(|source| ConfigLoaderError::InvalidBracketTable {
        fiscal_year: fiscal_year.to_string(),
        regime,
        source,
    })
}

fn caps_table(
    fiscal_year: &str,
    regime: Regime,
    records: &[CapRecord],
) -> Result<CapsTable, ConfigLoaderError> {
    let mut table = CapsTable::new();
    for record in records.iter().filter(|r| r.fiscal_year == fiscal_year) {
        if parse_regime(&record.regime)? != regime {
            continue;
        }
        if record.cap < Decimal::ZERO {
            return Err(ConfigLoaderError::NegativeCap {
                category: record.category.clone(),
                cap: record.cap.to_string(),
            });
        }
        if table.insert(record.category.clone(), record.cap).is_some() {
            return Err(ConfigLoaderError::DuplicateCap {
                fiscal_year: fiscal_year.to_string(),
                regime,
                category: record.category.clone(),
            });
        }
    }

    debug!(fiscal_year = %fiscal_year, regime = %regime, caps = table.len(), "built caps table");
    Ok(table)
}

fn filing_rules(
    fiscal_year: &str,
    records: &[FilingRuleRecord],
) -> Result<FilingRules, ConfigLoaderError> {
    let mut selected: Vec<&FilingRuleRecord> = records
        .iter()
        .filter(|r| r.fiscal_year == fiscal_year)
        .collect();
    if selected.is_empty() {
        return Err(ConfigLoaderError::NoFilingRules(fiscal_year.to_string()));
    }
    selected.sort_by_key(|r| r.priority);

    let rules = selected
        .into_iter()
        .map(|record| -> Result<FilingRule, ConfigLoaderError> {
            Ok(FilingRule {
                form: record.form.clone(),
                business_income: parse_predicate("business_income", &record.business_income)?,
                presumptive_taxation: parse_predicate(
                    "presumptive_taxation",
                    &record.presumptive_taxation,
                )?,
                special_category_income: parse_predicate(
                    "special_category_income",
                    &record.special_category_income,
                )?,
                max_gross_income: record.max_gross_income,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FilingRules::new(rules))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use regime_core::BracketTableError;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(
        regime: &str,
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> BracketRecord {
        BracketRecord {
            fiscal_year: "2024-25".to_string(),
            regime: regime.to_string(),
            min_income: min,
            max_income: max,
            rate,
        }
    }

    fn cap(
        regime: &str,
        category: &str,
        amount: Decimal,
    ) -> CapRecord {
        CapRecord {
            fiscal_year: "2024-25".to_string(),
            regime: regime.to_string(),
            category: category.to_string(),
            cap: amount,
        }
    }

    fn rule(
        priority: u32,
        form: &str,
        business: &str,
    ) -> FilingRuleRecord {
        FilingRuleRecord {
            fiscal_year: "2024-25".to_string(),
            priority,
            form: form.to_string(),
            business_income: business.to_string(),
            presumptive_taxation: String::new(),
            special_category_income: String::new(),
            max_gross_income: None,
        }
    }

    fn test_brackets() -> Vec<BracketRecord> {
        vec![
            // Deliberately out of order; assembly sorts by lower bound.
            bracket("old", dec!(250000), None, dec!(0.10)),
            bracket("old", dec!(0), Some(dec!(250000)), dec!(0)),
            bracket("new", dec!(0), Some(dec!(300000)), dec!(0)),
            bracket("new", dec!(300000), None, dec!(0.05)),
        ]
    }

    #[test]
    fn assemble_builds_both_schedules() {
        let config =
            FiscalYearConfig::assemble("2024-25", &test_brackets(), &[], &[rule(1, "ITR-1", "")])
                .unwrap();

        assert_eq!(config.brackets(Regime::Old).len(), 2);
        assert_eq!(config.brackets(Regime::Old).brackets()[0].min_income, dec!(0));
        assert_eq!(config.brackets(Regime::New).len(), 2);
    }

    #[test]
    fn assemble_splits_caps_by_regime() {
        let caps = vec![
            cap("old", "retirement_80c", dec!(150000)),
            cap("new", "standard_deduction", dec!(75000)),
        ];

        let config =
            FiscalYearConfig::assemble("2024-25", &test_brackets(), &caps, &[rule(1, "ITR-1", "")])
                .unwrap();

        assert_eq!(config.caps(Regime::Old).cap_for("retirement_80c"), Some(dec!(150000)));
        assert_eq!(config.caps(Regime::Old).cap_for("standard_deduction"), None);
        assert_eq!(config.caps(Regime::New).cap_for("standard_deduction"), Some(dec!(75000)));
    }

    #[test]
    fn assemble_orders_filing_rules_by_priority() {
        let rules = vec![rule(2, "ITR-1", ""), rule(1, "ITR-3", "yes")];

        let config = FiscalYearConfig::assemble("2024-25", &test_brackets(), &[], &rules).unwrap();

        let forms: Vec<_> = config
            .filing_rules
            .rules()
            .iter()
            .map(|r| r.form.as_str())
            .collect();
        assert_eq!(forms, vec!["ITR-3", "ITR-1"]);
        assert_eq!(config.filing_rules.rules()[0].business_income, Some(true));
    }

    #[test]
    fn assemble_reports_missing_year() {
        let result =
            FiscalYearConfig::assemble("2030-31", &test_brackets(), &[], &[rule(1, "ITR-1", "")]);

        assert_eq!(
            result,
            Err(ConfigLoaderError::MissingSchedule {
                fiscal_year: "2030-31".to_string(),
                regime: Regime::Old,
            })
        );
    }

    #[test]
    fn assemble_reports_malformed_schedule() {
        let mut brackets = test_brackets();
        brackets[0].min_income = dec!(260000);

        let result =
            FiscalYearConfig::assemble("2024-25", &brackets, &[], &[rule(1, "ITR-1", "")]);

        assert_eq!(
            result,
            Err(ConfigLoaderError::InvalidBracketTable {
                fiscal_year: "2024-25".to_string(),
                regime: Regime::Old,
                source: BracketTableError::Gap {
                    index: 1,
                    expected: dec!(250000),
                    found: dec!(260000),
                },
            })
        );
    }

    #[test]
    fn assemble_rejects_unknown_regime() {
        let mut brackets = test_brackets();
        brackets.push(bracket("flat", dec!(0), None, dec!(0.1)));

        let result =
            FiscalYearConfig::assemble("2024-25", &brackets, &[], &[rule(1, "ITR-1", "")]);

        assert_eq!(
            result,
            Err(ConfigLoaderError::UnknownRegime("flat".to_string()))
        );
    }

    #[test]
    fn assemble_rejects_duplicate_cap() {
        let caps = vec![
            cap("old", "medical_80d", dec!(25000)),
            cap("old", "medical_80d", dec!(50000)),
        ];

        let result =
            FiscalYearConfig::assemble("2024-25", &test_brackets(), &caps, &[rule(1, "ITR-1", "")]);

        assert!(matches!(result, Err(ConfigLoaderError::DuplicateCap { .. })));
    }

    #[test]
    fn assemble_rejects_negative_cap() {
        let caps = vec![cap("old", "medical_80d", dec!(-1))];

        let result =
            FiscalYearConfig::assemble("2024-25", &test_brackets(), &caps, &[rule(1, "ITR-1", "")]);

        assert!(matches!(result, Err(ConfigLoaderError::NegativeCap { .. })));
    }

    #[test]
    fn assemble_requires_filing_rules() {
        let result = FiscalYearConfig::assemble("2024-25", &test_brackets(), &[], &[]);

        assert_eq!(
            result,
            Err(ConfigLoaderError::NoFilingRules("2024-25".to_string()))
        );
    }

    #[test]
    fn assemble_rejects_invalid_predicate() {
        let result = FiscalYearConfig::assemble(
            "2024-25",
            &test_brackets(),
            &[],
            &[rule(1, "ITR-3", "sometimes")],
        );

        assert!(matches!(
            result,
            Err(ConfigLoaderError::InvalidPredicate {
                column: "business_income",
                ..
            })
        ));
    }

    #[test]
    fn available_fiscal_years_are_distinct_and_sorted() {
        let mut brackets = test_brackets();
        brackets[0].fiscal_year = "2025-26".to_string();

        assert_eq!(
            available_fiscal_years(&brackets),
            vec!["2024-25".to_string(), "2025-26".to_string()]
        );
    }
}
