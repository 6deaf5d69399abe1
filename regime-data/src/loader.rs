use std::io::Read;

use regime_core::Regime;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::ConfigLoaderError;

/// A single row of the bracket schedule CSV file.
///
/// - `fiscal_year`: The fiscal year label (e.g., 2024-25)
/// - `regime`: `old` or `new`
/// - `min_income`: The lower bound of this bracket
/// - `max_income`: The upper bound (empty for the open-ended top bracket)
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.05 for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub fiscal_year: String,
    pub regime: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// A single row of the deduction caps CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CapRecord {
    pub fiscal_year: String,
    pub regime: String,
    pub category: String,
    pub cap: Decimal,
}

/// A single row of the filing rules CSV file.
///
/// Predicate columns hold `yes`, `no`, or nothing (don't care); they are
/// interpreted when the configuration is assembled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FilingRuleRecord {
    pub fiscal_year: String,
    pub priority: u32,
    pub form: String,
    #[serde(default)]
    pub business_income: String,
    #[serde(default)]
    pub presumptive_taxation: String,
    #[serde(default)]
    pub special_category_income: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_gross_income: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Parses a regime code column.
pub fn parse_regime(code: &str) -> Result<Regime, ConfigLoaderError> {
    Regime::parse(code).ok_or_else(|| ConfigLoaderError::UnknownRegime(code.to_string()))
}

/// Parses a tri-state predicate column.
pub fn parse_predicate(
    column: &'static str,
    value: &str,
) -> Result<Option<bool>, ConfigLoaderError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "*" | "any" => Ok(None),
        "yes" | "y" | "true" => Ok(Some(true)),
        "no" | "n" | "false" => Ok(Some(false)),
        _ => Err(ConfigLoaderError::InvalidPredicate {
            column,
            value: value.to_string(),
        }),
    }
}

/// Loader for the configuration CSV files.
///
/// Each `parse_*` method accepts any reader, such as a file or a byte slice,
/// and returns every row; selecting a fiscal year happens in
/// [`crate::FiscalYearConfig::assemble`].
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, ConfigLoaderError> {
        Self::parse(reader)
    }

    pub fn parse_caps<R: Read>(reader: R) -> Result<Vec<CapRecord>, ConfigLoaderError> {
        Self::parse(reader)
    }

    pub fn parse_filing_rules<R: Read>(
        reader: R
    ) -> Result<Vec<FilingRuleRecord>, ConfigLoaderError> {
        Self::parse(reader)
    }

    fn parse<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, ConfigLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T = result?;
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_BRACKETS: &str = r#"fiscal_year,regime,min_income,max_income,rate
2024-25,new,0,300000,0
2024-25,new,300000,600000,0.05
2024-25,new,600000,,0.10
"#;

    const TEST_CAPS: &str = r#"fiscal_year,regime,category,cap
2024-25,old,retirement_80c,150000
2024-25,old,medical_80d,25000
"#;

    const TEST_RULES: &str = r#"fiscal_year,priority,form,business_income,presumptive_taxation,special_category_income,max_gross_income
2024-25,1,ITR-3,yes,,,
2024-25,2,ITR-1,no,no,no,5000000
"#;

    // =========================================================================
    // parse_brackets tests
    // =========================================================================

    #[test]
    fn parse_brackets_reads_all_rows() {
        let records = ConfigLoader::parse_brackets(TEST_BRACKETS.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            BracketRecord {
                fiscal_year: "2024-25".to_string(),
                regime: "new".to_string(),
                min_income: dec!(300000),
                max_income: Some(dec!(600000)),
                rate: dec!(0.05),
            }
        );
    }

    #[test]
    fn parse_brackets_treats_empty_max_income_as_open_ended() {
        let records = ConfigLoader::parse_brackets(TEST_BRACKETS.as_bytes()).unwrap();

        assert_eq!(records[2].max_income, None);
    }

    #[test]
    fn parse_brackets_rejects_malformed_decimal() {
        let csv = "fiscal_year,regime,min_income,max_income,rate\n2024-25,new,zero,100,0\n";

        let result = ConfigLoader::parse_brackets(csv.as_bytes());

        assert!(matches!(result, Err(ConfigLoaderError::CsvParse(_))));
    }

    #[test]
    fn parse_brackets_rejects_missing_columns() {
        let csv = "fiscal_year,regime,min_income\n2024-25,new,0\n";

        let result = ConfigLoader::parse_brackets(csv.as_bytes());

        assert!(matches!(result, Err(ConfigLoaderError::CsvParse(_))));
    }

    // =========================================================================
    // parse_caps / parse_filing_rules tests
    // =========================================================================

    #[test]
    fn parse_caps_reads_categories() {
        let records = ConfigLoader::parse_caps(TEST_CAPS.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "retirement_80c");
        assert_eq!(records[0].cap, dec!(150000));
    }

    #[test]
    fn parse_filing_rules_keeps_blank_predicates() {
        let records = ConfigLoader::parse_filing_rules(TEST_RULES.as_bytes()).unwrap();

        assert_eq!(records[0].business_income, "yes");
        assert_eq!(records[0].presumptive_taxation, "");
        assert_eq!(records[0].max_gross_income, None);
        assert_eq!(records[1].max_gross_income, Some(dec!(5000000)));
    }

    // =========================================================================
    // column parser tests
    // =========================================================================

    #[test]
    fn parse_regime_accepts_known_codes() {
        assert_eq!(parse_regime("old"), Ok(Regime::Old));
        assert_eq!(parse_regime("NEW"), Ok(Regime::New));
    }

    #[test]
    fn parse_regime_rejects_unknown_code() {
        assert_eq!(
            parse_regime("flat"),
            Err(ConfigLoaderError::UnknownRegime("flat".to_string()))
        );
    }

    #[test]
    fn parse_predicate_is_tri_state() {
        assert_eq!(parse_predicate("business_income", ""), Ok(None));
        assert_eq!(parse_predicate("business_income", "Yes"), Ok(Some(true)));
        assert_eq!(parse_predicate("business_income", "no"), Ok(Some(false)));
    }

    #[test]
    fn parse_predicate_rejects_other_values() {
        assert_eq!(
            parse_predicate("business_income", "maybe"),
            Err(ConfigLoaderError::InvalidPredicate {
                column: "business_income",
                value: "maybe".to_string(),
            })
        );
    }
}
