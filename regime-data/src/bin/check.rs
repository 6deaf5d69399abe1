use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use regime_core::Regime;
use regime_data::{ConfigLoader, FiscalYearConfig, available_fiscal_years};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Validate fiscal-year configuration files for the regime comparison engine.
///
/// Each file is a CSV with a `fiscal_year` column:
/// - brackets: fiscal_year, regime, min_income, max_income, rate
/// - caps: fiscal_year, regime, category, cap
/// - filing rules: fiscal_year, priority, form, business_income,
///   presumptive_taxation, special_category_income, max_gross_income
#[derive(Parser, Debug)]
#[command(name = "regime-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the bracket schedule CSV file
    #[arg(short, long)]
    brackets: PathBuf,

    /// Path to the deduction caps CSV file
    #[arg(short, long)]
    caps: PathBuf,

    /// Path to the filing rules CSV file
    #[arg(short, long)]
    rules: PathBuf,

    /// Fiscal year to check (e.g. 2024-25); every year in the bracket file
    /// is checked when omitted
    #[arg(short, long)]
    fiscal_year: Option<String>,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open: {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let brackets = ConfigLoader::parse_brackets(open(&args.brackets)?)
        .with_context(|| format!("Failed to parse CSV: {}", args.brackets.display()))?;
    let caps = ConfigLoader::parse_caps(open(&args.caps)?)
        .with_context(|| format!("Failed to parse CSV: {}", args.caps.display()))?;
    let rules = ConfigLoader::parse_filing_rules(open(&args.rules)?)
        .with_context(|| format!("Failed to parse CSV: {}", args.rules.display()))?;

    info!(
        brackets = brackets.len(),
        caps = caps.len(),
        rules = rules.len(),
        "parsed configuration files"
    );

    let years = match args.fiscal_year {
        Some(year) => vec![year],
        None => available_fiscal_years(&brackets),
    };

    for year in &years {
        let config = FiscalYearConfig::assemble(year, &brackets, &caps, &rules)
            .with_context(|| format!("Invalid configuration for fiscal year {year}"))?;

        println!("Fiscal year {}:", config.fiscal_year);
        for regime in Regime::ALL {
            println!(
                "  {}: {} brackets, {} capped deduction categories",
                regime,
                config.brackets(regime).len(),
                config.caps(regime).len()
            );
        }
        println!("  Filing rules: {}", config.filing_rules.rules().len());
    }

    println!("Checked {} fiscal year(s); configuration is valid.", years.len());

    Ok(())
}
