//! Characteristic analysis CLI tool.
//!
//! Scores an asset table, allocates across the top-scoring assets and reports
//! diagnostics.
//!
//! Usage: `cargo run --bin analyze --features cli -- ASSETS.csv RETURNS.csv --benchmark SPY`
//!
//! The returns file is wide: a date column plus one column of daily returns per
//! ticker, including the benchmark (and the new factor, if any).

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use clap::Parser;
use meridian::{
    pipeline::{AnalysisPipeline, PipelineConfig, PipelineInput, PipelineReport},
    primitives::{ReturnSeries, Symbol},
    utils::{numeric_column, string_column},
};
use polars::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "analyze")]
#[command(about = "Characteristic stability, allocation and diagnostics for an equity universe", long_about = None)]
#[command(version)]
struct Cli {
    /// Asset table CSV: a ticker column, characteristics and forward returns
    assets: PathBuf,

    /// Wide daily returns CSV
    returns: PathBuf,

    /// Returns column holding the benchmark
    #[arg(long, default_value = "SPY")]
    benchmark: String,

    /// Returns column holding a new factor to build a mimicking portfolio for
    #[arg(long)]
    factor: Option<String>,

    /// Name of the date column in the returns file
    #[arg(long, default_value = "date")]
    date_column: String,

    /// JSON pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let assets = read_csv(&cli.assets)?;
    let mut columns = read_returns(&cli.returns, &cli.date_column)?;
    let benchmark = columns
        .remove(&cli.benchmark)
        .ok_or_else(|| format!("benchmark column '{}' not found", cli.benchmark))?;
    let factor = match &cli.factor {
        Some(name) => Some(columns.remove(name).ok_or_else(|| format!("factor column '{name}' not found"))?),
        None => None,
    };
    let returns = columns.into_iter().map(|(name, series)| (Symbol::new(name), series)).collect();

    let mut input = PipelineInput::new(assets, returns, benchmark);
    if let Some(factor) = factor {
        input = input.with_new_factor(factor);
    }

    let report = AnalysisPipeline::with_config(config).run(&input);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn read_csv(path: &Path) -> Result<DataFrame, PolarsError> {
    CsvReadOptions::default().with_has_header(true).try_into_reader_with_file_path(Some(path.to_path_buf()))?.finish()
}

/// Every non-date column of the returns file as a series keyed by column name.
fn read_returns(
    path: &Path,
    date_column: &str,
) -> Result<BTreeMap<String, ReturnSeries>, Box<dyn std::error::Error>> {
    let df = read_csv(path)?;
    let dates = string_column(&df, date_column)?
        .into_iter()
        .map(|d| {
            let d = d.ok_or("missing date")?;
            Ok(NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")?)
        })
        .collect::<Result<Vec<NaiveDate>, Box<dyn std::error::Error>>>()?;

    let mut series = BTreeMap::new();
    for name in df.get_column_names() {
        if name.as_str() == date_column {
            continue;
        }
        let values = numeric_column(&df, name.as_str())?;
        let observations = dates.iter().zip(values).filter_map(|(d, v)| v.map(|v| (*d, v)));
        series.insert(name.to_string(), ReturnSeries::from_observations(observations));
    }
    Ok(series)
}

fn print_summary(report: &PipelineReport) {
    println!("\n{:=<72}", "");
    println!("CHARACTERISTIC WEIGHTS");
    println!("{:=<72}", "");
    println!(
        "{:<24} {:>10} {:>12} {:>9} {:>10}",
        "Characteristic", "Avg Sharpe", "Consistency", "Horizons", "Weight %"
    );
    for row in report.weighted_characteristics() {
        println!(
            "{:<24} {:>10.3} {:>12.2} {:>9} {:>10.2}",
            row.characteristic,
            row.avg_sharpe_coeff,
            row.consistency_score,
            row.horizons_present,
            row.final_weight
        );
    }

    println!("\n{:=<72}", "");
    println!("PORTFOLIO ({} assets)", report.selected.len());
    println!("{:=<72}", "");
    println!("{:<10} {:>10} {:>10}", "Symbol", "Weight", "Beta");
    for (symbol, weight) in report.portfolio.iter() {
        let beta = report.betas.get(symbol).copied().unwrap_or(f64::NAN);
        println!("{:<10} {:>10.4} {:>10.3}", symbol.as_str(), weight, beta);
    }
    if report.risk.is_fallback() {
        println!("(risk model fell back to identity covariance)");
    }

    let diagnostics = &report.diagnostics;
    println!("\n{:=<72}", "");
    println!("DIAGNOSTICS");
    println!("{:=<72}", "");
    println!("MALV:              {:>10.4}", diagnostics.malv);
    println!("IC:                {:>10.4}", diagnostics.information.ic);
    println!("IR:                {:>10.4}", diagnostics.information.ir);
    match &diagnostics.hurst {
        Some(h) => println!("Hurst exponent:    {:>10.4} ({} block sizes)", h.exponent, h.table.len()),
        None => println!("Hurst exponent:           n/a"),
    }
    println!();
}
