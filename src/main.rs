//! DCF Valuation CLI
//!
//! Values the subject company under Base, Bull and Bear assumptions and prints
//! the comparables table. Runs offline: market data comes from a quotes CSV,
//! and anything missing falls back to the documented defaults.

use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use dcf_valuation::{
    analysis::{run_analysis, AnalysisConfig},
    assumptions::ScenarioBook,
    market::{loader::load_quotes, MarketDataProvider, Unavailable, DEFAULT_SUBJECT_TICKER},
    projection::{ProjectionConfig, DEFAULT_HORIZON_YEARS},
    report::current_year,
    ScenarioRunner,
};

#[derive(Parser)]
#[command(name = "dcf_valuation")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subject company ticker
    #[arg(short, long, env = "DCF_SUBJECT", default_value = DEFAULT_SUBJECT_TICKER)]
    subject: String,

    /// Quotes CSV (Ticker,CurrentPrice,TotalRevenue,EnterpriseToEbitda,TrailingPE,PriceToSales,ReturnOnEquity)
    #[arg(short, long, env = "DCF_QUOTES")]
    quotes: Option<PathBuf>,

    /// Scenario assumptions CSV overriding the presets
    #[arg(short, long, env = "DCF_ASSUMPTIONS")]
    assumptions: Option<PathBuf>,

    /// Starting revenue, bypassing the quotes file
    #[arg(short, long, env = "DCF_STARTING_REVENUE")]
    revenue: Option<f64>,

    /// Explicit projection horizon in years
    #[arg(long, env = "DCF_HORIZON_YEARS", default_value_t = DEFAULT_HORIZON_YEARS)]
    horizon: u32,

    /// Fiscal year preceding projection year 1 (default: current year)
    #[arg(long)]
    base_year: Option<i32>,

    /// Comma-separated peer tickers
    #[arg(short, long, value_delimiter = ',', default_value = "LRCX,AMAT,KLAC,TER")]
    peers: Vec<String>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write dcf_projections.csv and comparables.csv into this directory
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let provider: Box<dyn MarketDataProvider> = match &cli.quotes {
        Some(path) => Box::new(
            load_quotes(path, &cli.subject)
                .with_context(|| format!("Failed to load quotes from {}", path.display()))?,
        ),
        None => {
            info!("No quotes file given; running on default market inputs");
            Box::new(Unavailable::new(cli.subject.clone()))
        }
    };

    let book = match &cli.assumptions {
        Some(path) => ScenarioBook::from_csv_path(path)
            .with_context(|| format!("Failed to load assumptions from {}", path.display()))?,
        None => ScenarioBook::presets(),
    };

    let runner = ScenarioRunner::with_book(book).with_config(ProjectionConfig {
        horizon_years: cli.horizon,
    });

    let config = AnalysisConfig {
        comparables: cli.peers.clone(),
        revenue_override: cli.revenue,
        base_year: cli.base_year.unwrap_or_else(current_year),
        ..AnalysisConfig::default()
    };

    let report = run_analysis(provider.as_ref(), &runner, &config).context("Valuation failed")?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }

    if let Some(dir) = &cli.csv_dir {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let projections_path = dir.join("dcf_projections.csv");
        report.write_projections_csv(File::create(&projections_path)?)?;

        let comparables_path = dir.join("comparables.csv");
        report.write_comparables_csv(File::create(&comparables_path)?)?;

        info!(
            "Wrote {} and {}",
            projections_path.display(),
            comparables_path.display()
        );
    }

    Ok(())
}
