//! End-to-end valuation run: resolve market inputs, value every scenario and
//! build the comparables table

use log::info;

use crate::comparables::{build_comparables_table, Multiples};
use crate::error::ValuationError;
use crate::market::{MarketDataProvider, MarketInputs, Sourced, DEFAULT_COMPARABLES};
use crate::report::{current_year, ValuationReport};
use crate::scenario::ScenarioRunner;

/// Inputs for one valuation run beyond the assumption book
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Peer tickers, in presentation order
    pub comparables: Vec<String>,

    /// Multiples substituted when a peer lookup misses
    pub default_multiples: Multiples,

    /// Use this starting revenue instead of asking the provider
    pub revenue_override: Option<f64>,

    /// Fiscal year preceding projection year 1
    pub base_year: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            comparables: DEFAULT_COMPARABLES.iter().map(|t| t.to_string()).collect(),
            default_multiples: Multiples::DEFAULTS,
            revenue_override: None,
            base_year: current_year(),
        }
    }
}

/// Run the full valuation for the provider's subject company
///
/// Only a missing starting revenue or an out-of-range horizon fails the run; scenario
/// failures are carried in the report.
pub fn run_analysis<P: MarketDataProvider + ?Sized>(
    provider: &P,
    runner: &ScenarioRunner,
    config: &AnalysisConfig,
) -> Result<ValuationReport, ValuationError> {
    let mut market = MarketInputs::resolve(provider);
    if let Some(revenue) = config.revenue_override {
        market.total_revenue = Sourced::overridden(revenue);
    }

    info!(
        "Valuing {} from revenue {:.0} ({:?})",
        provider.subject(),
        market.total_revenue.value,
        market.total_revenue.source
    );

    let results = runner.run_all(market.total_revenue.value)?;
    let comparables = build_comparables_table(&config.comparables, provider, &config.default_multiples);

    Ok(ValuationReport::new(
        provider.subject(),
        market,
        config.base_year,
        runner.book(),
        &results,
        comparables,
    ))
}
