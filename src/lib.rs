//! DCF Valuation - scenario discounted cash flow and comparable-company analysis
//!
//! This library provides:
//! - Free cash flow projection, Gordon growth terminal value and discounting
//! - Base, Bull and Bear assumption presets, optionally loaded from CSV
//! - Comparable-company multiples with per-field default substitution
//! - Pluggable market data providers with explicit fallback handling
//! - Text, JSON and CSV reporting

pub mod error;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod market;
pub mod comparables;
pub mod report;
pub mod analysis;

// Re-export commonly used types
pub use error::{LoadError, MarketDataError, ValuationError};
pub use assumptions::{AssumptionSet, Scenario, ScenarioBook};
pub use projection::{
    compute_terminal_value, present_value, project_free_cash_flow, run_scenario,
    ProjectionConfig, ProjectionEngine, ProjectionResult,
};
pub use scenario::{run_all_scenarios, ScenarioResults, ScenarioRunner};
pub use market::{MarketDataProvider, MarketInputs, MetricsLookup, PartialMultiples};
pub use comparables::{build_comparables_table, ComparableRow, Multiples};
pub use report::ValuationReport;
pub use analysis::{run_analysis, AnalysisConfig};
