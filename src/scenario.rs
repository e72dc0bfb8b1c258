//! Scenario runner for Base, Bull and Bear valuations
//!
//! Pre-loads an assumption book once, then values any starting revenue under
//! every scenario. Scenarios are independent and run in parallel.

use std::collections::BTreeMap;

use log::{info, warn};
use rayon::prelude::*;

use crate::assumptions::{Scenario, ScenarioBook};
use crate::error::ValuationError;
use crate::projection::{check_horizon, ProjectionConfig, ProjectionEngine, ProjectionResult};

/// Outcome per scenario, keyed in presentation order (Base, Bull, Bear)
///
/// A scenario whose assumptions cannot be valued is kept as an `Err`.
pub type ScenarioResults = BTreeMap<Scenario, Result<ProjectionResult, ValuationError>>;

/// Value a starting revenue under the three preset scenarios
pub fn run_all_scenarios(starting_revenue: f64) -> Result<ScenarioResults, ValuationError> {
    ScenarioRunner::new().run_all(starting_revenue)
}

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
/// let results = runner.run_all(20_000_000_000.0)?;
/// let base = results[&Scenario::Base].as_ref()?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    book: ScenarioBook,
    config: ProjectionConfig,
}

impl ScenarioRunner {
    /// Create runner with the preset assumptions and default horizon
    pub fn new() -> Self {
        Self {
            book: ScenarioBook::presets(),
            config: ProjectionConfig::default(),
        }
    }

    /// Create runner by loading assumptions from the default CSV file
    pub fn from_csv() -> Result<Self, crate::error::LoadError> {
        Ok(Self::with_book(ScenarioBook::from_csv()?))
    }

    /// Create runner with a pre-built assumption book
    pub fn with_book(book: ScenarioBook) -> Self {
        Self {
            book,
            config: ProjectionConfig::default(),
        }
    }

    /// Override the projection config
    pub fn with_config(mut self, config: ProjectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Value one scenario
    pub fn run(
        &self,
        scenario: Scenario,
        starting_revenue: f64,
    ) -> Result<ProjectionResult, ValuationError> {
        let engine = ProjectionEngine::new(*self.book.get(scenario), self.config);
        engine
            .project(starting_revenue)
            .map_err(|e| e.in_scenario(scenario))
    }

    /// Value every scenario
    ///
    /// A bad starting revenue or horizon fails the whole run. Assumption errors
    /// only fail the affected scenario.
    pub fn run_all(&self, starting_revenue: f64) -> Result<ScenarioResults, ValuationError> {
        if !starting_revenue.is_finite() || starting_revenue <= 0.0 {
            return Err(ValuationError::MissingInput {
                input: "starting_revenue",
                value: starting_revenue,
            });
        }
        check_horizon(self.config.horizon_years)?;

        let results: ScenarioResults = Scenario::ALL
            .par_iter()
            .map(|&scenario| (scenario, self.run(scenario, starting_revenue)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        for (scenario, outcome) in &results {
            match outcome {
                Ok(result) => info!(
                    "{} scenario: enterprise value {:.0}",
                    scenario, result.enterprise_value
                ),
                Err(e) => warn!("{} scenario failed: {}", scenario, e),
            }
        }

        Ok(results)
    }

    /// Get reference to the assumption book
    pub fn book(&self) -> &ScenarioBook {
        &self.book
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
