//! Error types for valuation, market data and assumption loading

use thiserror::Error;

use crate::assumptions::Scenario;

/// Arithmetic failures in the DCF projection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// Gordon growth denominator is zero or negative
    #[error("divergent valuation ({}): wacc {wacc} must exceed terminal growth {terminal_growth}", scenario_label(.scenario))]
    DivergentValuation {
        scenario: Option<Scenario>,
        wacc: f64,
        terminal_growth: f64,
    },

    /// A required input is absent, non-finite or non-positive
    #[error("missing input: {input} = {value} (must be positive and finite)")]
    MissingInput { input: &'static str, value: f64 },

    /// Projection horizon outside 1..=MAX_HORIZON_YEARS
    #[error("invalid horizon: {0} years (must be between 1 and {max})", max = crate::projection::MAX_HORIZON_YEARS)]
    InvalidHorizon(u32),

    /// An assumption outside its admissible range
    #[error("invalid assumption ({}): {field} = {value}", scenario_label(.scenario))]
    InvalidAssumption {
        scenario: Option<Scenario>,
        field: &'static str,
        value: f64,
    },
}

impl ValuationError {
    /// Attach the scenario name to errors that carry one
    pub fn in_scenario(self, name: Scenario) -> Self {
        match self {
            Self::DivergentValuation { wacc, terminal_growth, .. } => Self::DivergentValuation {
                scenario: Some(name),
                wacc,
                terminal_growth,
            },
            Self::InvalidAssumption { field, value, .. } => Self::InvalidAssumption {
                scenario: Some(name),
                field,
                value,
            },
            other => other,
        }
    }
}

fn scenario_label(scenario: &Option<Scenario>) -> String {
    match scenario {
        Some(s) => format!("{} scenario", s),
        None => "unnamed assumption set".to_string(),
    }
}

/// Failures at the market data collaborator boundary
///
/// These never reach the arithmetic core: callers substitute defaults.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketDataError {
    /// The provider could not supply the requested figure
    #[error("{what} unavailable for {ticker}")]
    Unavailable { ticker: String, what: &'static str },

    /// The provider has no record of the ticker at all
    #[error("unknown ticker: {0}")]
    UnknownTicker(String),
}

/// Failures while loading assumption or quote files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown scenario name: {0}")]
    UnknownScenario(String),

    #[error(transparent)]
    Invalid(#[from] ValuationError),
}
