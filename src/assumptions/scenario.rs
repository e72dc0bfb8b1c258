//! Scenario names and the seven-parameter assumption set

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, ValuationError};

/// Named valuation scenario
///
/// Ordering follows presentation order: Base, Bull, Bear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Base,
    Bull,
    Bear,
}

impl Scenario {
    /// All scenarios in presentation order
    pub const ALL: [Scenario; 3] = [Scenario::Base, Scenario::Bull, Scenario::Bear];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Base => "Base",
            Scenario::Bull => "Bull",
            Scenario::Bear => "Bear",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Scenario::Base),
            "bull" => Ok(Scenario::Bull),
            "bear" => Ok(Scenario::Bear),
            _ => Err(LoadError::UnknownScenario(s.to_string())),
        }
    }
}

/// Operating and discounting assumptions for one scenario
///
/// All rates are annual decimals (0.15 = 15%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssumptionSet {
    /// Year-over-year revenue growth
    pub revenue_growth: f64,

    /// EBITDA as a share of revenue
    pub ebitda_margin: f64,

    /// Cash tax rate applied to EBITDA
    pub tax_rate: f64,

    /// Capital expenditure as a share of revenue
    pub capex_percent: f64,

    /// Working capital investment as a share of revenue
    pub working_capital_percent: f64,

    /// Weighted average cost of capital (discount rate)
    pub wacc: f64,

    /// Perpetual growth rate after the explicit horizon
    pub terminal_growth: f64,
}

impl AssumptionSet {
    /// Base case: 15% growth, 35% margin, 10% WACC, 3% terminal growth
    pub const BASE: AssumptionSet = AssumptionSet {
        revenue_growth: 0.15,
        ebitda_margin: 0.35,
        tax_rate: 0.15,
        capex_percent: 0.10,
        working_capital_percent: 0.15,
        wacc: 0.10,
        terminal_growth: 0.03,
    };

    /// Bull case: 20% growth, 40% margin, 9% WACC, 4% terminal growth
    pub const BULL: AssumptionSet = AssumptionSet {
        revenue_growth: 0.20,
        ebitda_margin: 0.40,
        tax_rate: 0.15,
        capex_percent: 0.08,
        working_capital_percent: 0.12,
        wacc: 0.09,
        terminal_growth: 0.04,
    };

    /// Bear case: 10% growth, 30% margin, 11% WACC, 2% terminal growth
    pub const BEAR: AssumptionSet = AssumptionSet {
        revenue_growth: 0.10,
        ebitda_margin: 0.30,
        tax_rate: 0.15,
        capex_percent: 0.12,
        working_capital_percent: 0.18,
        wacc: 0.11,
        terminal_growth: 0.02,
    };

    /// Preset assumptions for a named scenario
    pub fn preset(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Base => Self::BASE,
            Scenario::Bull => Self::BULL,
            Scenario::Bear => Self::BEAR,
        }
    }

    /// Check every field against its admissible range
    ///
    /// Ratios must lie in [0, 1), WACC must exceed -100% and the terminal growth rate,
    /// and nothing may be NaN or infinite.
    pub fn validate(&self) -> Result<(), ValuationError> {
        let ratios = [
            ("revenue_growth", self.revenue_growth),
            ("ebitda_margin", self.ebitda_margin),
            ("tax_rate", self.tax_rate),
            ("capex_percent", self.capex_percent),
            ("working_capital_percent", self.working_capital_percent),
        ];

        for (field, value) in ratios {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(ValuationError::InvalidAssumption { scenario: None, field, value });
            }
        }

        if !self.wacc.is_finite() || self.wacc <= -1.0 {
            return Err(ValuationError::InvalidAssumption {
                scenario: None,
                field: "wacc",
                value: self.wacc,
            });
        }

        if !self.terminal_growth.is_finite() {
            return Err(ValuationError::InvalidAssumption {
                scenario: None,
                field: "terminal_growth",
                value: self.terminal_growth,
            });
        }

        self.check_convergence()
    }

    /// Gordon growth requires the discount rate to exceed the perpetual growth rate
    ///
    /// NaN in either rate fails the comparison and is rejected.
    pub fn check_convergence(&self) -> Result<(), ValuationError> {
        match self.wacc.partial_cmp(&self.terminal_growth) {
            Some(Ordering::Greater) => Ok(()),
            _ => Err(ValuationError::DivergentValuation {
                scenario: None,
                wacc: self.wacc,
                terminal_growth: self.terminal_growth,
            }),
        }
    }
}

impl Default for AssumptionSet {
    fn default() -> Self {
        Self::BASE
    }
}
