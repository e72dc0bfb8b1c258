//! Valuation assumptions: scenario presets and the book that holds them

mod scenario;
pub mod loader;

pub use scenario::{AssumptionSet, Scenario};

use std::path::Path;

use crate::error::LoadError;

/// Container for the assumption set of every scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioBook {
    pub base: AssumptionSet,
    pub bull: AssumptionSet,
    pub bear: AssumptionSet,
}

impl ScenarioBook {
    /// The three preset assumption sets
    pub fn presets() -> Self {
        Self {
            base: AssumptionSet::BASE,
            bull: AssumptionSet::BULL,
            bear: AssumptionSet::BEAR,
        }
    }

    /// Load scenario overrides from the default CSV location (data/assumptions/)
    pub fn from_csv() -> Result<Self, LoadError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load scenario overrides from a specific CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self, LoadError> {
        loader::load_scenario_book(path)
    }

    pub fn get(&self, scenario: Scenario) -> &AssumptionSet {
        match scenario {
            Scenario::Base => &self.base,
            Scenario::Bull => &self.bull,
            Scenario::Bear => &self.bear,
        }
    }

    /// Replace the assumptions of one scenario
    pub fn with(mut self, scenario: Scenario, set: AssumptionSet) -> Self {
        match scenario {
            Scenario::Base => self.base = set,
            Scenario::Bull => self.bull = set,
            Scenario::Bear => self.bear = set,
        }
        self
    }

    /// Scenario and assumptions pairs in presentation order
    pub fn iter(&self) -> impl Iterator<Item = (Scenario, &AssumptionSet)> {
        Scenario::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

impl Default for ScenarioBook {
    fn default() -> Self {
        Self::presets()
    }
}
