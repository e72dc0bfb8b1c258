//! CSV-based scenario assumption loader
//!
//! Reads overrides from data/assumptions/scenarios.csv. Scenarios missing from the
//! file keep their preset values.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use super::{AssumptionSet, Scenario, ScenarioBook};
use crate::error::LoadError;

/// Default path to the scenario assumptions file
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions/scenarios.csv";

/// Raw CSV row matching scenarios.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Scenario")]
    scenario: String,
    #[serde(rename = "RevenueGrowth")]
    revenue_growth: f64,
    #[serde(rename = "EbitdaMargin")]
    ebitda_margin: f64,
    #[serde(rename = "TaxRate")]
    tax_rate: f64,
    #[serde(rename = "CapexPercent")]
    capex_percent: f64,
    #[serde(rename = "WorkingCapitalPercent")]
    working_capital_percent: f64,
    #[serde(rename = "Wacc")]
    wacc: f64,
    #[serde(rename = "TerminalGrowth")]
    terminal_growth: f64,
}

impl CsvRow {
    fn into_assumptions(self) -> Result<(Scenario, AssumptionSet), LoadError> {
        let scenario: Scenario = self.scenario.parse()?;
        let set = AssumptionSet {
            revenue_growth: self.revenue_growth,
            ebitda_margin: self.ebitda_margin,
            tax_rate: self.tax_rate,
            capex_percent: self.capex_percent,
            working_capital_percent: self.working_capital_percent,
            wacc: self.wacc,
            terminal_growth: self.terminal_growth,
        };

        set.validate().map_err(|e| e.in_scenario(scenario))?;
        Ok((scenario, set))
    }
}

/// Load a scenario book from a CSV file
pub fn load_scenario_book(path: &Path) -> Result<ScenarioBook, LoadError> {
    let file = File::open(path)?;
    load_scenario_book_from_reader(file)
}

/// Load a scenario book from any reader (e.g., string buffer, request body)
pub fn load_scenario_book_from_reader<R: Read>(reader: R) -> Result<ScenarioBook, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut book = ScenarioBook::presets();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let (scenario, set) = row.into_assumptions()?;
        debug!("Loaded {} assumptions: {:?}", scenario, set);
        book = book.with(scenario, set);
    }

    Ok(book)
}
