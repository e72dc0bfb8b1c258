//! Valuation report: bundles scenario results and the comparables table for
//! console, JSON and CSV output

use std::fmt;
use std::io;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::assumptions::{AssumptionSet, Scenario, ScenarioBook};
use crate::comparables::{ComparableRow, Multiple};
use crate::market::MarketInputs;
use crate::projection::ProjectionResult;
use crate::scenario::ScenarioResults;

/// Result of one scenario as reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub assumptions: AssumptionSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ProjectionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything produced by one valuation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    pub subject: String,
    pub generated_at: DateTime<Utc>,
    pub market: MarketInputs,

    /// Fiscal year preceding projection year 1
    pub base_year: i32,

    /// Label for each projection year
    pub fiscal_years: Vec<i32>,

    pub scenarios: Vec<ScenarioOutcome>,
    pub comparables: Vec<ComparableRow>,
}

/// Current calendar year, used as the default base year
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Calendar year of projection year `t`, saturating at the ends of the i32 range
pub fn fiscal_year(base_year: i32, t: u32) -> i32 {
    base_year.saturating_add(i32::try_from(t).unwrap_or(i32::MAX))
}

impl ValuationReport {
    pub fn new(
        subject: &str,
        market: MarketInputs,
        base_year: i32,
        book: &ScenarioBook,
        results: &ScenarioResults,
        comparables: Vec<ComparableRow>,
    ) -> Self {
        let scenarios: Vec<ScenarioOutcome> = results
            .iter()
            .map(|(scenario, outcome)| ScenarioOutcome {
                scenario: *scenario,
                assumptions: *book.get(*scenario),
                result: outcome.as_ref().ok().cloned(),
                error: outcome.as_ref().err().map(|e| e.to_string()),
            })
            .collect();

        let horizon = scenarios
            .iter()
            .filter_map(|s| s.result.as_ref())
            .map(|r| r.horizon_years())
            .max()
            .unwrap_or(0);

        Self {
            subject: subject.to_string(),
            generated_at: Utc::now(),
            market,
            base_year,
            fiscal_years: (1..=horizon).map(|t| fiscal_year(base_year, t)).collect(),
            scenarios,
            comparables,
        }
    }

    pub fn outcome(&self, scenario: Scenario) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().find(|s| s.scenario == scenario)
    }

    /// Console rendering of the DCF results and comparables table
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        if self.write_text(&mut out).is_err() {
            out.clear();
        }
        out
    }

    /// Write the console rendering to any formatter sink
    pub fn write_text<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "{} Valuation ({})", self.subject, self.generated_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(
            out,
            "Current Price: {} ({:?})",
            format_amount(self.market.current_price.value),
            self.market.current_price.source
        )?;
        writeln!(
            out,
            "Starting Revenue: {} ({:?})",
            format_amount(self.market.total_revenue.value),
            self.market.total_revenue.source
        )?;

        writeln!(out, "\nDCF Analysis Results:")?;
        for outcome in &self.scenarios {
            writeln!(out, "\n{} Case:", outcome.scenario)?;
            match (&outcome.result, &outcome.error) {
                (Some(result), _) => {
                    writeln!(out, "Enterprise Value: {}", format_amount(result.enterprise_value))?;
                    writeln!(out, "Terminal Value: {}", format_amount(result.terminal_value))?;
                    if let Some(share) = result.terminal_value_share() {
                        writeln!(out, "Terminal Value Share of EV: {:.1}%", share * 100.0)?;
                    }
                    writeln!(out, "FCF Projections:")?;
                    for (i, fcf) in result.fcf_projections.iter().enumerate() {
                        let label = match self.fiscal_years.get(i) {
                            Some(year) => *year,
                            None => fiscal_year(self.base_year, u32::try_from(i + 1).unwrap_or(u32::MAX)),
                        };
                        writeln!(out, "Year {} ({}): {}", i + 1, label, format_amount(*fcf))?;
                    }
                }
                (None, Some(error)) => writeln!(out, "FAILED: {}", error)?,
                (None, None) => writeln!(out, "No result")?,
            }
        }

        writeln!(out, "\nComparable Company Analysis:")?;
        write!(out, "{:<8}", "Ticker")?;
        for multiple in Multiple::ALL {
            write!(out, " {:>10}", multiple.label())?;
        }
        writeln!(out)?;
        writeln!(out, "{}", "-".repeat(8 + 11 * Multiple::ALL.len()))?;

        for row in &self.comparables {
            write!(out, "{:<8}", row.ticker)?;
            for multiple in Multiple::ALL {
                let marker = if row.substituted.contains(&multiple) { "*" } else { " " };
                write!(out, " {:>9.2}{}", row.multiples.get(multiple), marker)?;
            }
            writeln!(out)?;
        }
        if self.comparables.iter().any(|r| !r.substituted.is_empty()) {
            writeln!(out, "* default value substituted")?;
        }

        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One CSV row per scenario and projection year
    pub fn write_projections_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "Scenario", "Year", "FiscalYear", "Revenue", "EBITDA", "Taxes", "Capex",
            "WorkingCapital", "FCF", "DiscountFactor", "PV_FCF",
        ])?;

        for outcome in &self.scenarios {
            let Some(result) = &outcome.result else { continue };
            for row in &result.years {
                let fiscal = fiscal_year(self.base_year, row.year);
                wtr.write_record([
                    outcome.scenario.to_string(),
                    row.year.to_string(),
                    fiscal.to_string(),
                    format!("{:.2}", row.revenue),
                    format!("{:.2}", row.ebitda),
                    format!("{:.2}", row.taxes),
                    format!("{:.2}", row.capex),
                    format!("{:.2}", row.working_capital),
                    format!("{:.2}", row.fcf),
                    format!("{:.8}", row.discount_factor),
                    format!("{:.2}", row.pv_fcf),
                ])?;
            }
        }

        wtr.flush()?;
        Ok(())
    }

    /// One CSV row per peer, with the list of defaulted multiples
    pub fn write_comparables_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["Ticker", "EV/EBITDA", "P/E", "P/S", "ROE", "Defaulted"])?;

        for row in &self.comparables {
            let defaulted: Vec<&str> = row.substituted.iter().map(|m| m.label()).collect();
            wtr.write_record([
                row.ticker.clone(),
                format!("{:.4}", row.multiples.ev_to_ebitda),
                format!("{:.4}", row.multiples.price_to_earnings),
                format!("{:.4}", row.multiples.price_to_sales),
                format!("{:.4}", row.multiples.return_on_equity),
                defaulted.join(";"),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

/// Format with thousands separators and two decimals: 1092500000 -> "1,092,500,000.00"
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparables::{build_comparables_table, Multiples};
    use crate::market::{InputSource, Sourced, Unavailable};
    use crate::scenario::ScenarioRunner;
    use crate::error::ValuationError;

    fn market() -> MarketInputs {
        MarketInputs {
            current_price: Sourced { value: 800.0, source: InputSource::Default },
            total_revenue: Sourced { value: 20_000_000_000.0, source: InputSource::Default },
        }
    }

    fn sample_report() -> ValuationReport {
        let runner = ScenarioRunner::new();
        let results = runner.run_all(20_000_000_000.0).unwrap();
        let comps = build_comparables_table(&["LRCX", "AMAT"], &Unavailable::default(), &Multiples::DEFAULTS);
        ValuationReport::new("ASML", market(), 2024, runner.book(), &results, comps)
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_092_500_000.0), "1,092,500,000.00");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(-1234.567), "-1,234.57");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_fiscal_year_labels() {
        let report = sample_report();
        assert_eq!(report.fiscal_years, vec![2025, 2026, 2027, 2028, 2029]);
    }

    #[test]
    fn test_fiscal_year_saturates() {
        assert_eq!(fiscal_year(2024, 1), 2025);
        assert_eq!(fiscal_year(2024, u32::MAX), i32::MAX);
        assert_eq!(fiscal_year(i32::MAX - 1, 5), i32::MAX);
    }

    /// Sink that refuses writes once `room` bytes have been accepted
    struct Truncated {
        room: usize,
    }

    impl fmt::Write for Truncated {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if s.len() > self.room {
                return Err(fmt::Error);
            }
            self.room -= s.len();
            Ok(())
        }
    }

    #[test]
    fn test_write_text_propagates_sink_errors() {
        let report = sample_report();
        assert!(report.write_text(&mut Truncated { room: 64 }).is_err());

        let full = report.render_text();
        assert!(report.write_text(&mut Truncated { room: full.len() }).is_ok());
    }

    #[test]
    fn test_render_text_contains_all_sections() {
        let text = sample_report().render_text();

        assert!(text.contains("DCF Analysis Results:"));
        assert!(text.contains("Base Case:"));
        assert!(text.contains("Bull Case:"));
        assert!(text.contains("Bear Case:"));
        assert!(text.contains("Year 1 (2025): 1,092,500,000.00"));
        assert!(text.contains("Comparable Company Analysis:"));
        assert!(text.contains("LRCX"));
        assert!(text.contains("* default value substituted"));
    }

    #[test]
    fn test_failed_scenario_is_rendered() {
        let mut results = ScenarioRunner::new().run_all(20_000_000_000.0).unwrap();
        results.insert(
            Scenario::Bear,
            Err(ValuationError::DivergentValuation {
                scenario: Some(Scenario::Bear),
                wacc: 0.02,
                terminal_growth: 0.02,
            }),
        );

        let report = ValuationReport::new("ASML", market(), 2024, &ScenarioBook::presets(), &results, Vec::new());
        let bear = report.outcome(Scenario::Bear).unwrap();
        assert!(bear.result.is_none());
        assert!(bear.error.as_ref().unwrap().contains("divergent"));
        assert!(report.render_text().contains("FAILED: divergent valuation"));
    }

    #[test]
    fn test_csv_exports() {
        let report = sample_report();

        let mut buf = Vec::new();
        report.write_projections_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        // header + 3 scenarios x 5 years
        assert_eq!(text.lines().count(), 16);
        assert!(text.lines().nth(1).unwrap().starts_with("Base,1,2025,23000000000.00"));

        let mut buf = Vec::new();
        report.write_comparables_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("LRCX,20.0000,30.0000,10.0000,0.2500,EV/EBITDA;P/E;P/S;ROE"));
    }

    #[test]
    fn test_json_round_trip_keeps_scenarios() {
        let report = sample_report();
        let json = report.to_json().unwrap();
        let parsed: ValuationReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.scenarios.len(), 3);
        for (a, b) in parsed.scenarios.iter().zip(&report.scenarios) {
            assert_eq!(a.scenario, b.scenario);
            let (a, b) = (a.result.as_ref().unwrap(), b.result.as_ref().unwrap());
            assert!((a.enterprise_value - b.enterprise_value).abs() / b.enterprise_value < 1e-12);
            assert_eq!(a.fcf_projections.len(), b.fcf_projections.len());
        }
        assert_eq!(parsed.comparables[1].ticker, "AMAT");
        assert_eq!(parsed.comparables[1].substituted.len(), 4);
    }
}
