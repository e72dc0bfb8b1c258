//! Core DCF arithmetic: FCF projection, terminal value and discounting

use log::debug;

use super::cashflows::{ProjectionResult, YearProjection};
use super::discount::DiscountCurve;
use crate::assumptions::AssumptionSet;
use crate::error::ValuationError;

/// Default explicit projection horizon in years
pub const DEFAULT_HORIZON_YEARS: u32 = 5;

/// Longest explicit projection horizon accepted
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Reject horizons outside 1..=MAX_HORIZON_YEARS
pub fn check_horizon(horizon_years: u32) -> Result<(), ValuationError> {
    if horizon_years == 0 || horizon_years > MAX_HORIZON_YEARS {
        return Err(ValuationError::InvalidHorizon(horizon_years));
    }
    Ok(())
}

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Number of explicitly projected years before the terminal value
    pub horizon_years: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
        }
    }
}

/// Project the yearly operating build-up from a starting revenue
///
/// Revenue compounds from the previous year's grown figure, so year `t` uses
/// `starting_revenue * (1 + g)^t`. Discount factors are filled in at the WACC.
pub fn project_years(
    starting_revenue: f64,
    assumptions: &AssumptionSet,
    horizon_years: u32,
) -> Result<Vec<YearProjection>, ValuationError> {
    if !starting_revenue.is_finite() || starting_revenue <= 0.0 {
        return Err(ValuationError::MissingInput {
            input: "starting_revenue",
            value: starting_revenue,
        });
    }
    check_horizon(horizon_years)?;

    let curve = DiscountCurve::flat(assumptions.wacc);
    let mut revenue = starting_revenue;
    let mut years = Vec::with_capacity(horizon_years as usize);

    for year in 1..=horizon_years {
        let mut row = YearProjection::new(year);

        revenue *= 1.0 + assumptions.revenue_growth;
        row.revenue = revenue;
        row.ebitda = revenue * assumptions.ebitda_margin;
        row.taxes = row.ebitda * assumptions.tax_rate;
        row.capex = revenue * assumptions.capex_percent;
        row.working_capital = revenue * assumptions.working_capital_percent;
        row.fcf = row.ebitda - row.taxes - row.capex - row.working_capital;

        row.discount_factor = curve.discount_factor(year);
        row.pv_fcf = curve.present_value(row.fcf, year);

        years.push(row);
    }

    Ok(years)
}

/// Project free cash flow for each year of the horizon, year 1 first
pub fn project_free_cash_flow(
    starting_revenue: f64,
    assumptions: &AssumptionSet,
    horizon_years: u32,
) -> Result<Vec<f64>, ValuationError> {
    let years = project_years(starting_revenue, assumptions, horizon_years)?;
    Ok(years.into_iter().map(|y| y.fcf).collect())
}

/// Gordon growth terminal value at the end of the horizon
///
/// `last_year_fcf * (1 + g) / (wacc - g)`, rejected when `wacc <= g`.
pub fn compute_terminal_value(
    last_year_fcf: f64,
    assumptions: &AssumptionSet,
) -> Result<f64, ValuationError> {
    assumptions.check_convergence()?;

    let g = assumptions.terminal_growth;
    Ok(last_year_fcf * (1.0 + g) / (assumptions.wacc - g))
}

/// Enterprise value: discounted FCF plus the terminal value discounted over the
/// length of the FCF sequence
pub fn present_value(fcf_projections: &[f64], terminal_value: f64, wacc: f64) -> f64 {
    let curve = DiscountCurve::flat(wacc);
    let horizon = fcf_projections.len() as u32;

    curve.pv_stream(fcf_projections) + curve.present_value(terminal_value, horizon)
}

/// Full DCF for one assumption set over the default horizon
pub fn run_scenario(
    starting_revenue: f64,
    assumptions: &AssumptionSet,
) -> Result<ProjectionResult, ValuationError> {
    ProjectionEngine::new(*assumptions, ProjectionConfig::default()).project(starting_revenue)
}

/// DCF engine bound to one assumption set and config
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: AssumptionSet,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: AssumptionSet, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        &self.assumptions
    }

    /// Run the projection, terminal value and discounting steps
    ///
    /// Revenue and horizon are checked before the rates, so a missing revenue
    /// is always reported as such.
    pub fn project(&self, starting_revenue: f64) -> Result<ProjectionResult, ValuationError> {
        let years = project_years(starting_revenue, &self.assumptions, self.config.horizon_years)?;

        let wacc = self.assumptions.wacc;
        if !wacc.is_finite() || wacc <= -1.0 {
            return Err(ValuationError::InvalidAssumption { scenario: None, field: "wacc", value: wacc });
        }
        let g = self.assumptions.terminal_growth;
        if !g.is_finite() {
            return Err(ValuationError::InvalidAssumption { scenario: None, field: "terminal_growth", value: g });
        }

        let fcf_projections: Vec<f64> = years.iter().map(|y| y.fcf).collect();

        // project_years guarantees at least one year
        let last_fcf = fcf_projections[fcf_projections.len() - 1];
        let terminal_value = compute_terminal_value(last_fcf, &self.assumptions)?;

        let enterprise_value = present_value(&fcf_projections, terminal_value, self.assumptions.wacc);
        let pv_terminal_value = DiscountCurve::flat(self.assumptions.wacc)
            .present_value(terminal_value, fcf_projections.len() as u32);

        debug!(
            "Projected {} years from revenue {:.0}: EV {:.0}, TV {:.0}",
            years.len(),
            starting_revenue,
            enterprise_value,
            terminal_value
        );

        Ok(ProjectionResult {
            enterprise_value,
            terminal_value,
            pv_terminal_value,
            fcf_projections,
            years,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const STARTING_REVENUE: f64 = 20_000_000_000.0;

    #[test]
    fn test_base_case_year_one() {
        let years = project_years(STARTING_REVENUE, &AssumptionSet::BASE, 5).unwrap();
        let y1 = &years[0];

        assert_relative_eq!(y1.revenue, 23_000_000_000.0, max_relative = 1e-6);
        assert_relative_eq!(y1.ebitda, 8_050_000_000.0, max_relative = 1e-6);
        assert_relative_eq!(y1.taxes, 1_207_500_000.0, max_relative = 1e-6);
        assert_relative_eq!(y1.capex, 2_300_000_000.0, max_relative = 1e-6);
        assert_relative_eq!(y1.working_capital, 3_450_000_000.0, max_relative = 1e-6);
        assert_relative_eq!(y1.fcf, 1_092_500_000.0, max_relative = 1e-6);
    }

    #[test]
    fn test_revenue_compounds_every_year() {
        let g = AssumptionSet::BASE.revenue_growth;
        let years = project_years(STARTING_REVENUE, &AssumptionSet::BASE, 5).unwrap();

        for (t, row) in (1..=5).zip(&years) {
            let expected = STARTING_REVENUE * (1.0 + g).powi(t);
            assert_eq!(row.year, t as u32);
            assert_relative_eq!(row.revenue, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_projection_length_matches_horizon() {
        for horizon in [1, 5, 10] {
            for set in [AssumptionSet::BASE, AssumptionSet::BULL, AssumptionSet::BEAR] {
                let fcf = project_free_cash_flow(STARTING_REVENUE, &set, horizon).unwrap();
                assert_eq!(fcf.len(), horizon as usize);
            }
        }
    }

    #[test]
    fn test_negative_fcf_is_valid_output() {
        let loss_making = AssumptionSet {
            ebitda_margin: 0.05,
            capex_percent: 0.20,
            ..AssumptionSet::BASE
        };
        let fcf = project_free_cash_flow(STARTING_REVENUE, &loss_making, 5).unwrap();
        assert_eq!(fcf.len(), 5);
        assert!(fcf.iter().all(|v| *v < 0.0));
    }

    #[test]
    fn test_missing_revenue_fails_whole_projection() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = project_free_cash_flow(bad, &AssumptionSet::BASE, 5);
            assert!(
                matches!(result, Err(ValuationError::MissingInput { input: "starting_revenue", .. })),
                "revenue {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result = project_free_cash_flow(STARTING_REVENUE, &AssumptionSet::BASE, 0);
        assert_eq!(result, Err(ValuationError::InvalidHorizon(0)));
    }

    #[test]
    fn test_horizon_above_limit_rejected() {
        let fcf = project_free_cash_flow(STARTING_REVENUE, &AssumptionSet::BASE, MAX_HORIZON_YEARS).unwrap();
        assert_eq!(fcf.len(), MAX_HORIZON_YEARS as usize);

        for horizon in [MAX_HORIZON_YEARS + 1, 4_000_000_000, u32::MAX] {
            let engine = ProjectionEngine::new(AssumptionSet::BASE, ProjectionConfig { horizon_years: horizon });
            assert_eq!(engine.project(STARTING_REVENUE), Err(ValuationError::InvalidHorizon(horizon)));
        }
    }

    #[test]
    fn test_nan_rates_rejected() {
        let set = AssumptionSet { wacc: f64::NAN, ..AssumptionSet::BASE };
        assert!(matches!(
            compute_terminal_value(100.0, &set),
            Err(ValuationError::DivergentValuation { .. })
        ));
        assert!(run_scenario(STARTING_REVENUE, &set).is_err());

        let set = AssumptionSet { terminal_growth: f64::NAN, ..AssumptionSet::BASE };
        assert!(compute_terminal_value(100.0, &set).is_err());
        assert!(run_scenario(STARTING_REVENUE, &set).is_err());
    }

    #[test]
    fn test_missing_revenue_reported_before_bad_rates() {
        let set = AssumptionSet { wacc: -2.0, terminal_growth: -3.0, ..AssumptionSet::BASE };
        let engine = ProjectionEngine::new(set, ProjectionConfig::default());

        assert!(matches!(
            engine.project(0.0),
            Err(ValuationError::MissingInput { input: "starting_revenue", .. })
        ));
        assert!(matches!(
            engine.project(STARTING_REVENUE),
            Err(ValuationError::InvalidAssumption { field: "wacc", .. })
        ));
    }

    #[test]
    fn test_terminal_value_gordon_growth() {
        let tv = compute_terminal_value(100.0, &AssumptionSet::BASE).unwrap();
        assert_relative_eq!(tv, 100.0 * 1.03 / 0.07, max_relative = 1e-12);
    }

    #[test]
    fn test_terminal_value_divergent_when_equal() {
        let set = AssumptionSet { wacc: 0.05, terminal_growth: 0.05, ..AssumptionSet::BASE };
        assert_eq!(
            compute_terminal_value(100.0, &set),
            Err(ValuationError::DivergentValuation {
                scenario: None,
                wacc: 0.05,
                terminal_growth: 0.05,
            })
        );
    }

    #[test]
    fn test_terminal_value_divergent_when_below() {
        let set = AssumptionSet { wacc: 0.02, terminal_growth: 0.04, ..AssumptionSet::BASE };
        assert!(matches!(
            compute_terminal_value(100.0, &set),
            Err(ValuationError::DivergentValuation { .. })
        ));
    }

    #[test]
    fn test_terminal_value_shares_final_year_exponent() {
        let wacc = 0.10;
        let fcf = [0.0, 0.0, 0.0, 0.0, 50.0];
        let ev = present_value(&fcf, 1000.0, wacc);

        let expected = 50.0 / 1.1_f64.powi(5) + 1000.0 / 1.1_f64.powi(5);
        assert_relative_eq!(ev, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_terminal_exponent_tracks_sequence_length() {
        let ev = present_value(&[0.0, 0.0, 0.0], 1000.0, 0.10);
        assert_relative_eq!(ev, 1000.0 / 1.1_f64.powi(3), max_relative = 1e-12);
    }

    #[test]
    fn test_run_scenario_composes_steps() {
        let result = run_scenario(STARTING_REVENUE, &AssumptionSet::BASE).unwrap();

        let fcf = project_free_cash_flow(STARTING_REVENUE, &AssumptionSet::BASE, 5).unwrap();
        let tv = compute_terminal_value(fcf[4], &AssumptionSet::BASE).unwrap();
        let ev = present_value(&fcf, tv, 0.10);

        assert_eq!(result.fcf_projections, fcf);
        assert_eq!(result.terminal_value, tv);
        assert_eq!(result.enterprise_value, ev);
        assert_eq!(result.horizon_years(), 5);
        assert_relative_eq!(
            result.pv_fcf_total() + result.pv_terminal_value,
            result.enterprise_value,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_terminal_value_dominates_base_case() {
        let result = run_scenario(STARTING_REVENUE, &AssumptionSet::BASE).unwrap();
        let share = result.terminal_value_share().unwrap();
        assert!(share > 0.5 && share < 1.0, "terminal share {}", share);
    }

    #[test]
    fn test_engine_honours_horizon() {
        let engine = ProjectionEngine::new(AssumptionSet::BULL, ProjectionConfig { horizon_years: 8 });
        let result = engine.project(STARTING_REVENUE).unwrap();
        assert_eq!(result.fcf_projections.len(), 8);
        assert_eq!(result.years.last().unwrap().year, 8);
    }
}
