//! DCF projection: yearly free cash flow, terminal value and enterprise value

mod cashflows;
mod discount;
mod engine;

pub use cashflows::{ProjectionResult, YearProjection};
pub use discount::DiscountCurve;
pub use engine::{
    check_horizon, compute_terminal_value, present_value, project_free_cash_flow, project_years,
    run_scenario, ProjectionConfig, ProjectionEngine, DEFAULT_HORIZON_YEARS, MAX_HORIZON_YEARS,
};
