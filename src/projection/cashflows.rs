//! Cash flow output structures for DCF projections

use serde::{Deserialize, Serialize};

/// A single projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    /// Projection year (1-indexed)
    pub year: u32,

    // Operating build-up
    pub revenue: f64,
    pub ebitda: f64,
    pub taxes: f64,
    pub capex: f64,
    pub working_capital: f64,

    /// ebitda - taxes - capex - working_capital
    pub fcf: f64,

    // Discounting
    pub discount_factor: f64,
    pub pv_fcf: f64,
}

impl YearProjection {
    /// Create an empty row for a given year
    pub fn new(year: u32) -> Self {
        Self {
            year,
            revenue: 0.0,
            ebitda: 0.0,
            taxes: 0.0,
            capex: 0.0,
            working_capital: 0.0,
            fcf: 0.0,
            discount_factor: 1.0,
            pv_fcf: 0.0,
        }
    }
}

/// Complete DCF result for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Sum of discounted FCF and discounted terminal value
    pub enterprise_value: f64,

    /// Undiscounted Gordon growth value at the end of the horizon
    pub terminal_value: f64,

    /// Terminal value discounted over the full horizon
    pub pv_terminal_value: f64,

    /// Yearly FCF, year 1 first
    pub fcf_projections: Vec<f64>,

    /// Full yearly build-up behind `fcf_projections`
    pub years: Vec<YearProjection>,
}

impl ProjectionResult {
    pub fn horizon_years(&self) -> u32 {
        self.fcf_projections.len() as u32
    }

    /// Sum of discounted yearly FCF
    pub fn pv_fcf_total(&self) -> f64 {
        self.years.iter().map(|y| y.pv_fcf).sum()
    }

    /// Share of enterprise value coming from the discounted terminal value
    pub fn terminal_value_share(&self) -> Option<f64> {
        if self.enterprise_value.abs() < 1e-12 {
            None
        } else {
            Some(self.pv_terminal_value / self.enterprise_value)
        }
    }
}
