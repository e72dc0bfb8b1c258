//! Annual discounting at a flat rate
//!
//! Cash flows are assumed to arrive at the end of each year, so year `t`
//! (1-indexed) is discounted by `(1 + rate)^t`.

use serde::{Deserialize, Serialize};

/// Flat annual discount curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    /// Annual discount rate (typically the WACC)
    pub rate: f64,
}

impl DiscountCurve {
    pub fn flat(rate: f64) -> Self {
        Self { rate }
    }

    /// Discount factor to the end of a given year
    pub fn discount_factor(&self, year: u32) -> f64 {
        1.0 / self.growth_factor(year)
    }

    /// Present value of a single amount received at the end of `year`
    pub fn present_value(&self, amount: f64, year: u32) -> f64 {
        amount / self.growth_factor(year)
    }

    /// `(1 + rate)^year`; years beyond i32 range use the exponent in floating point
    fn growth_factor(&self, year: u32) -> f64 {
        match i32::try_from(year) {
            Ok(n) => (1.0 + self.rate).powi(n),
            Err(_) => (1.0 + self.rate).powf(f64::from(year)),
        }
    }

    /// Present value of a yearly stream, first element received at the end of year 1
    pub fn pv_stream(&self, amounts: &[f64]) -> f64 {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| self.present_value(*amount, i as u32 + 1))
            .sum()
    }
}
