//! Comparable company multiples table
//!
//! One row per peer ticker, in input order. Missing multiples are filled from
//! defaults field by field; a failed lookup degrades the whole row to defaults
//! and never aborts the table.

use std::fmt;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::market::{MetricsLookup, PartialMultiples};

/// One of the four reported multiples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Multiple {
    EvToEbitda,
    PriceToEarnings,
    PriceToSales,
    ReturnOnEquity,
}

impl Multiple {
    pub const ALL: [Multiple; 4] = [
        Multiple::EvToEbitda,
        Multiple::PriceToEarnings,
        Multiple::PriceToSales,
        Multiple::ReturnOnEquity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Multiple::EvToEbitda => "EV/EBITDA",
            Multiple::PriceToEarnings => "P/E",
            Multiple::PriceToSales => "P/S",
            Multiple::ReturnOnEquity => "ROE",
        }
    }
}

impl fmt::Display for Multiple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complete set of peer multiples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multiples {
    pub ev_to_ebitda: f64,
    pub price_to_earnings: f64,
    pub price_to_sales: f64,
    pub return_on_equity: f64,
}

impl Multiples {
    /// Fallback multiples: EV/EBITDA 20, P/E 30, P/S 10, ROE 25%
    pub const DEFAULTS: Multiples = Multiples {
        ev_to_ebitda: 20.0,
        price_to_earnings: 30.0,
        price_to_sales: 10.0,
        return_on_equity: 0.25,
    };

    pub fn get(&self, multiple: Multiple) -> f64 {
        match multiple {
            Multiple::EvToEbitda => self.ev_to_ebitda,
            Multiple::PriceToEarnings => self.price_to_earnings,
            Multiple::PriceToSales => self.price_to_sales,
            Multiple::ReturnOnEquity => self.return_on_equity,
        }
    }

    /// Fill each missing field from `self`, returning the filled fields
    fn fill(&self, partial: &PartialMultiples) -> (Multiples, Vec<Multiple>) {
        let mut substituted = Vec::new();
        let mut pick = |found: Option<f64>, multiple: Multiple| match found.filter(|v| v.is_finite()) {
            Some(v) => v,
            None => {
                substituted.push(multiple);
                self.get(multiple)
            }
        };

        let filled = Multiples {
            ev_to_ebitda: pick(partial.ev_to_ebitda, Multiple::EvToEbitda),
            price_to_earnings: pick(partial.price_to_earnings, Multiple::PriceToEarnings),
            price_to_sales: pick(partial.price_to_sales, Multiple::PriceToSales),
            return_on_equity: pick(partial.return_on_equity, Multiple::ReturnOnEquity),
        };
        (filled, substituted)
    }
}

impl Default for Multiples {
    fn default() -> Self {
        Self::DEFAULTS
    }
}

/// One peer in the comparables table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableRow {
    pub ticker: String,
    #[serde(flatten)]
    pub multiples: Multiples,

    /// Multiples that came from defaults rather than the lookup
    pub substituted: Vec<Multiple>,
}

impl ComparableRow {
    pub fn is_fully_defaulted(&self) -> bool {
        self.substituted.len() == Multiple::ALL.len()
    }
}

/// Build the comparables table for `tickers`, in input order
pub fn build_comparables_table<L, S>(
    tickers: &[S],
    lookup: &L,
    defaults: &Multiples,
) -> Vec<ComparableRow>
where
    L: MetricsLookup + ?Sized,
    S: AsRef<str> + Sync,
{
    tickers
        .par_iter()
        .map(|ticker| comparable_row(ticker.as_ref(), lookup, defaults))
        .collect()
}

fn comparable_row<L: MetricsLookup + ?Sized>(
    ticker: &str,
    lookup: &L,
    defaults: &Multiples,
) -> ComparableRow {
    let partial = match lookup.fetch_comparable_metrics(ticker) {
        Ok(partial) => partial,
        Err(e) => {
            warn!("Could not fetch data for {}: {}. Using default values", ticker, e);
            PartialMultiples::default()
        }
    };

    let (multiples, substituted) = defaults.fill(&partial);
    if !substituted.is_empty() {
        debug!("{}: defaulted {:?}", ticker, substituted);
    }

    ComparableRow {
        ticker: ticker.to_string(),
        multiples,
        substituted,
    }
}
