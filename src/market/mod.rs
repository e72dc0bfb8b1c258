//! Market data collaborator boundary
//!
//! The valuation core never fetches data itself. Providers implement
//! [`MarketDataProvider`] and report every miss as a [`MarketDataError`];
//! callers decide which fallback to substitute.

mod quotes;
pub mod loader;

pub use quotes::{Quote, StaticMarketData};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::MarketDataError;

/// Fallback share price when the provider has none
pub const DEFAULT_CURRENT_PRICE: f64 = 800.0;

/// Fallback trailing revenue when the provider has none
pub const DEFAULT_TOTAL_REVENUE: f64 = 20_000_000_000.0;

/// Subject company of the valuation
pub const DEFAULT_SUBJECT_TICKER: &str = "ASML";

/// Peer universe for the comparables table
pub const DEFAULT_COMPARABLES: [&str; 4] = ["LRCX", "AMAT", "KLAC", "TER"];

/// Peer valuation multiples as returned by a provider; any field may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialMultiples {
    pub ev_to_ebitda: Option<f64>,
    pub price_to_earnings: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub return_on_equity: Option<f64>,
}

/// Per-ticker multiples lookup used by the comparables builder
pub trait MetricsLookup: Sync {
    fn fetch_comparable_metrics(&self, ticker: &str) -> Result<PartialMultiples, MarketDataError>;
}

impl<F> MetricsLookup for F
where
    F: Fn(&str) -> Result<PartialMultiples, MarketDataError> + Sync,
{
    fn fetch_comparable_metrics(&self, ticker: &str) -> Result<PartialMultiples, MarketDataError> {
        self(ticker)
    }
}

/// Source of market data for the subject company and its peers
pub trait MarketDataProvider: MetricsLookup {
    /// Ticker whose price and revenue this provider reports
    fn subject(&self) -> &str;

    fn fetch_current_price(&self) -> Result<f64, MarketDataError>;

    fn fetch_total_revenue(&self) -> Result<f64, MarketDataError>;
}

/// Provider that never has data
#[derive(Debug, Clone, Default)]
pub struct Unavailable {
    subject: String,
}

impl Unavailable {
    pub fn new(subject: impl Into<String>) -> Self {
        Self { subject: subject.into() }
    }
}

impl MetricsLookup for Unavailable {
    fn fetch_comparable_metrics(&self, ticker: &str) -> Result<PartialMultiples, MarketDataError> {
        Err(MarketDataError::UnknownTicker(ticker.to_string()))
    }
}

impl MarketDataProvider for Unavailable {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn fetch_current_price(&self) -> Result<f64, MarketDataError> {
        Err(MarketDataError::Unavailable {
            ticker: self.subject.clone(),
            what: "current price",
        })
    }

    fn fetch_total_revenue(&self) -> Result<f64, MarketDataError> {
        Err(MarketDataError::Unavailable {
            ticker: self.subject.clone(),
            what: "total revenue",
        })
    }
}

/// Where a resolved input came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Provider,
    Default,
    Override,
}

/// A figure together with its source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sourced {
    pub value: f64,
    pub source: InputSource,
}

impl Sourced {
    /// Take the provider value, or fall back to `default` and log the miss
    pub fn or_default(fetched: Result<f64, MarketDataError>, default: f64) -> Self {
        match fetched {
            Ok(value) => Self { value, source: InputSource::Provider },
            Err(e) => {
                warn!("{}; using default {}", e, default);
                Self { value: default, source: InputSource::Default }
            }
        }
    }

    pub fn overridden(value: f64) -> Self {
        Self { value, source: InputSource::Override }
    }
}

/// Subject company inputs after fallback substitution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketInputs {
    pub current_price: Sourced,
    pub total_revenue: Sourced,
}

impl MarketInputs {
    /// Fetch price and revenue, substituting the documented defaults on failure
    pub fn resolve<P: MarketDataProvider + ?Sized>(provider: &P) -> Self {
        Self::resolve_with(provider, DEFAULT_CURRENT_PRICE, DEFAULT_TOTAL_REVENUE)
    }

    pub fn resolve_with<P: MarketDataProvider + ?Sized>(
        provider: &P,
        default_price: f64,
        default_revenue: f64,
    ) -> Self {
        Self {
            current_price: Sourced::or_default(provider.fetch_current_price(), default_price),
            total_revenue: Sourced::or_default(provider.fetch_total_revenue(), default_revenue),
        }
    }
}
