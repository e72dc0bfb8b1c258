//! In-memory market data keyed by ticker

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{MarketDataProvider, MetricsLookup, PartialMultiples};
use crate::error::MarketDataError;

/// Everything a provider may know about one ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub total_revenue: Option<f64>,
    #[serde(default)]
    pub ev_to_ebitda: Option<f64>,
    #[serde(default)]
    pub price_to_earnings: Option<f64>,
    #[serde(default)]
    pub price_to_sales: Option<f64>,
    #[serde(default)]
    pub return_on_equity: Option<f64>,
}

impl Quote {
    pub fn multiples(&self) -> PartialMultiples {
        PartialMultiples {
            ev_to_ebitda: self.ev_to_ebitda,
            price_to_earnings: self.price_to_earnings,
            price_to_sales: self.price_to_sales,
            return_on_equity: self.return_on_equity,
        }
    }
}

/// Provider backed by a fixed set of quotes
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    subject: String,
    quotes: HashMap<String, Quote>,
}

impl StaticMarketData {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            quotes: HashMap::new(),
        }
    }

    /// Add or replace a quote
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.insert(quote);
        self
    }

    pub fn insert(&mut self, quote: Quote) {
        self.quotes.insert(quote.ticker.to_ascii_uppercase(), quote);
    }

    pub fn quote(&self, ticker: &str) -> Option<&Quote> {
        self.quotes.get(&ticker.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    fn subject_field(
        &self,
        what: &'static str,
        field: impl Fn(&Quote) -> Option<f64>,
    ) -> Result<f64, MarketDataError> {
        let quote = self
            .quote(&self.subject)
            .ok_or_else(|| MarketDataError::UnknownTicker(self.subject.clone()))?;

        field(quote)
            .filter(|v| v.is_finite())
            .ok_or_else(|| MarketDataError::Unavailable {
                ticker: self.subject.clone(),
                what,
            })
    }
}

impl MetricsLookup for StaticMarketData {
    fn fetch_comparable_metrics(&self, ticker: &str) -> Result<PartialMultiples, MarketDataError> {
        self.quote(ticker)
            .map(Quote::multiples)
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.to_string()))
    }
}

impl MarketDataProvider for StaticMarketData {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn fetch_current_price(&self) -> Result<f64, MarketDataError> {
        self.subject_field("current price", |q| q.current_price)
    }

    fn fetch_total_revenue(&self) -> Result<f64, MarketDataError> {
        self.subject_field("total revenue", |q| q.total_revenue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StaticMarketData {
        StaticMarketData::new("ASML")
            .with_quote(Quote {
                ticker: "ASML".to_string(),
                current_price: Some(750.0),
                total_revenue: Some(27_500_000_000.0),
                ..Quote::default()
            })
            .with_quote(Quote {
                ticker: "amat".to_string(),
                ev_to_ebitda: Some(15.2),
                price_to_earnings: Some(21.0),
                ..Quote::default()
            })
    }

    #[test]
    fn test_subject_figures() {
        let data = sample();
        assert_eq!(data.fetch_current_price(), Ok(750.0));
        assert_eq!(data.fetch_total_revenue(), Ok(27_500_000_000.0));
    }

    #[test]
    fn test_ticker_lookup_is_case_insensitive() {
        let data = sample();
        let metrics = data.fetch_comparable_metrics("AMAT").unwrap();
        assert_eq!(metrics.ev_to_ebitda, Some(15.2));
        assert_eq!(metrics.price_to_sales, None);
    }

    #[test]
    fn test_unknown_ticker() {
        let data = sample();
        assert_eq!(
            data.fetch_comparable_metrics("KLAC"),
            Err(MarketDataError::UnknownTicker("KLAC".to_string()))
        );

        let empty = StaticMarketData::new("ASML");
        assert!(empty.is_empty());
        assert!(matches!(empty.fetch_current_price(), Err(MarketDataError::UnknownTicker(_))));
    }

    #[test]
    fn test_missing_subject_field() {
        let data = StaticMarketData::new("ASML").with_quote(Quote {
            ticker: "ASML".to_string(),
            ..Quote::default()
        });
        assert_eq!(
            data.fetch_total_revenue(),
            Err(MarketDataError::Unavailable {
                ticker: "ASML".to_string(),
                what: "total revenue",
            })
        );
    }
}
