//! Load quotes from a CSV file
//!
//! Empty cells mean the figure is unavailable for that ticker.

use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::debug;

use super::{Quote, StaticMarketData};
use crate::error::LoadError;

/// Default path to the quotes file
pub const DEFAULT_QUOTES_PATH: &str = "data/market/quotes.csv";

/// Raw CSV row matching quotes.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "CurrentPrice")]
    current_price: Option<f64>,
    #[serde(rename = "TotalRevenue")]
    total_revenue: Option<f64>,
    #[serde(rename = "EnterpriseToEbitda")]
    enterprise_to_ebitda: Option<f64>,
    #[serde(rename = "TrailingPE")]
    trailing_pe: Option<f64>,
    #[serde(rename = "PriceToSales")]
    price_to_sales: Option<f64>,
    #[serde(rename = "ReturnOnEquity")]
    return_on_equity: Option<f64>,
}

impl From<CsvRow> for Quote {
    fn from(row: CsvRow) -> Self {
        Quote {
            ticker: row.ticker.trim().to_string(),
            current_price: row.current_price,
            total_revenue: row.total_revenue,
            ev_to_ebitda: row.enterprise_to_ebitda,
            price_to_earnings: row.trailing_pe,
            price_to_sales: row.price_to_sales,
            return_on_equity: row.return_on_equity,
        }
    }
}

/// Load all quotes from a CSV file
pub fn load_quotes<P: AsRef<Path>>(path: P, subject: &str) -> Result<StaticMarketData, LoadError> {
    let reader = Reader::from_path(path)?;
    collect_quotes(reader, subject)
}

/// Load quotes from any reader (e.g., string buffer, request body)
pub fn load_quotes_from_reader<R: Read>(
    reader: R,
    subject: &str,
) -> Result<StaticMarketData, LoadError> {
    collect_quotes(Reader::from_reader(reader), subject)
}

fn collect_quotes<R: Read>(mut reader: Reader<R>, subject: &str) -> Result<StaticMarketData, LoadError> {
    let mut data = StaticMarketData::new(subject);

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        data.insert(row.into());
    }

    debug!("Loaded {} quotes", data.len());
    Ok(data)
}
