//! AWS Lambda handler for running a valuation
//!
//! Accepts a JSON request through a Lambda Function URL and returns the
//! valuation report as JSON. Market data is supplied in the request; anything
//! missing falls back to the documented defaults.

use std::collections::BTreeMap;

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::Deserialize;

use dcf_valuation::{
    analysis::{run_analysis, AnalysisConfig},
    assumptions::{AssumptionSet, Scenario, ScenarioBook},
    comparables::Multiples,
    market::{Quote, StaticMarketData, DEFAULT_COMPARABLES, DEFAULT_SUBJECT_TICKER},
    projection::{ProjectionConfig, DEFAULT_HORIZON_YEARS},
    report::{current_year, ValuationReport},
    ScenarioRunner, ValuationError,
};

/// Input configuration for the valuation
#[derive(Debug, Deserialize)]
pub struct ValuationRequest {
    /// Subject company ticker (default: ASML)
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Starting revenue; falls back to the subject quote, then to the default
    #[serde(default)]
    pub starting_revenue: Option<f64>,

    /// Current share price of the subject
    #[serde(default)]
    pub current_price: Option<f64>,

    /// Explicit projection horizon (default: 5)
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,

    /// Fiscal year preceding projection year 1 (default: current year)
    #[serde(default)]
    pub base_year: Option<i32>,

    /// Per-scenario assumption overrides, e.g. {"Bull": {...}}
    #[serde(default)]
    pub assumptions: BTreeMap<Scenario, AssumptionSet>,

    /// Peer tickers (default: LRCX, AMAT, KLAC, TER)
    #[serde(default = "default_comparables")]
    pub comparables: Vec<String>,

    /// Known quotes for the subject and peers
    #[serde(default)]
    pub quotes: Vec<Quote>,

    /// Multiples substituted for missing peer data
    #[serde(default)]
    pub default_multiples: Option<Multiples>,
}

fn default_subject() -> String { DEFAULT_SUBJECT_TICKER.to_string() }
fn default_horizon() -> u32 { DEFAULT_HORIZON_YEARS }
fn default_comparables() -> Vec<String> { DEFAULT_COMPARABLES.iter().map(|t| t.to_string()).collect() }

/// Rejected request: HTTP status and message
#[derive(Debug)]
struct Rejection {
    status: i64,
    message: String,
}

impl Rejection {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self { status: 422, message: message.into() }
    }
}

fn value_request(request: ValuationRequest) -> Result<ValuationReport, Rejection> {
    let mut book = ScenarioBook::presets();
    for (scenario, set) in request.assumptions {
        // Divergent sets are valued and reported as failed scenarios
        if let Err(e @ ValuationError::InvalidAssumption { .. }) = set.validate() {
            return Err(Rejection::unprocessable(e.in_scenario(scenario).to_string()));
        }
        book = book.with(scenario, set);
    }

    let mut provider = StaticMarketData::new(request.subject.clone());
    for quote in request.quotes {
        provider.insert(quote);
    }
    if let Some(price) = request.current_price {
        let mut subject = provider.quote(&request.subject).cloned().unwrap_or_else(|| Quote {
            ticker: request.subject.clone(),
            ..Quote::default()
        });
        subject.current_price = Some(price);
        provider.insert(subject);
    }

    let runner = ScenarioRunner::with_book(book).with_config(ProjectionConfig {
        horizon_years: request.horizon_years,
    });

    let config = AnalysisConfig {
        comparables: request.comparables,
        default_multiples: request.default_multiples.unwrap_or(Multiples::DEFAULTS),
        revenue_override: request.starting_revenue,
        base_year: request.base_year.unwrap_or_else(current_year),
    };

    run_analysis(&provider, &runner, &config).map_err(|e| Rejection::unprocessable(e.to_string()))
}

fn response(status: i64, body: String) -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code: status,
        headers: Default::default(),
        body: Some(body),
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn error_response(status: i64, message: &str) -> LambdaFunctionUrlResponse {
    response(status, serde_json::json!({ "error": message }).to_string())
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<LambdaFunctionUrlResponse, Error> {
    let start = std::time::Instant::now();
    let body = event.payload.body.unwrap_or_else(|| "{}".to_string());

    let request: ValuationRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Rejected request: {}", e);
            return Ok(error_response(400, &format!("Invalid JSON: {}", e)));
        }
    };

    let report = match value_request(request) {
        Ok(report) => report,
        Err(rejection) => {
            warn!("Rejected request: {}", rejection.message);
            return Ok(error_response(rejection.status, &rejection.message));
        }
    };

    info!("Valued {} in {:?}", report.subject, start.elapsed());
    Ok(response(200, serde_json::to_string(&report)?))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ValuationRequest {
        serde_json::from_str(json).expect("request should parse")
    }

    #[test]
    fn test_empty_request_uses_defaults() {
        let request = parse("{}");
        assert_eq!(request.subject, "ASML");
        assert_eq!(request.horizon_years, 5);
        assert_eq!(request.comparables, vec!["LRCX", "AMAT", "KLAC", "TER"]);

        let report = value_request(request).unwrap();
        assert_eq!(report.market.total_revenue.value, 20_000_000_000.0);
        assert_eq!(report.scenarios.len(), 3);
        assert_eq!(report.comparables.len(), 4);
    }

    #[test]
    fn test_request_quotes_and_price() {
        let request = parse(
            r#"{
                "starting_revenue": 28000000000,
                "current_price": 700.0,
                "comparables": ["LRCX"],
                "quotes": [{"ticker": "LRCX", "ev_to_ebitda": 19.0}]
            }"#,
        );

        let report = value_request(request).unwrap();
        assert_eq!(report.market.current_price.value, 700.0);
        assert_eq!(report.market.total_revenue.value, 28_000_000_000.0);
        assert_eq!(report.comparables[0].multiples.ev_to_ebitda, 19.0);
        assert_eq!(report.comparables[0].substituted.len(), 3);
    }

    #[test]
    fn test_divergent_override_reported_as_failed_scenario() {
        let request = parse(
            r#"{"assumptions": {"Bear": {
                "revenue_growth": 0.1, "ebitda_margin": 0.3, "tax_rate": 0.15,
                "capex_percent": 0.12, "working_capital_percent": 0.18,
                "wacc": 0.02, "terminal_growth": 0.02
            }}}"#,
        );

        let report = value_request(request).unwrap();
        let bear = report.outcome(Scenario::Bear).unwrap();
        assert!(bear.result.is_none());
        assert!(bear.error.is_some());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let request = parse(
            r#"{"assumptions": {"Base": {
                "revenue_growth": 0.15, "ebitda_margin": 1.5, "tax_rate": 0.15,
                "capex_percent": 0.10, "working_capital_percent": 0.15,
                "wacc": 0.10, "terminal_growth": 0.03
            }}}"#,
        );

        let rejection = value_request(request).unwrap_err();
        assert_eq!(rejection.status, 422);
        assert!(rejection.message.contains("ebitda_margin"));
    }

    #[test]
    fn test_zero_revenue_rejected() {
        let rejection = value_request(parse(r#"{"starting_revenue": 0}"#)).unwrap_err();
        assert_eq!(rejection.status, 422);
    }

    #[test]
    fn test_oversized_horizon_rejected() {
        let rejection = value_request(parse(r#"{"horizon_years": 4000000000}"#)).unwrap_err();
        assert_eq!(rejection.status, 422);
        assert!(rejection.message.contains("invalid horizon"), "{}", rejection.message);

        assert!(value_request(parse(r#"{"horizon_years": 100}"#)).is_ok());
    }
}
