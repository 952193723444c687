//! Market query fetcher: one POST to the market-data endpoint per call.

use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::category::CategoryView;

pub const DEFAULT_ENDPOINT_URL: &str = "https://clob.polymarket.com/query";

pub const MARKETS_QUERY: &str = "query GetMarkets($category: String) {
  markets(where: { category: $category }, orderBy: volume, orderDirection: desc) {
    id
    question
    category
    volume
    outcomes {
      price
      totalVolumeYes
      totalVolumeNo
    }
    endDate
  }
}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub endpoint_url: String,
    pub http_timeout_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            http_timeout_ms: 10_000,
        }
    }
}

/// A numeric field as the server sends it: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl RawNumber {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutcome {
    #[serde(default)]
    pub price: Option<RawNumber>,
    #[serde(default)]
    pub total_volume_yes: Option<RawNumber>,
    #[serde(default)]
    pub total_volume_no: Option<RawNumber>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarket {
    pub id: String,
    pub question: String,
    pub category: String,
    pub volume: RawNumber,
    pub outcomes: Vec<RawOutcome>,
    pub end_date: RawNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketQueryRequest {
    pub query: &'static str,
    pub variables: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP client build error: {0}")]
    HttpClientBuild(String),
    #[error("invalid endpoint URL '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },
    #[error("HTTP request failed for {url}: {message}")]
    HttpRequest { url: String, message: String },
    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response envelope is missing {0}")]
    MissingEnvelope(&'static str),
    #[error("query returned errors: {0}")]
    QueryErrors(String),
    #[error("market at index {index} could not be decoded: {message}")]
    MarketDecode { index: usize, message: String },
}

/// Outbound transport for the query endpoint.
pub trait MarketTransport: Send + Sync {
    fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, FetchError>;
}

pub struct ReqwestBlockingTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestBlockingTransport {
    pub fn new(timeout_ms: u64) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| FetchError::HttpClientBuild(err.to_string()))?;
        Ok(Self { client })
    }
}

impl MarketTransport for ReqwestBlockingTransport {
    fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| FetchError::HttpRequest {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| FetchError::HttpRequest {
                url: url.to_string(),
                message: err.to_string(),
            })
    }
}

pub struct MarketFetcher {
    endpoint_url: String,
    transport: Box<dyn MarketTransport>,
}

impl MarketFetcher {
    pub fn new(cfg: &FetcherConfig) -> Result<Self, FetchError> {
        reqwest::Url::parse(&cfg.endpoint_url).map_err(|err| FetchError::InvalidEndpoint {
            url: cfg.endpoint_url.clone(),
            message: err.to_string(),
        })?;
        let transport = ReqwestBlockingTransport::new(cfg.http_timeout_ms)?;
        Ok(Self::with_transport(cfg.endpoint_url.clone(), transport))
    }

    pub fn with_transport(
        endpoint_url: impl Into<String>,
        transport: impl MarketTransport + 'static,
    ) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            transport: Box::new(transport),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Runs the markets query once. Failures are returned as-is; there is no retry.
    pub fn fetch_markets(&self, view: &CategoryView) -> Result<Vec<RawMarket>, FetchError> {
        let started = Instant::now();
        info!(
            component = "fetcher",
            event = "fetch.start",
            endpoint = %self.endpoint_url,
            category_view = %view
        );

        let result = self.fetch_markets_inner(view);
        match &result {
            Ok(markets) => info!(
                component = "fetcher",
                event = "fetch.finish",
                market_count = markets.len(),
                elapsed_ms = started.elapsed().as_millis() as u64
            ),
            Err(err) => warn!(
                component = "fetcher",
                event = "fetch.error",
                endpoint = %self.endpoint_url,
                error = %err
            ),
        }
        result
    }

    fn fetch_markets_inner(&self, view: &CategoryView) -> Result<Vec<RawMarket>, FetchError> {
        let request = build_markets_request(view);
        let body = serde_json::to_vec(&request)?;
        let payload = self.transport.post_json(&self.endpoint_url, body)?;
        parse_markets_envelope(&payload)
    }
}

pub fn build_markets_request(view: &CategoryView) -> MarketQueryRequest {
    let mut variables = Map::new();
    if let Some(category) = view.server_filter() {
        variables.insert("category".to_string(), Value::String(category.to_string()));
    }

    MarketQueryRequest {
        query: MARKETS_QUERY,
        variables,
    }
}

pub fn parse_markets_envelope(payload: &[u8]) -> Result<Vec<RawMarket>, FetchError> {
    let envelope: Value = serde_json::from_slice(payload)?;

    let data = match envelope.get("data") {
        Some(data) if !data.is_null() => data,
        _ => {
            if let Some(message) = first_query_error(&envelope) {
                return Err(FetchError::QueryErrors(message));
            }
            return Err(FetchError::MissingEnvelope("data"));
        }
    };

    let markets = data
        .get("markets")
        .and_then(Value::as_array)
        .ok_or(FetchError::MissingEnvelope("data.markets"))?;

    markets
        .iter()
        .enumerate()
        .map(|(index, market)| {
            RawMarket::deserialize(market).map_err(|err| FetchError::MarketDecode {
                index,
                message: err.to_string(),
            })
        })
        .collect()
}

fn first_query_error(envelope: &Value) -> Option<String> {
    envelope
        .get("errors")?
        .as_array()?
        .first()
        .map(|entry| {
            entry
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| entry.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingTransport {
        response: Vec<u8>,
        requests: Arc<Mutex<Vec<(String, Value)>>>,
    }

    impl RecordingTransport {
        fn responding(body: &str) -> Self {
            Self {
                response: body.as_bytes().to_vec(),
                requests: Arc::default(),
            }
        }
    }

    impl MarketTransport for RecordingTransport {
        fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, FetchError> {
            let parsed: Value = serde_json::from_slice(&body).unwrap();
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), parsed));
            Ok(self.response.clone())
        }
    }

    const ONE_MARKET: &str = r#"{"data":{"markets":[{"id":"m1","question":"Will it?","category":"Crypto","volume":"1000.5","outcomes":[{"price":"0.6","totalVolumeYes":"600"},{"price":"0.4","totalVolumeNo":"400"}],"endDate":"1700000000"}]}}"#;

    #[test]
    fn malformed_endpoint_is_rejected_before_any_request() {
        let err = MarketFetcher::new(&FetcherConfig {
            endpoint_url: "not a url".to_string(),
            ..FetcherConfig::default()
        })
        .err()
        .expect("endpoint should not parse");
        assert!(matches!(
            err,
            FetchError::InvalidEndpoint { ref url, .. } if url == "not a url"
        ));
    }

    #[test]
    fn all_view_sends_empty_variables() {
        let request = build_markets_request(&CategoryView::All);
        assert!(request.variables.is_empty());
        assert!(request.query.contains("orderBy: volume, orderDirection: desc"));
    }

    #[test]
    fn named_view_sends_exact_category_value() {
        let request = build_markets_request(&CategoryView::Named("Weather".to_string()));
        assert_eq!(request.variables.len(), 1);
        assert_eq!(request.variables["category"], "Weather");
    }

    #[test]
    fn fetcher_posts_query_document_to_configured_endpoint() {
        let transport = RecordingTransport::responding(ONE_MARKET);
        let requests = Arc::clone(&transport.requests);
        let fetcher = MarketFetcher::with_transport("http://mock.local/query", transport);

        let markets = fetcher
            .fetch_markets(&CategoryView::Named("Crypto".to_string()))
            .expect("mock fetch should succeed");

        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].id, "m1");
        assert_eq!(markets[0].volume, RawNumber::from("1000.5"));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "http://mock.local/query");
        assert_eq!(requests[0].1["variables"]["category"], "Crypto");
        assert!(requests[0].1["query"]
            .as_str()
            .unwrap()
            .contains("totalVolumeYes"));
    }

    #[test]
    fn numeric_fields_accept_json_numbers() {
        let payload = r#"{"data":{"markets":[{"id":"m2","question":"q","category":"Sports","volume":12.5,"outcomes":[],"endDate":1700000000}]}}"#;
        let markets = parse_markets_envelope(payload.as_bytes()).unwrap();
        assert_eq!(markets[0].volume.as_text(), "12.5");
        assert_eq!(markets[0].end_date.as_text(), "1700000000");
    }

    #[test]
    fn missing_envelope_is_an_error() {
        let err = parse_markets_envelope(br#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, FetchError::MissingEnvelope("data.markets")));

        let err = parse_markets_envelope(br#"{"something":1}"#).unwrap_err();
        assert!(matches!(err, FetchError::MissingEnvelope("data")));
    }

    #[test]
    fn graphql_errors_surface_first_message() {
        let err =
            parse_markets_envelope(br#"{"data":null,"errors":[{"message":"bad category"}]}"#)
                .unwrap_err();
        match err {
            FetchError::QueryErrors(message) => assert_eq!(message, "bad category"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_market_reports_index() {
        let payload = r#"{"data":{"markets":[{"id":"m1"}]}}"#;
        let err = parse_markets_envelope(payload.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::MarketDecode { index: 0, .. }));
    }

    #[test]
    fn non_json_body_is_an_error() {
        let err = parse_markets_envelope(b"<html>").unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }
}
