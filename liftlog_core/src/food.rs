//! Food-database proxy.
//!
//! Two endpoints forward to a public food database: free-text search and
//! barcode lookup. Upstream products are normalized into `FoodProduct`.
//! Every response carries CORS headers and failures are reported as an
//! `{ "error": ... }` body with a matching HTTP status:
//!
//! | Situation                 | Status |
//! |---------------------------|--------|
//! | missing/invalid parameter | 400    |
//! | no upstream results       | 404    |
//! | upstream failure          | 500    |
//! | upstream timeout          | 504    |

use crate::config::FoodConfig;
use crate::types::FoodProduct;
use crate::Result;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "authorization, x-client-info, apikey, content-type",
    ),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
];

const UNKNOWN_PRODUCT: &str = "Unknown product";

// ============================================================================
// Upstream
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FoodSourceError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream answered HTTP {0}")]
    Status(u16),

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream sent an unreadable body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FoodSourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FoodSourceError::Timeout
        } else if e.is_decode() {
            FoodSourceError::Decode(e.to_string())
        } else {
            FoodSourceError::Transport(e.to_string())
        }
    }
}

pub type SourceResult<T> = std::result::Result<T, FoodSourceError>;

/// A public food database
pub trait FoodSource {
    fn search(&self, query: &str, limit: u32) -> SourceResult<Vec<FoodProduct>>;

    /// `Ok(None)` when the barcode is unknown upstream
    fn lookup_barcode(&self, barcode: &str) -> SourceResult<Option<FoodProduct>>;
}

/// Raw product as returned by Open Food Facts
#[derive(Debug, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub nutriments: Map<String, Value>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct BarcodeBody {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    product: Option<RawProduct>,
}

/// Nutriment values are sometimes sent as strings
fn nutriment(nutriments: &Map<String, Value>, key: &str) -> f64 {
    match nutriments.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Map an upstream product onto the normalized shape, per 100 g
pub fn normalize(raw: RawProduct) -> FoodProduct {
    let calories = match nutriment(&raw.nutriments, "energy-kcal_100g") {
        kcal if kcal > 0.0 => kcal,
        // Some products only report kJ
        _ => nutriment(&raw.nutriments, "energy_100g") / 4.184,
    };

    FoodProduct {
        name: non_blank(raw.product_name).unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
        brand: non_blank(raw.brands),
        calories,
        protein: nutriment(&raw.nutriments, "proteins_100g"),
        fat: nutriment(&raw.nutriments, "fat_100g"),
        carbs: nutriment(&raw.nutriments, "carbohydrates_100g"),
        sugar: nutriment(&raw.nutriments, "sugars_100g"),
        image_url: non_blank(raw.image_url),
    }
}

/// Blocking client for the Open Food Facts API
pub struct OpenFoodFactsClient {
    base_url: String,
    client: Client,
}

impl OpenFoodFactsClient {
    pub fn new(config: &FoodConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl FoodSource for OpenFoodFactsClient {
    fn search(&self, query: &str, limit: u32) -> SourceResult<Vec<FoodProduct>> {
        let url = format!("{}/cgi/search.pl", self.base_url);
        let page_size = limit.to_string();
        let response = self
            .client
            .get(url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(FoodSourceError::Status(response.status().as_u16()));
        }

        let body: SearchBody = response.json()?;
        let products: Vec<FoodProduct> = body
            .products
            .into_iter()
            .filter(|p| non_blank(p.product_name.clone()).is_some())
            .map(normalize)
            .collect();

        tracing::debug!("Food search {:?} returned {} products", query, products.len());
        Ok(products)
    }

    fn lookup_barcode(&self, barcode: &str) -> SourceResult<Option<FoodProduct>> {
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode);
        let response = self.client.get(url).send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FoodSourceError::Status(response.status().as_u16()));
        }

        let body: BarcodeBody = response.json()?;
        if body.status != 1 {
            return Ok(None);
        }
        Ok(body.product.map(normalize))
    }
}

// ============================================================================
// Proxy handler
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
    Other,
}

impl Method {
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "OPTIONS" => Method::Options,
            _ => Method::Other,
        }
    }
}

/// Which proxy endpoint is being called
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Free-text search, parameter `query`
    Search,
    /// Barcode lookup, parameter `barcode`
    Barcode,
}

impl Endpoint {
    fn parameter(self) -> &'static str {
        match self {
            Endpoint::Search => "query",
            Endpoint::Barcode => "barcode",
        }
    }
}

/// Incoming proxy request
#[derive(Clone, Debug)]
pub struct ProxyRequest {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

impl ProxyRequest {
    pub fn get<K: Into<String>, V: Into<String>>(params: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            method: Method::Get,
            query: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            body: None,
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::Post,
            query: HashMap::new(),
            body: Some(body),
        }
    }

    pub fn options() -> Self {
        Self {
            method: Method::Options,
            query: HashMap::new(),
            body: None,
        }
    }

    /// Parameter from the query string (GET) or JSON body (POST), trimmed
    fn param(&self, name: &str) -> Option<String> {
        let raw = match self.method {
            Method::Get => self.query.get(name).cloned(),
            Method::Post => self.body.as_ref().and_then(|b| match b.get(name) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            }),
            Method::Options | Method::Other => None,
        };
        non_blank(raw)
    }
}

/// Outgoing proxy response
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Value,
}

impl ProxyResponse {
    fn json(status: u16, body: Value) -> Self {
        let mut headers = CORS_HEADERS.to_vec();
        headers.push(("Content-Type", "application/json"));
        Self {
            status,
            headers,
            body,
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }
}

fn upstream_failure(error: FoodSourceError) -> ProxyResponse {
    tracing::warn!("Food upstream error: {}", error);
    match error {
        FoodSourceError::Timeout => ProxyResponse::error(504, "Upstream request timed out"),
        other => ProxyResponse::error(500, format!("Failed to fetch food data: {}", other)),
    }
}

/// Barcodes are EAN/UPC style digit strings
fn valid_barcode(barcode: &str) -> bool {
    (6..=14).contains(&barcode.len()) && barcode.chars().all(|c| c.is_ascii_digit())
}

/// Serve one proxy request against `source`
pub fn handle<F: FoodSource + ?Sized>(
    endpoint: Endpoint,
    request: &ProxyRequest,
    source: &F,
    search_limit: u32,
) -> ProxyResponse {
    match request.method {
        Method::Options => return ProxyResponse::json(200, json!("ok")),
        Method::Other => return ProxyResponse::error(405, "Method not allowed"),
        Method::Get | Method::Post => {}
    }

    let parameter = endpoint.parameter();
    let Some(value) = request.param(parameter) else {
        return ProxyResponse::error(400, format!("Missing required parameter: {}", parameter));
    };

    match endpoint {
        Endpoint::Search => match source.search(&value, search_limit) {
            Ok(products) if products.is_empty() => {
                ProxyResponse::error(404, format!("No products found for {:?}", value))
            }
            Ok(products) => ProxyResponse::json(200, json!(products)),
            Err(e) => upstream_failure(e),
        },
        Endpoint::Barcode => {
            if !valid_barcode(&value) {
                return ProxyResponse::error(400, format!("Invalid barcode: {}", value));
            }
            match source.lookup_barcode(&value) {
                Ok(Some(product)) => ProxyResponse::json(200, json!(product)),
                Ok(None) => ProxyResponse::error(404, format!("Product {} not found", value)),
                Err(e) => upstream_failure(e),
            }
        }
    }
}
