//! Remote data gateway for the hosted Postgres-backed service.
//!
//! A thin wrapper over the REST interface: table select/insert/update/delete
//! and stored-procedure calls. Every call answers with a
//! `{ data, error }` shaped `GatewayResponse`; nothing is retried.

use crate::config::GatewayConfig;
use crate::{Error, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Error payload returned by the backend, or synthesized for transport failures
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct GatewayError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    /// HTTP status; 0 when the request never got an answer
    #[serde(default)]
    pub status: u16,
}

impl GatewayError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
            status,
        }
    }
}

/// `{ data, error }` response shape
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GatewayResponse<T> {
    pub data: Option<T>,
    pub error: Option<GatewayError>,
}

impl<T> GatewayResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: GatewayError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GatewayResponse<U> {
        GatewayResponse {
            data: self.data.map(f),
            error: self.error,
        }
    }

    /// Convert into a `Result`, treating a missing payload as an error
    pub fn into_result(self) -> Result<T> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(Error::Gateway(error)),
            (Some(data), None) => Ok(data),
            (None, None) => Err(Error::Other("gateway returned no data".into())),
        }
    }
}

/// Row filter, ordering and paging for table calls
///
/// Encoded as PostgREST query parameters, e.g. `logged_on=eq.2026-03-01`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return; defaults to `*`
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    fn filter(mut self, column: &str, op: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("{}.{}", op, value.to_string())));
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn neq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "neq", value)
    }

    pub fn gt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "gt", value)
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lte", value)
    }

    pub fn order(mut self, column: &str, descending: bool) -> Self {
        let direction = if descending { "desc" } else { "asc" };
        self.order.push(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query parameters in request order
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".into()),
        )];
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            params.push(("order".into(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".into(), limit.to_string()));
        }
        params
    }

    /// Filter parameters only, as used by update and delete
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters.clone()
    }
}

/// Table and procedure calls against the hosted backend
pub trait Gateway {
    fn select(&self, table: &str, query: &Query) -> GatewayResponse<Vec<Value>>;

    /// Insert one row (an object) or several (an array); returns the stored rows
    fn insert(&self, table: &str, rows: Value) -> GatewayResponse<Vec<Value>>;

    fn update(&self, table: &str, query: &Query, patch: Value) -> GatewayResponse<Vec<Value>>;

    fn delete(&self, table: &str, query: &Query) -> GatewayResponse<Vec<Value>>;

    fn rpc(&self, function: &str, args: Value) -> GatewayResponse<Value>;
}

/// Blocking HTTPS implementation of `Gateway`
pub struct RestGateway {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    client: Client,
}

impl RestGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            access_token: config
                .access_token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(String::from),
            client,
        })
    }

    /// Authenticate as a signed-in user instead of with the anonymous key
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    fn send(&self, request: RequestBuilder) -> GatewayResponse<Value> {
        let response = match self.authorized(request).send() {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Gateway request failed: {}", e);
                let mut error = GatewayError::new(e.to_string(), 0);
                let code = if e.is_timeout() { "timeout" } else { "network" };
                error.code = Some(code.to_string());
                return GatewayResponse::err(error);
            }
        };

        let status = response.status().as_u16();
        match response.text() {
            Ok(body) => parse_response(status, &body),
            Err(e) => GatewayResponse::err(GatewayError::new(e.to_string(), status)),
        }
    }
}

impl Gateway for RestGateway {
    fn select(&self, table: &str, query: &Query) -> GatewayResponse<Vec<Value>> {
        tracing::debug!("select {}", table);
        let request = self.client.get(self.table_url(table)).query(&query.to_params());
        self.send(request).map(into_rows)
    }

    fn insert(&self, table: &str, rows: Value) -> GatewayResponse<Vec<Value>> {
        tracing::debug!("insert into {}", table);
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);
        self.send(request).map(into_rows)
    }

    fn update(&self, table: &str, query: &Query, patch: Value) -> GatewayResponse<Vec<Value>> {
        tracing::debug!("update {}", table);
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send(request).map(into_rows)
    }

    fn delete(&self, table: &str, query: &Query) -> GatewayResponse<Vec<Value>> {
        tracing::debug!("delete from {}", table);
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&query.filter_params())
            .header("Prefer", "return=representation");
        self.send(request).map(into_rows)
    }

    fn rpc(&self, function: &str, args: Value) -> GatewayResponse<Value> {
        tracing::debug!("rpc {}", function);
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        self.send(self.client.post(url).json(&args))
    }
}

/// Turn a raw HTTP answer into the `{ data, error }` shape
pub fn parse_response(status: u16, body: &str) -> GatewayResponse<Value> {
    if (200..300).contains(&status) {
        if body.trim().is_empty() {
            return GatewayResponse::ok(Value::Null);
        }
        return match serde_json::from_str(body) {
            Ok(value) => GatewayResponse::ok(value),
            Err(e) => GatewayResponse::err(GatewayError::new(
                format!("invalid JSON in response: {}", e),
                status,
            )),
        };
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(alias = "error_description", alias = "msg")]
        message: String,
        #[serde(default)]
        code: Option<Value>,
        #[serde(default)]
        details: Option<String>,
        #[serde(default)]
        hint: Option<String>,
    }

    let error = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => GatewayError {
            message: parsed.message,
            code: parsed.code.map(|c| match c {
                Value::String(s) => s,
                other => other.to_string(),
            }),
            details: parsed.details,
            hint: parsed.hint,
            status,
        },
        Err(_) if body.trim().is_empty() => {
            GatewayError::new(format!("request failed with HTTP {}", status), status)
        }
        Err(_) => GatewayError::new(body.trim(), status),
    };
    GatewayResponse::err(error)
}

fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
