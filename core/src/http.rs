//! HTTP request descriptors, transport-facing requests and normalized
//! responses.
//!
//! # Design
//! Callers describe a call with [`HttpRequest`]. [`PreparedRequest`] is what
//! a transport actually executes: the raw-string query has already been
//! folded into the URL, the credentials flag is resolved and the timeout is
//! in milliseconds. Transports hand back a [`RawResponse`], which
//! [`HttpResponse::from_raw`] turns into the uniform `{status, headers, body}`
//! shape with a JSON body.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Header names to values. Names keep the case the caller gave them.
pub type HttpHeaders = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query part of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Pre-encoded; appended to the URL verbatim after `?`.
    Raw(String),
    /// Encoded by the transport.
    Params(BTreeMap<String, String>),
}

impl Query {
    pub fn raw(query: impl Into<String>) -> Self {
        Query::Raw(query.into())
    }

    pub fn params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Query::Params(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Describes a single API call.
///
/// A bare URL converts into a descriptor with every option left unset, so
/// the request helpers accept either.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Option<Query>,
    pub body: Option<Value>,
    pub headers: HttpHeaders,
    pub disable_with_credentials: bool,
    /// Fractional seconds. Zero, negative or non-finite means no timeout.
    pub timeout_seconds: Option<f64>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn headers(mut self, headers: HttpHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn disable_with_credentials(mut self) -> Self {
        self.disable_with_credentials = true;
        self
    }

    pub fn timeout_seconds(mut self, seconds: f64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

impl From<&str> for HttpRequest {
    fn from(url: &str) -> Self {
        HttpRequest::new(url)
    }
}

impl From<String> for HttpRequest {
    fn from(url: String) -> Self {
        HttpRequest::new(url)
    }
}

impl From<&String> for HttpRequest {
    fn from(url: &String) -> Self {
        HttpRequest::new(url.as_str())
    }
}

/// A request as handed to a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    /// Final URL. Contains `?query` when the query was a raw string.
    pub url: String,
    /// Query pairs for the transport to encode. `None` for raw queries.
    pub params: Option<BTreeMap<String, String>>,
    pub headers: HttpHeaders,
    pub body: Option<Value>,
    pub with_credentials: bool,
    pub timeout_ms: Option<u64>,
}

impl PreparedRequest {
    pub fn new(method: HttpMethod, request: HttpRequest) -> Self {
        let (url, params) = match request.query {
            Some(Query::Raw(query)) => (format!("{}?{query}", request.url), None),
            Some(Query::Params(params)) => (request.url, Some(params)),
            None => (request.url, None),
        };
        Self {
            method,
            url,
            params,
            headers: request.headers,
            body: request.body,
            with_credentials: !request.disable_with_credentials,
            timeout_ms: request.timeout_seconds.and_then(timeout_millis),
        }
    }
}

/// Whole milliseconds for a timeout in seconds, rounded up to at least 1ms.
fn timeout_millis(seconds: f64) -> Option<u64> {
    let timeout = Duration::try_from_secs_f64(seconds).ok()?;
    if timeout.is_zero() {
        return None;
    }
    Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1))
}

/// Body as produced by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    Text(String),
    /// Already decoded by the transport; passed through as is.
    Json(Value),
}

/// A response exactly as the transport received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: RawBody,
}

/// The uniform response shape returned by every request helper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Value,
}

impl HttpResponse {
    /// Decode a text body as JSON. An empty text body becomes `null`.
    pub fn from_raw(raw: RawResponse) -> Result<Self, ApiError> {
        let body = match raw.body {
            RawBody::Json(value) => value,
            RawBody::Text(text) if text.trim().is_empty() => Value::Null,
            RawBody::Text(text) => serde_json::from_str(&text)?,
        };
        Ok(Self {
            status: raw.status,
            headers: raw.headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_query_is_appended_to_url() {
        let req = HttpRequest::new("https://api.test/v0/user/").query(Query::raw("basic"));
        let prepared = PreparedRequest::new(HttpMethod::Get, req);
        assert_eq!(prepared.url, "https://api.test/v0/user/?basic");
        assert!(prepared.params.is_none());
    }

    #[test]
    fn query_params_leave_url_untouched() {
        let req = HttpRequest::new("https://api.test/search")
            .query(Query::params([("q", "a b"), ("page", "2")]));
        let prepared = PreparedRequest::new(HttpMethod::Get, req);
        assert_eq!(prepared.url, "https://api.test/search");
        let params = prepared.params.unwrap();
        assert_eq!(params["q"], "a b");
        assert_eq!(params["page"], "2");
    }

    #[test]
    fn credentials_are_included_by_default() {
        let prepared = PreparedRequest::new(HttpMethod::Post, "https://api.test".into());
        assert!(prepared.with_credentials);

        let req = HttpRequest::new("https://api.test").disable_with_credentials();
        assert!(!PreparedRequest::new(HttpMethod::Post, req).with_credentials);
    }

    #[test]
    fn timeout_is_converted_to_millis() {
        let req = HttpRequest::new("https://api.test").timeout_seconds(3.0);
        assert_eq!(PreparedRequest::new(HttpMethod::Get, req).timeout_ms, Some(3000));

        let req = HttpRequest::new("https://api.test").timeout_seconds(1.5);
        assert_eq!(PreparedRequest::new(HttpMethod::Get, req).timeout_ms, Some(1500));

        let prepared = PreparedRequest::new(HttpMethod::Get, "https://api.test".into());
        assert_eq!(prepared.timeout_ms, None);
    }

    #[test]
    fn zero_timeout_means_none() {
        for seconds in [0.0, -1.0, f64::NAN] {
            let req = HttpRequest::new("https://api.test").timeout_seconds(seconds);
            assert_eq!(PreparedRequest::new(HttpMethod::Get, req).timeout_ms, None, "{seconds}");
        }
    }

    #[test]
    fn tiny_timeout_is_at_least_one_millisecond() {
        let req = HttpRequest::new("https://api.test").timeout_seconds(0.0001);
        assert_eq!(PreparedRequest::new(HttpMethod::Get, req).timeout_ms, Some(1));
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn text_body_is_parsed() {
        let raw = RawResponse {
            status: 200,
            headers: HttpHeaders::new(),
            body: RawBody::Text(r#"{"a":1}"#.to_string()),
        };
        assert_eq!(HttpResponse::from_raw(raw).unwrap().body, json!({"a": 1}));
    }

    #[test]
    fn structured_body_passes_through() {
        let raw = RawResponse {
            status: 201,
            headers: HttpHeaders::new(),
            body: RawBody::Json(json!(["x"])),
        };
        let response = HttpResponse::from_raw(raw).unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, json!(["x"]));
    }

    #[test]
    fn empty_text_body_is_null() {
        let raw = RawResponse {
            status: 204,
            headers: HttpHeaders::new(),
            body: RawBody::Text(String::new()),
        };
        assert_eq!(HttpResponse::from_raw(raw).unwrap().body, Value::Null);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let raw = RawResponse {
            status: 200,
            headers: HttpHeaders::new(),
            body: RawBody::Text("<html>".to_string()),
        };
        assert!(matches!(HttpResponse::from_raw(raw), Err(ApiError::Parse(_))));
    }
}
