//! Pluggable HTTP transports.
//!
//! # Design
//! A [`Transport`] executes one [`PreparedRequest`] and either returns the
//! response, whatever its status, or reports that no response arrived or
//! that its body could not be read. It never interprets status codes. The
//! default [`UreqTransport`] runs the blocking ureq agent on tokio's
//! blocking pool so callers can `.await`; its futures must be polled inside
//! a Tokio runtime.

use std::future::Future;
use std::time::Duration;

use tracing::trace;
use ureq::http::Response;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Body, RequestBuilder};

use crate::http::{HttpHeaders, HttpMethod, PreparedRequest, RawBody, RawResponse};

/// Largest response body `UreqTransport` will read.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Errors raised by a transport. All but `Body` mean no response arrived.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    TimedOut,

    #[error(transparent)]
    Ureq(ureq::Error),

    #[error("{0}")]
    Other(String),

    /// The status line arrived but the body could not be read.
    #[error("failed to read body of HTTP {status} response: {reason}")]
    Body { status: u16, reason: String },
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => TransportError::TimedOut,
            other => TransportError::Ureq(other),
        }
    }
}

/// Executes prepared requests.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Transport backed by a ureq agent.
///
/// Status codes are returned as data, never as errors. Each request gets its
/// own agent so the per-request timeout can be applied. ureq keeps no
/// ambient cookies or credentials, so `with_credentials` has nothing to
/// include and is ignored.
///
/// Requests run on [`tokio::task::spawn_blocking`], so `send` panics when
/// polled outside a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        tokio::task::spawn_blocking(move || execute(request))
            .await
            .map_err(|err| TransportError::Other(format!("transport task failed: {err}")))?
    }
}

fn execute(request: PreparedRequest) -> Result<RawResponse, TransportError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(request.timeout_ms.map(Duration::from_millis))
        .build()
        .new_agent();

    trace!(with_credentials = request.with_credentials, "executing with ureq");

    let url = request.url.as_str();
    let body = match &request.body {
        Some(body) => {
            Some(serde_json::to_vec(body).map_err(|e| TransportError::Other(e.to_string()))?)
        }
        None => None,
    };

    let response = match request.method {
        HttpMethod::Get => send_without_body(decorate(agent.get(url), &request), body.as_deref()),
        HttpMethod::Delete => {
            send_without_body(decorate(agent.delete(url), &request), body.as_deref())
        }
        HttpMethod::Post => send_with_body(decorate(agent.post(url), &request), body.as_deref()),
        HttpMethod::Put => send_with_body(decorate(agent.put(url), &request), body.as_deref()),
        HttpMethod::Patch => {
            send_with_body(decorate(agent.patch(url), &request), body.as_deref())
        }
    }?;

    read_response(response)
}

fn decorate<B>(mut builder: RequestBuilder<B>, request: &PreparedRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    if let Some(params) = &request.params {
        for (key, value) in params {
            builder = builder.query(key, value);
        }
    }
    builder
}

/// GET and DELETE only carry a body when the caller gave one.
fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    body: Option<&[u8]>,
) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(bytes) => send_with_body(builder.force_send_body(), Some(bytes)),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    body: Option<&[u8]>,
) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.content_type("application/json").send(bytes),
        None => builder.send_empty(),
    }
}

fn read_response(mut response: Response<Body>) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let headers: HttpHeaders = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let text = response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_string()
        .map_err(|err| TransportError::Body {
            status,
            reason: err.to_string(),
        })?;

    Ok(RawResponse {
        status,
        headers,
        body: RawBody::Text(text),
    })
}
