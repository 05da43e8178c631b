//! Error types for the accounts client.
//!
//! # Design
//! The request helpers fail in four ways: no reply, an unreadable body, an
//! undecodable body, or a reply whose status is not 200. A non-200 reply keeps the whole normalized
//! response. The authenticated client then unwraps it one level into
//! [`RemoteError`], the error object the server put in the body.

use std::fmt;

use serde_json::Value;

use crate::constants::ErrorCode;
use crate::http::HttpResponse;
use crate::transport::TransportError;

/// Errors returned by the request helpers and API clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The transport produced no response at all.
    #[error("Didn't get a reply from the server.")]
    NoReply {
        #[source]
        source: TransportError,
    },

    /// The response body was text but not valid JSON.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    /// A response arrived but its body could not be read.
    #[error("failed to read body of HTTP {status} response: {reason}")]
    Body { status: u16, reason: String },

    /// A response arrived with a status other than 200.
    #[error("server responded with status {}", .0.status)]
    Status(Box<HttpResponse>),

    /// Error object reported by the server.
    #[error(transparent)]
    Remote(RemoteError),

    #[error("route `{0}` is not defined")]
    MissingRoute(String),

    #[error("response body has no boolean `{field}` field")]
    UnexpectedBody { field: String },
}

impl ApiError {
    /// HTTP status carried by this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status(response) => Some(response.status),
            ApiError::Body { status, .. } => Some(*status),
            ApiError::Remote(remote) => Some(remote.status),
            _ => None,
        }
    }

    /// Replace a non-200 response with the error object from its body.
    ///
    /// The body's `error` field wins; otherwise the body itself. A falsy
    /// body (`null`, `false`, `0`, `""`) leaves the error unchanged, as do
    /// all other variants.
    pub fn into_remote(self) -> ApiError {
        match self {
            ApiError::Status(response) => match RemoteError::from_response(&response) {
                Some(remote) => ApiError::Remote(remote),
                None => ApiError::Status(response),
            },
            other => other,
        }
    }
}

/// The error object a server reported, e.g. `{"code": 1021, "message": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    pub status: u16,
    pub payload: Value,
}

impl RemoteError {
    pub fn from_response(response: &HttpResponse) -> Option<Self> {
        let body = &response.body;
        if !is_truthy(body) {
            return None;
        }
        let payload = match body.get("error") {
            Some(error) if is_truthy(error) => error.clone(),
            _ => body.clone(),
        };
        Some(Self {
            status: response.status,
            payload,
        })
    }

    pub fn code(&self) -> Option<u64> {
        self.payload.get("code").and_then(Value::as_u64)
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(ErrorCode::from_code)
    }

    pub fn message(&self) -> Option<&str> {
        match &self.payload {
            Value::String(message) => Some(message),
            payload => payload.get("message").and_then(Value::as_str),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.message()) {
            (Some(code), Some(message)) => write!(f, "remote error {code}: {message}"),
            (None, Some(message)) => write!(f, "remote error: {message}"),
            _ => write!(f, "remote error (HTTP {}): {}", self.status, self.payload),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Errors raised while loading [`ClientConfig`](crate::config::ClientConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
