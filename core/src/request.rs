//! Generic request helper and response extractors.
//!
//! # Design
//! `HttpClient` prepares a request, hands it to its [`Transport`] and
//! normalizes whatever comes back. Every call is a single attempt with a
//! single outcome:
//!
//! - no response → [`ApiError::NoReply`]
//! - status line received but body unreadable → [`ApiError::Body`]
//! - undecodable text body → [`ApiError::Parse`], even for non-200 replies
//! - any status other than exactly 200 → [`ApiError::Status`]
//! - otherwise the normalized [`HttpResponse`]

use std::future::Future;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, PreparedRequest, RawResponse};
use crate::transport::{Transport, TransportError, UreqTransport};

/// Issues HTTP calls through a [`Transport`] and normalizes the results.
#[derive(Debug, Clone, Default)]
pub struct HttpClient<T = UreqTransport> {
    transport: T,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::new())
    }
}

impl<T: Transport> HttpClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `target`, a URL or an [`HttpRequest`], with `method`.
    pub async fn request(
        &self,
        method: HttpMethod,
        target: impl Into<HttpRequest>,
    ) -> Result<HttpResponse, ApiError> {
        let prepared = PreparedRequest::new(method, target.into());
        debug!(
            method = %prepared.method,
            url = %prepared.url,
            timeout_ms = ?prepared.timeout_ms,
            "dispatching request"
        );
        let outcome = self.transport.send(prepared).await;
        normalize(outcome)
    }

    pub async fn get(&self, target: impl Into<HttpRequest>) -> Result<HttpResponse, ApiError> {
        self.request(HttpMethod::Get, target).await
    }

    pub async fn post(&self, target: impl Into<HttpRequest>) -> Result<HttpResponse, ApiError> {
        self.request(HttpMethod::Post, target).await
    }

    pub async fn put(&self, target: impl Into<HttpRequest>) -> Result<HttpResponse, ApiError> {
        self.request(HttpMethod::Put, target).await
    }

    pub async fn patch(&self, target: impl Into<HttpRequest>) -> Result<HttpResponse, ApiError> {
        self.request(HttpMethod::Patch, target).await
    }

    pub async fn del(&self, target: impl Into<HttpRequest>) -> Result<HttpResponse, ApiError> {
        self.request(HttpMethod::Delete, target).await
    }
}

/// Turn a transport outcome into the uniform response or error.
pub fn normalize(outcome: Result<RawResponse, TransportError>) -> Result<HttpResponse, ApiError> {
    let raw = match outcome {
        Ok(raw) => raw,
        Err(TransportError::Body { status, reason }) => {
            warn!(status, %reason, "response body unreadable");
            return Err(ApiError::Body { status, reason });
        }
        Err(source) => {
            warn!(error = %source, "no reply from server");
            return Err(ApiError::NoReply { source });
        }
    };

    let response = HttpResponse::from_raw(raw)?;
    debug!(status = response.status, "response received");

    if response.status != 200 {
        warn!(status = response.status, "request failed");
        return Err(ApiError::Status(Box::new(response)));
    }
    Ok(response)
}

/// Resolve with the response body; unwrap server errors into
/// [`ApiError::Remote`].
pub async fn extract_body<F>(response: F) -> Result<Value, ApiError>
where
    F: Future<Output = Result<HttpResponse, ApiError>>,
{
    response
        .await
        .map(|response| response.body)
        .map_err(ApiError::into_remote)
}

/// Resolve with the boolean field `key` of the response body.
pub async fn extract_boolean<F>(key: &str, response: F) -> Result<bool, ApiError>
where
    F: Future<Output = Result<HttpResponse, ApiError>>,
{
    let body = extract_body(response).await?;
    body.get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::UnexpectedBody {
            field: key.to_string(),
        })
}

pub async fn extract_success<F>(response: F) -> Result<bool, ApiError>
where
    F: Future<Output = Result<HttpResponse, ApiError>>,
{
    extract_boolean("success", response).await
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport for unit tests.

    use std::sync::Mutex;

    use super::*;
    use crate::http::{HttpHeaders, RawBody};

    type Reply = Box<dyn Fn() -> Result<RawResponse, TransportError> + Send + Sync>;

    /// Records every request and answers with a fixed reply.
    pub struct MockTransport {
        reply: Reply,
        pub sent: Mutex<Vec<PreparedRequest>>,
    }

    impl MockTransport {
        pub fn replying(status: u16, body: RawBody) -> Self {
            Self {
                reply: Box::new(move || {
                    Ok(RawResponse {
                        status,
                        headers: HttpHeaders::from([(
                            "content-type".to_string(),
                            "application/json".to_string(),
                        )]),
                        body: body.clone(),
                    })
                }),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn unreachable() -> Self {
            Self {
                reply: Box::new(|| Err(TransportError::Other("connection refused".to_string()))),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn last_sent(&self) -> PreparedRequest {
            self.sent.lock().unwrap().last().cloned().expect("nothing was sent")
        }
    }

    impl Transport for MockTransport {
        async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            (self.reply)()
        }
    }
}
