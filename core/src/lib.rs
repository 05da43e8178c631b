//! Async client for the Dynastic accounts API.
//!
//! # Overview
//! Builds request URLs from a nested route table, attaches bearer-token and
//! client-credential headers, and normalizes every reply into
//! `{status, headers, body}` or an [`ApiError`].
//!
//! # Design
//! - [`AccountsApi`] holds the client credentials and the route table
//!   prefixed with the API base URL; [`AuthedApi`] borrows it and adds a
//!   user token.
//! - [`HttpClient`] is the generic request helper. It is single attempt and
//!   treats any status other than 200 as a failure.
//! - I/O goes through the [`Transport`] trait. [`UreqTransport`] is the
//!   default; tests plug in their own.
//! - [`UreqTransport`] runs each call on tokio's blocking pool, so its
//!   futures must be polled inside a Tokio runtime and panic otherwise.
//! - Route tables, error codes and base URLs are read-only data.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod request;
pub mod routes;
pub mod transport;

pub use client::{AccountsApi, AuthedApi};
pub use config::ClientConfig;
pub use constants::{ErrorCode, API_BASE, FRONTEND_BASE};
pub use error::{ApiError, ConfigError, RemoteError};
pub use http::{
    HttpHeaders, HttpMethod, HttpRequest, HttpResponse, PreparedRequest, Query, RawBody,
    RawResponse,
};
pub use request::{extract_body, extract_boolean, extract_success, HttpClient};
pub use routes::{api_v0_routes, prefix, Route, RouteTable};
pub use transport::{Transport, TransportError, UreqTransport};
