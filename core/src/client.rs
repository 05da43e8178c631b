//! Unauthenticated and authenticated accounts API clients.
//!
//! # Design
//! `AccountsApi` owns the client credentials, the base URL and the v0 route
//! table prefixed with that base URL. `AuthedApi` borrows it and adds a user
//! token. Neither is mutated after construction: `get_headers_with` builds a
//! fresh header map on every call.

use std::fmt;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::constants::API_BASE;
use crate::error::ApiError;
use crate::http::{HttpHeaders, HttpRequest, Query};
use crate::request::{extract_body, HttpClient};
use crate::routes::{self, RouteTable, USER_BASE};
use crate::transport::{Transport, UreqTransport};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CLIENT_ID_HEADER: &str = "X-Dynastic-Client-ID";
pub const CLIENT_SECRET_HEADER: &str = "X-Dynastic-Client-Secret";

const BASIC_USER_TIMEOUT_SECS: f64 = 3.0;

/// Client for the accounts API before a user has signed in.
pub struct AccountsApi<T = UreqTransport> {
    client_id: String,
    client_secret: String,
    api_base_url: String,
    api_v0: RouteTable,
    http: HttpClient<T>,
}

impl AccountsApi {
    /// Client for the production API.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::with_base_url(client_id, client_secret, API_BASE)
    }

    pub fn with_base_url(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self::with_transport(client_id, client_secret, api_base_url, UreqTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_base_url(
            config.client_id.as_str(),
            config.client_secret.as_str(),
            config.api_base_url.as_str(),
        )
    }
}

impl<T: Transport> AccountsApi<T> {
    pub fn with_transport(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_base_url: impl Into<String>,
        transport: T,
    ) -> Self {
        let api_base_url = api_base_url.into();
        let api_v0 = routes::prefix(routes::api_v0_routes(), &api_base_url);
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base_url,
            api_v0,
            http: HttpClient::with_transport(transport),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// The v0 route table with every route absolute.
    pub fn api_v0(&self) -> &RouteTable {
        &self.api_v0
    }

    /// Absolute URL for a dotted route key such as `"USER.BASE"`.
    pub fn route(&self, key_path: &str) -> Result<&str, ApiError> {
        routes::lookup(&self.api_v0, key_path)
    }

    pub fn http(&self) -> &HttpClient<T> {
        &self.http
    }

    /// Client acting on behalf of the user holding `token`. No I/O.
    pub fn get_authed_api(&self, token: impl Into<String>) -> AuthedApi<'_, T> {
        AuthedApi::new(token, self)
    }
}

impl<T> fmt::Debug for AccountsApi<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountsApi")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

/// Client for a signed-in user.
pub struct AuthedApi<'a, T = UreqTransport> {
    token: String,
    headers: HttpHeaders,
    api: &'a AccountsApi<T>,
}

impl<'a, T: Transport> AuthedApi<'a, T> {
    pub fn new(token: impl Into<String>, api: &'a AccountsApi<T>) -> Self {
        let token = token.into();
        let headers = HttpHeaders::from([
            (AUTHORIZATION_HEADER.to_string(), format!("Bearer {token}")),
            (CLIENT_ID_HEADER.to_string(), api.client_id.clone()),
            (CLIENT_SECRET_HEADER.to_string(), api.client_secret.clone()),
        ]);
        Self { token, headers, api }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn api(&self) -> &'a AccountsApi<T> {
        self.api
    }

    /// Bearer and client-credential headers.
    pub fn get_headers(&self) -> HttpHeaders {
        self.headers.clone()
    }

    /// The base headers with `extra` layered on top. Names compare
    /// case-insensitively, so `extra` replaces a base header of the same
    /// name. Stored headers are left untouched.
    pub fn get_headers_with(&self, extra: &HttpHeaders) -> HttpHeaders {
        let mut merged = self.get_headers();
        for (name, value) in extra {
            merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Fetch the signed-in user's basic profile.
    ///
    /// Resolves with the response body, e.g. `{"success": true, "basic": {...}}`.
    pub async fn basic_user(&self) -> Result<Value, ApiError> {
        let request = HttpRequest::new(self.api.route(USER_BASE)?)
            .query(Query::raw("basic"))
            .headers(self.get_headers())
            .timeout_seconds(BASIC_USER_TIMEOUT_SECS);
        extract_body(self.api.http.get(request)).await
    }
}

impl<T> fmt::Debug for AuthedApi<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthedApi")
            .field("token", &"<redacted>")
            .field("api", &self.api)
            .finish()
    }
}
