use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, warn};

pub const CLIENT_ID_HEADER: &str = "x-dynastic-client-id";
pub const CLIENT_SECRET_HEADER: &str = "x-dynastic-client-secret";

pub const FIXTURE_CLIENT_ID: &str = "test-client";
pub const FIXTURE_CLIENT_SECRET: &str = "test-secret";
pub const FIXTURE_TOKEN: &str = "valid-token";

// Accounts API error codes used by the handlers.
const UNAUTHENTICATED: u32 = 1003;
const INVALID_SESSION_TOKEN: u32 = 1021;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasicUser {
    pub id: u64,
    pub username: String,
    pub email: String,
}

/// Registered client credentials and live sessions.
#[derive(Clone, Debug)]
pub struct Accounts {
    pub client_id: String,
    pub client_secret: String,
    pub sessions: HashMap<String, BasicUser>,
}

impl Accounts {
    /// One client and one session for `FIXTURE_TOKEN`.
    pub fn fixture() -> Self {
        Self::with_client(FIXTURE_CLIENT_ID, FIXTURE_CLIENT_SECRET)
    }

    /// Fixture session with client credentials from `MOCK_CLIENT_ID` and
    /// `MOCK_CLIENT_SECRET`, falling back to the fixture values.
    pub fn from_env() -> Self {
        let client_id =
            std::env::var("MOCK_CLIENT_ID").unwrap_or_else(|_| FIXTURE_CLIENT_ID.to_string());
        let client_secret = std::env::var("MOCK_CLIENT_SECRET")
            .unwrap_or_else(|_| FIXTURE_CLIENT_SECRET.to_string());
        Self::with_client(&client_id, &client_secret)
    }

    fn with_client(client_id: &str, client_secret: &str) -> Self {
        let user = BasicUser {
            id: 1,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            sessions: HashMap::from([(FIXTURE_TOKEN.to_string(), user)]),
        }
    }
}

pub type Db = Arc<Accounts>;

type ApiError = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with(Accounts::fixture())
}

pub fn app_with(accounts: Accounts) -> Router {
    let db: Db = Arc::new(accounts);
    Router::new()
        .route("/v0/user/", get(basic_user))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/plain", get(plain))
        .route("/slow/{ms}", get(slow))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, accounts: Accounts) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(accounts)).await
}

fn error(status: StatusCode, code: u32, message: &str) -> ApiError {
    (status, Json(json!({ "error": { "code": code, "message": message } })))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn check_client(db: &Accounts, headers: &HeaderMap) -> Result<(), ApiError> {
    let id = header_str(headers, CLIENT_ID_HEADER);
    let secret = header_str(headers, CLIENT_SECRET_HEADER);
    if id == Some(db.client_id.as_str()) && secret == Some(db.client_secret.as_str()) {
        return Ok(());
    }
    warn!(client_id = ?id, "rejected client credentials");
    Err(error(StatusCode::FORBIDDEN, 403, "Invalid client credentials"))
}

async fn basic_user(
    State(db): State<Db>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    check_client(&db, &headers)?;

    let token = header_str(&headers, header::AUTHORIZATION.as_str())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            error(StatusCode::UNAUTHORIZED, UNAUTHENTICATED, "Authentication required")
        })?;
    let user = db
        .sessions
        .get(token)
        .ok_or_else(|| {
            error(StatusCode::UNAUTHORIZED, INVALID_SESSION_TOKEN, "Invalid session token")
        })?;

    if query.as_deref() != Some("basic") {
        return Err(error(StatusCode::BAD_REQUEST, 400, "Unsupported user view"));
    }
    debug!(user_id = user.id, "basic user lookup");
    Ok(Json(json!({ "success": true, "basic": user })))
}

/// Reflects the request back as JSON.
async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: HashMap<&str, &str> = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": headers,
        "body": body,
    }))
}

async fn status(Path(code): Path<u16>) -> ApiError {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error(status, u32::from(code), &format!("status {code}"))
}

async fn plain() -> &'static str {
    "definitely not json"
}

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "slept": ms }))
}
