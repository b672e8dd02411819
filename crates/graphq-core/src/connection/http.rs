//! Gremlin Server HTTP endpoint provider.
//!
//! Targets Apache TinkerPop Gremlin Server's HTTP channel. Azure Cosmos DB
//! only accepts Gremlin over WebSocket, so this provider cannot talk to it;
//! the `x-ms-*` status attributes are read wherever a server supplies them.
//!
//! Uses the curl crate (libcurl) to POST `{"gremlin": "<query>"}` and read
//! the standard response envelope:
//!
//! ```text
//! { "requestId": "...",
//!   "status": { "code": 200, "message": "", "attributes": { ... } },
//!   "result": { "data": [ ... ], "meta": { ... } } }
//! ```
//!
//! The request runs once per handle, on the blocking pool, the first time
//! either half of the response is awaited.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use super::{ConnectionError, ConnectionProvider, QueryHandle, ResultRecord, StatusAttributes};

/// How much of a non-JSON error body is kept in the error message.
const ERROR_BODY_LIMIT: usize = 512;

impl From<curl::Error> for ConnectionError {
    fn from(e: curl::Error) -> Self {
        ConnectionError::Transport(e.to_string())
    }
}

/// Connection settings for [`HttpGremlinProvider`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Gremlin HTTP endpoint, e.g. `http://localhost:8182/gremlin`.
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl HttpOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: None,
            password: None,
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Decoded success envelope.
#[derive(Debug, Clone, PartialEq)]
struct GremlinResponse {
    records: Vec<ResultRecord>,
    attributes: StatusAttributes,
}

type SharedResponse = Arc<OnceCell<Result<GremlinResponse, ConnectionError>>>;

/// Provider that sends each query as one HTTP request.
pub struct HttpGremlinProvider {
    options: Arc<HttpOptions>,
    closed: AtomicBool,
}

impl HttpGremlinProvider {
    /// Validate the endpoint and build a provider. No request is made yet.
    pub fn new(options: HttpOptions) -> Result<Self> {
        let parsed = url::Url::parse(&options.endpoint)
            .with_context(|| format!("invalid endpoint URL: {}", options.endpoint))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!(
                "unsupported endpoint scheme {:?} (expected http or https)",
                parsed.scheme()
            );
        }
        tracing::debug!(endpoint = %options.endpoint, "gremlin http provider ready");
        Ok(Self {
            options: Arc::new(options),
            closed: AtomicBool::new(false),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.options.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl ConnectionProvider for HttpGremlinProvider {
    type Handle = HttpQueryHandle;

    fn submit(&self, query: &str) -> HttpQueryHandle {
        let response = if self.is_closed() {
            OnceCell::new_with(Some(Err(ConnectionError::Closed)))
        } else {
            OnceCell::new()
        };
        HttpQueryHandle {
            options: Arc::clone(&self.options),
            query: Arc::from(query),
            response: Arc::new(response),
        }
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(endpoint = %self.options.endpoint, "gremlin http provider closed");
        }
    }
}

/// Handle for one HTTP query; both halves share a single request.
pub struct HttpQueryHandle {
    options: Arc<HttpOptions>,
    query: Arc<str>,
    response: SharedResponse,
}

impl HttpQueryHandle {
    async fn response(&self) -> &Result<GremlinResponse, ConnectionError> {
        self.response
            .get_or_init(|| {
                let options = Arc::clone(&self.options);
                let query = Arc::clone(&self.query);
                async move {
                    tokio::task::spawn_blocking(move || perform(&options, &query))
                        .await
                        .unwrap_or_else(|e| {
                            Err(ConnectionError::Transport(format!("request task failed: {}", e)))
                        })
                }
            })
            .await
    }
}

impl QueryHandle for HttpQueryHandle {
    async fn result_records(&self) -> Result<Vec<ResultRecord>, ConnectionError> {
        self.response().await.clone().map(|r| r.records)
    }

    async fn status_attributes(&self) -> Result<StatusAttributes, ConnectionError> {
        self.response().await.clone().map(|r| r.attributes)
    }
}

/// Performs the POST and decodes the envelope.
///
/// Runs in the current thread; called from `spawn_blocking`.
fn perform(options: &HttpOptions, query: &str) -> Result<GremlinResponse, ConnectionError> {
    let body = json!({ "gremlin": query }).to_string();
    let mut buf: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(&options.endpoint)?;
    easy.post(true)?;
    easy.post_fields_copy(body.as_bytes())?;
    easy.connect_timeout(options.connect_timeout)?;
    easy.timeout(options.request_timeout)?;

    let mut list = curl::easy::List::new();
    list.append("Content-Type: application/json")?;
    list.append("Accept: application/json")?;
    easy.http_headers(list)?;

    if let Some(user) = &options.username {
        easy.username(user)?;
        easy.password(options.password.as_deref().unwrap_or(""))?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            buf.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    decode_response(i64::from(code), &buf)
}

/// Decode a response body given the HTTP status code.
fn decode_response(http_code: i64, body: &[u8]) -> Result<GremlinResponse, ConnectionError> {
    let parsed: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) if (200..300).contains(&http_code) => {
            return Err(ConnectionError::Transport(format!(
                "invalid response body: {}",
                e
            )));
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let message: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(ConnectionError::Response {
                code: http_code,
                message,
                attributes: Value::Null,
            });
        }
    };

    let status = parsed.get("status");
    let code = status
        .and_then(|s| s.get("code"))
        .and_then(Value::as_i64)
        .unwrap_or(http_code);
    let attributes = status
        .and_then(|s| s.get("attributes"))
        .cloned()
        .unwrap_or(Value::Null);

    if !(200..300).contains(&code) {
        let message = status
            .and_then(|s| s.get("message"))
            .or_else(|| parsed.get("message"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(ConnectionError::Response {
            code,
            message,
            attributes,
        });
    }

    let data = parsed
        .get("result")
        .and_then(|r| r.get("data"))
        .cloned()
        .unwrap_or(Value::Null);
    Ok(GremlinResponse {
        records: unwrap_list(data),
        attributes,
    })
}

/// Flatten `data` into a record list, unwrapping GraphSON `g:List`.
fn unwrap_list(data: Value) -> Vec<ResultRecord> {
    match data {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(mut map) if map.get("@type").and_then(Value::as_str) == Some("g:List") => {
            match map.remove("@value") {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            }
        }
        other => vec![other],
    }
}
