//! In-memory provider that replays scripted replies per query text.
//!
//! Every submission is recorded with the query text and the (virtual) time
//! it was made, so tests can assert on ordering and retry waits.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use graphq_core::connection::{
    ConnectionError, ConnectionProvider, QueryHandle, ResultRecord, StatusAttributes,
};
use serde_json::{json, Value};
use tokio::time::Instant;

/// What the fake server answers for one submission.
#[derive(Debug, Clone)]
pub enum Reply {
    Success {
        records: Vec<ResultRecord>,
        attributes: StatusAttributes,
    },
    /// Backend 429 with an optional retry-after in milliseconds.
    Throttled { retry_after_ms: Option<u64> },
    /// Non-retryable server rejection (malformed query, auth, ...).
    Rejected { code: i64, message: String },
    /// Records resolve but the status half fails.
    StatusLost,
    /// Success whose status attributes cannot be interpreted.
    GarbledStatus,
}

impl Reply {
    pub fn ok(records: Vec<Value>, charge: f64) -> Self {
        Reply::Success {
            records,
            attributes: json!({
                "x-ms-status-code": 200,
                "x-ms-total-request-charge": charge,
                "x-ms-activity-id": "00000000-0000-0000-0000-000000000001",
            }),
        }
    }

    pub fn throttled(retry_after_ms: Option<u64>) -> Self {
        Reply::Throttled { retry_after_ms }
    }

    pub fn malformed_query() -> Self {
        Reply::Rejected {
            code: 597,
            message: "ScriptEvaluationError: unexpected token".to_string(),
        }
    }

    fn records(&self) -> Result<Vec<ResultRecord>, ConnectionError> {
        match self {
            Reply::Success { records, .. } => Ok(records.clone()),
            Reply::StatusLost | Reply::GarbledStatus => Ok(vec![json!(1)]),
            other => Err(other.error()),
        }
    }

    fn attributes(&self) -> Result<StatusAttributes, ConnectionError> {
        match self {
            Reply::Success { attributes, .. } => Ok(attributes.clone()),
            Reply::StatusLost => Err(ConnectionError::Transport(
                "connection reset while reading status".to_string(),
            )),
            Reply::GarbledStatus => Ok(json!("not-a-map")),
            other => Err(other.error()),
        }
    }

    fn error(&self) -> ConnectionError {
        match self {
            Reply::Throttled { retry_after_ms } => {
                let mut attributes = json!({
                    "x-ms-status-code": 429,
                    "x-ms-substatus-code": 3200,
                    "x-ms-total-request-charge": 0.5,
                    "x-ms-activity-id": "throttled-activity",
                });
                if let Some(ms) = retry_after_ms {
                    attributes["x-ms-retry-after-ms"] = json!(ms);
                }
                ConnectionError::Response {
                    code: 500,
                    message: "Request rate is large".to_string(),
                    attributes,
                }
            }
            Reply::Rejected { code, message } => ConnectionError::Response {
                code: *code,
                message: message.clone(),
                attributes: json!({ "x-ms-status-code": 400 }),
            },
            _ => ConnectionError::Transport("unexpected scripted error".to_string()),
        }
    }
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<String, VecDeque<Reply>>,
    submissions: Vec<(String, Instant)>,
}

/// Scripted provider. Clones share state, so a test can keep one clone
/// for assertions and move another into the runner.
#[derive(Clone)]
pub struct ScriptedProvider {
    inner: Arc<Mutex<Inner>>,
    fallback: Reply,
    closes: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    /// Provider answering every query with an empty success.
    pub fn succeeding() -> Self {
        Self::with_fallback(Reply::ok(Vec::new(), 1.0))
    }

    pub fn with_fallback(fallback: Reply) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            fallback,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue replies for `query`; once used up, the fallback applies.
    pub fn script(self, query: &str, replies: Vec<Reply>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .scripts
            .entry(query.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn submitted_queries(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .submissions
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }

    pub fn submission_times(&self) -> Vec<Instant> {
        self.inner
            .lock()
            .unwrap()
            .submissions
            .iter()
            .map(|(_, t)| *t)
            .collect()
    }

    pub fn submission_count(&self) -> usize {
        self.inner.lock().unwrap().submissions.len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl ConnectionProvider for ScriptedProvider {
    type Handle = ScriptedHandle;

    fn submit(&self, query: &str) -> ScriptedHandle {
        let mut inner = self.inner.lock().unwrap();
        inner.submissions.push((query.to_string(), Instant::now()));
        let reply = inner
            .scripts
            .get_mut(query)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.fallback.clone());
        ScriptedHandle { reply }
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct ScriptedHandle {
    reply: Reply,
}

impl QueryHandle for ScriptedHandle {
    async fn result_records(&self) -> Result<Vec<ResultRecord>, ConnectionError> {
        tokio::task::yield_now().await;
        self.reply.records()
    }

    async fn status_attributes(&self) -> Result<StatusAttributes, ConnectionError> {
        self.reply.attributes()
    }
}
