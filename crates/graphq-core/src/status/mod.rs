//! Response status metadata.
//!
//! The server attaches a map of status attributes to every response, on
//! success and on failure. This module turns that map into a
//! [`ResponseStatus`] so the executor and retry policy never have to look
//! at raw keys. Fields the server omits stay `None`; they are never
//! defaulted to zero.

mod parse;

use std::time::Duration;


pub use parse::{extract, parse_retry_after};

/// Attribute key carrying the backend HTTP-style status code.
pub const STATUS_CODE: &str = "x-ms-status-code";
/// Attribute key carrying the backend sub-status code.
pub const SUB_STATUS_CODE: &str = "x-ms-substatus-code";
/// Attribute key carrying the server-advised retry delay in milliseconds.
pub const RETRY_AFTER_MS: &str = "x-ms-retry-after-ms";
/// Older spelling of [`RETRY_AFTER_MS`], still sent by some gateways.
pub const RETRY_AFTER: &str = "x-ms-retry-after";
/// Attribute key carrying the total request charge of the operation.
pub const TOTAL_REQUEST_CHARGE: &str = "x-ms-total-request-charge";
/// Per-request charge; used when the total is not reported.
pub const REQUEST_CHARGE: &str = "x-ms-request-charge";
/// Attribute key carrying the server-side activity (trace) id.
pub const ACTIVITY_ID: &str = "x-ms-activity-id";

/// Status code the server uses to reject a request for exceeding throughput.
pub const THROTTLED_STATUS: i64 = 429;

/// Structured view of one response's status attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseStatus {
    pub status_code: Option<i64>,
    pub sub_status_code: Option<i64>,
    /// Server-advised wait before resubmitting.
    pub retry_after: Option<Duration>,
    /// Request units charged for the operation.
    pub request_charge: Option<f64>,
    pub activity_id: Option<String>,
    /// True when the attribute payload could not be interpreted at all.
    /// Every other field is `None` in that case.
    pub extraction_failed: bool,
}

impl ResponseStatus {
    /// Status for a payload that could not be interpreted.
    pub fn malformed() -> Self {
        Self {
            extraction_failed: true,
            ..Self::default()
        }
    }

    /// True if the server reported a throughput rejection.
    pub fn is_throttled(&self) -> bool {
        self.status_code == Some(THROTTLED_STATUS)
    }

    /// Short `code/substatus` label for log lines, `-` for absent parts.
    pub fn code_label(&self) -> String {
        let code = self
            .status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        match self.sub_status_code {
            Some(sub) => format!("{}/{}", code, sub),
            None => code,
        }
    }
}
