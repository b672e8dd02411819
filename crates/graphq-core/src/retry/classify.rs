//! Classify provider errors into throttled versus fatal failures.

use thiserror::Error;

use crate::connection::ConnectionError;
use crate::retry::FailureKind;
use crate::status::{ResponseStatus, THROTTLED_STATUS};

/// Why a query ended without results. None of these are retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FatalCause {
    /// Server refused the query: malformed traversal, authorization
    /// failure, conflict, and so on.
    #[error("rejected by server (status {code}): {message}")]
    Rejected { code: i64, message: String },
    /// Transport-level failure before a server status was available.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The connection was closed before the query could run.
    #[error("connection closed")]
    Closed,
    /// Status attributes were present but could not be interpreted.
    #[error("malformed status attributes")]
    MalformedStatus,
    /// Still throttled after the policy's last allowed attempt.
    #[error("still throttled after {attempts} attempt(s)")]
    RetriesExhausted { attempts: u32 },
    /// Cancellation was observed before the query resolved.
    #[error("cancelled")]
    Cancelled,
}

/// Classify a failed attempt.
///
/// The backend status code in the attributes decides; the protocol code
/// is only used when the attributes carry none. A status that failed
/// extraction is fatal regardless of the error.
pub fn classify(err: &ConnectionError, status: Option<&ResponseStatus>) -> FailureKind {
    if status.is_some_and(|s| s.extraction_failed) {
        return FailureKind::Fatal(FatalCause::MalformedStatus);
    }
    match err {
        ConnectionError::Response { code, message, .. } => {
            let effective = status.and_then(|s| s.status_code).unwrap_or(*code);
            if effective == THROTTLED_STATUS {
                FailureKind::Throttled
            } else {
                FailureKind::Fatal(FatalCause::Rejected {
                    code: effective,
                    message: message.clone(),
                })
            }
        }
        ConnectionError::Transport(msg) => FailureKind::Fatal(FatalCause::Transport(msg.clone())),
        ConnectionError::Closed => FailureKind::Fatal(FatalCause::Closed),
    }
}
