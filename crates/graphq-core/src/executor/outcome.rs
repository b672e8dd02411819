//! Outcome of executing one query.

use std::time::Duration;

use crate::connection::ResultRecord;
use crate::retry::FatalCause;
use crate::status::ResponseStatus;

/// Result of one attempt, or of a whole query once retries are settled.
///
/// [`QueryExecutor::execute`](super::QueryExecutor::execute) only ever
/// returns `Success` or `Fatal`; `Throttled` is resolved inside it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Success {
        results: Vec<ResultRecord>,
        status: ResponseStatus,
    },
    Throttled {
        status: ResponseStatus,
    },
    Fatal {
        cause: FatalCause,
        status: Option<ResponseStatus>,
    },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn status(&self) -> Option<&ResponseStatus> {
        match self {
            ExecutionOutcome::Success { status, .. } | ExecutionOutcome::Throttled { status } => {
                Some(status)
            }
            ExecutionOutcome::Fatal { status, .. } => status.as_ref(),
        }
    }

    pub fn fatal_cause(&self) -> Option<&FatalCause> {
        match self {
            ExecutionOutcome::Fatal { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn request_charge(&self) -> Option<f64> {
        self.status().and_then(|s| s.request_charge)
    }
}

/// What [`QueryExecutor::execute`](super::QueryExecutor::execute) reports
/// for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    /// Terminal outcome: `Success` or `Fatal`.
    pub outcome: ExecutionOutcome,
    /// Number of submissions made for this query.
    pub attempts: u32,
    /// Total time spent in retry waits.
    pub total_wait: Duration,
    /// Sum of the charges reported by every attempt, throttled ones included.
    pub request_charge: f64,
}
