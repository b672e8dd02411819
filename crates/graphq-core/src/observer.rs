//! Query lifecycle events.
//!
//! The executor emits one [`QueryEvent`] per state transition. Observers
//! are for logging and telemetry only; nothing they do feeds back into
//! retry or abort decisions.

use std::time::Duration;

use crate::connection::ResultRecord;
use crate::retry::FatalCause;
use crate::status::ResponseStatus;

/// One state transition of a query's execution.
#[derive(Debug, Clone, Copy)]
pub enum QueryEvent<'a> {
    /// Query handed to the connection.
    Submitted {
        index: usize,
        query: &'a str,
        attempt: u32,
    },
    /// Both result records and status attributes resolved.
    Succeeded {
        index: usize,
        query: &'a str,
        attempt: u32,
        results: &'a [ResultRecord],
        status: &'a ResponseStatus,
        elapsed: Duration,
    },
    /// Throttled; the executor is about to wait before resubmitting.
    RetryWait {
        index: usize,
        query: &'a str,
        attempt: u32,
        status: &'a ResponseStatus,
        delay: Duration,
    },
    /// The query finished without results; the batch will stop.
    Aborted {
        index: usize,
        query: &'a str,
        attempt: u32,
        cause: &'a FatalCause,
        status: Option<&'a ResponseStatus>,
    },
}

impl<'a> QueryEvent<'a> {
    pub fn index(&self) -> usize {
        match *self {
            QueryEvent::Submitted { index, .. }
            | QueryEvent::Succeeded { index, .. }
            | QueryEvent::RetryWait { index, .. }
            | QueryEvent::Aborted { index, .. } => index,
        }
    }

    pub fn query(&self) -> &'a str {
        match *self {
            QueryEvent::Submitted { query, .. }
            | QueryEvent::Succeeded { query, .. }
            | QueryEvent::RetryWait { query, .. }
            | QueryEvent::Aborted { query, .. } => query,
        }
    }

    pub fn status(&self) -> Option<&'a ResponseStatus> {
        match *self {
            QueryEvent::Submitted { .. } => None,
            QueryEvent::Succeeded { status, .. } | QueryEvent::RetryWait { status, .. } => {
                Some(status)
            }
            QueryEvent::Aborted { status, .. } => status,
        }
    }

    /// Human-readable classification of the transition.
    pub fn classification(&self) -> String {
        match self {
            QueryEvent::Submitted { attempt, .. } => format!("submitted (attempt {})", attempt),
            QueryEvent::Succeeded { results, .. } => format!("succeeded ({} result(s))", results.len()),
            QueryEvent::RetryWait { delay, .. } => {
                format!("throttled, retrying in {}ms", delay.as_millis())
            }
            QueryEvent::Aborted { cause, .. } => format!("aborted: {}", cause),
        }
    }
}

/// Receiver of query lifecycle events.
pub trait Observer {
    fn on_event(&self, event: &QueryEvent<'_>);
}

impl<O: Observer + ?Sized> Observer for &O {
    fn on_event(&self, event: &QueryEvent<'_>) {
        (**self).on_event(event)
    }
}

impl<O: Observer + ?Sized> Observer for std::sync::Arc<O> {
    fn on_event(&self, event: &QueryEvent<'_>) {
        (**self).on_event(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _event: &QueryEvent<'_>) {}
}

/// Writes events to `tracing`: the query on submission, every result
/// record and the charge on success, and the full status on failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &QueryEvent<'_>) {
        match *event {
            QueryEvent::Submitted { index, query, attempt } => {
                tracing::info!(index, attempt, "submitting query: {}", query);
            }
            QueryEvent::Succeeded {
                index,
                results,
                status,
                elapsed,
                ..
            } => {
                for record in results {
                    tracing::info!(index, "query result: {}", record);
                }
                tracing::info!(
                    index,
                    status = %status.code_label(),
                    request_charge = ?status.request_charge,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "query succeeded"
                );
            }
            QueryEvent::RetryWait {
                index,
                attempt,
                status,
                delay,
                ..
            } => {
                tracing::warn!(
                    index,
                    attempt,
                    status = %status.code_label(),
                    request_charge = ?status.request_charge,
                    activity_id = ?status.activity_id,
                    "throttled, waiting {:?} before retry",
                    delay
                );
            }
            QueryEvent::Aborted {
                index,
                query,
                attempt,
                cause,
                status,
            } => {
                let status = status.cloned().unwrap_or_default();
                tracing::error!(
                    index,
                    attempt,
                    status = %status.code_label(),
                    retry_after = ?status.retry_after,
                    request_charge = ?status.request_charge,
                    activity_id = ?status.activity_id,
                    "query aborted ({}): {}",
                    cause,
                    query
                );
            }
        }
    }
}
