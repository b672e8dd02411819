//! Batch runner: an ordered list of queries, one at a time.
//!
//! Query N+1 is submitted only after query N reached a terminal outcome.
//! The first fatal outcome stops the batch; the partial [`BatchResult`] is
//! returned rather than an error so the caller decides what happens next.

mod rerun;
mod result;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::connection::ConnectionProvider;
use crate::control::CancelToken;
use crate::executor::QueryExecutor;
use crate::observer::{Observer, TracingObserver};
use crate::retry::{FatalCause, RetryPolicy};

pub use rerun::BatchRerunPolicy;
pub use result::BatchResult;

/// Owns the connection for the duration of its batches.
pub struct BatchRunner<P, O = TracingObserver> {
    provider: P,
    policy: RetryPolicy,
    observer: O,
    cancel: CancelToken,
    closed: AtomicBool,
}

impl<P: ConnectionProvider> BatchRunner<P, TracingObserver> {
    /// Runner that logs events through `tracing`.
    pub fn new(provider: P, policy: RetryPolicy) -> Self {
        Self::with_observer(provider, policy, TracingObserver)
    }
}

impl<P, O> BatchRunner<P, O>
where
    P: ConnectionProvider,
    O: Observer,
{
    pub fn with_observer(provider: P, policy: RetryPolicy, observer: O) -> Self {
        Self {
            provider,
            policy,
            observer,
            cancel: CancelToken::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `queries` in order and report the aggregate outcome.
    pub async fn run<S: AsRef<str>>(&self, queries: &[S]) -> BatchResult {
        let mut result = BatchResult::new(queries.len());
        let executor =
            QueryExecutor::new(&self.provider, &self.policy, &self.observer, &self.cancel);
        tracing::info!(queries = queries.len(), "starting batch");

        for (index, query) in queries.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(index, "cancellation observed; not submitting remaining queries");
                result.record_cancelled();
                break;
            }

            let report = executor.execute(index, query.as_ref()).await;
            if report.outcome.is_success() {
                result.record_success(report.request_charge);
                continue;
            }

            let cause = report.outcome.fatal_cause();
            result.record_failure(
                index,
                report.request_charge,
                cause == Some(&FatalCause::Cancelled),
            );
            tracing::error!(
                index,
                attempts = report.attempts,
                "batch aborted: {}",
                cause.map(ToString::to_string).unwrap_or_default()
            );
            break;
        }

        tracing::info!(
            attempted = result.attempted,
            succeeded = result.succeeded,
            aborted = result.aborted,
            request_charge = result.request_charge,
            "batch finished"
        );
        result
    }

    /// Close the provider. Only the first call reaches it.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.provider.close();
        }
    }
}
