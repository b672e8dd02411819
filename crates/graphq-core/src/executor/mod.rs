//! Query executor: one query, from submission to a terminal outcome.
//!
//! ```text
//! Idle -> Submitted -> AwaitingResult -> Succeeded
//!                                     -> Throttled -> (wait) -> Submitted
//!                                     -> Fatal
//! ```
//!
//! Each attempt joins the result records and the status attributes; a
//! failure of either half fails the attempt. Throttled attempts are retried
//! per [`RetryPolicy`] with a cooperative wait that cancellation cuts short;
//! anything else, or an exhausted policy, ends the query as `Fatal`.

mod outcome;

use tokio::time::Instant;

use crate::connection::{ConnectionError, ConnectionProvider, QueryHandle};
use crate::control::CancelToken;
use crate::observer::{Observer, QueryEvent};
use crate::retry::{self, FailureKind, FatalCause, RetryDecision, RetryPolicy, RetryState};
use crate::status::{self, ResponseStatus};

pub use outcome::{ExecutionOutcome, ExecutionReport};

/// Runs single queries against a provider.
pub struct QueryExecutor<'a, P, O: ?Sized> {
    provider: &'a P,
    policy: &'a RetryPolicy,
    observer: &'a O,
    cancel: &'a CancelToken,
}

impl<'a, P, O> QueryExecutor<'a, P, O>
where
    P: ConnectionProvider,
    O: Observer + ?Sized,
{
    pub fn new(
        provider: &'a P,
        policy: &'a RetryPolicy,
        observer: &'a O,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            provider,
            policy,
            observer,
            cancel,
        }
    }

    /// Execute `query` until it succeeds or the retry policy aborts.
    ///
    /// The returned outcome is never `Throttled`: exhausted throttling is
    /// reported as `Fatal` with [`FatalCause::RetriesExhausted`].
    pub async fn execute(&self, index: usize, query: &str) -> ExecutionReport {
        let mut state = RetryState::new();
        let mut charge = 0.0;

        loop {
            let outcome = self.attempt(index, query, state.attempt).await;
            charge += outcome.request_charge().unwrap_or(0.0);

            let (kind, status) = match outcome {
                ExecutionOutcome::Success { .. } => {
                    return self.report(outcome, &state, charge);
                }
                ExecutionOutcome::Throttled { status } => (FailureKind::Throttled, Some(status)),
                ExecutionOutcome::Fatal { cause, status } => (FailureKind::Fatal(cause), status),
            };

            if matches!(kind, FailureKind::Throttled) && self.cancel.is_cancelled() {
                return self.abort(index, query, &state, FatalCause::Cancelled, status, charge);
            }

            match self.policy.decide(&kind, status.as_ref(), &state) {
                RetryDecision::Wait(delay) => {
                    if let Some(st) = status.as_ref() {
                        self.observer.on_event(&QueryEvent::RetryWait {
                            index,
                            query,
                            attempt: state.attempt,
                            status: st,
                            delay,
                        });
                    }
                    let started = Instant::now();
                    if !self.cancel.sleep(delay).await {
                        let waited = RetryState {
                            attempt: state.attempt,
                            cumulative_delay: state
                                .cumulative_delay
                                .saturating_add(started.elapsed().min(delay)),
                        };
                        return self.abort(index, query, &waited, FatalCause::Cancelled, status, charge);
                    }
                    state.advance(delay);
                }
                RetryDecision::Abort => {
                    let cause = match kind {
                        FailureKind::Fatal(cause) => cause,
                        FailureKind::Throttled => FatalCause::RetriesExhausted {
                            attempts: state.attempt,
                        },
                    };
                    return self.abort(index, query, &state, cause, status, charge);
                }
            }
        }
    }

    /// One submission: submit, join both halves, extract and classify.
    pub async fn attempt(&self, index: usize, query: &str, attempt: u32) -> ExecutionOutcome {
        self.observer.on_event(&QueryEvent::Submitted {
            index,
            query,
            attempt,
        });
        let started = Instant::now();
        let handle = self.provider.submit(query);
        tracing::debug!(index, attempt, "awaiting result records and status attributes");

        let joined = tokio::try_join!(handle.result_records(), handle.status_attributes());
        let elapsed = started.elapsed();

        match joined {
            Ok((results, attributes)) => {
                let status = status::extract(&attributes);
                if status.extraction_failed {
                    return ExecutionOutcome::Fatal {
                        cause: FatalCause::MalformedStatus,
                        status: Some(status),
                    };
                }
                self.observer.on_event(&QueryEvent::Succeeded {
                    index,
                    query,
                    attempt,
                    results: &results,
                    status: &status,
                    elapsed,
                });
                ExecutionOutcome::Success { results, status }
            }
            Err(err) => {
                tracing::debug!(
                    index,
                    attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "attempt failed: {}",
                    err
                );
                let status = match &err {
                    ConnectionError::Response { attributes, .. } => {
                        Some(status::extract(attributes))
                    }
                    _ => None,
                };
                match retry::classify(&err, status.as_ref()) {
                    FailureKind::Throttled => ExecutionOutcome::Throttled {
                        status: status.unwrap_or_default(),
                    },
                    FailureKind::Fatal(cause) => ExecutionOutcome::Fatal { cause, status },
                }
            }
        }
    }

    fn abort(
        &self,
        index: usize,
        query: &str,
        state: &RetryState,
        cause: FatalCause,
        status: Option<ResponseStatus>,
        charge: f64,
    ) -> ExecutionReport {
        self.observer.on_event(&QueryEvent::Aborted {
            index,
            query,
            attempt: state.attempt,
            cause: &cause,
            status: status.as_ref(),
        });
        self.report(ExecutionOutcome::Fatal { cause, status }, state, charge)
    }

    fn report(&self, outcome: ExecutionOutcome, state: &RetryState, charge: f64) -> ExecutionReport {
        ExecutionReport {
            outcome,
            attempts: state.attempt,
            total_wait: state.cumulative_delay,
            request_charge: charge,
        }
    }
}
