//! Bounded whole-batch reruns.
//!
//! A batch that aborted may already have applied some of its statements,
//! and typical workloads start with destructive ones (dropping every
//! vertex). Reruns are therefore opt-in and bounded: the default policy
//! runs a batch exactly once.

use std::time::Duration;

use super::{BatchResult, BatchRunner};
use crate::connection::ConnectionProvider;
use crate::observer::Observer;

/// How often a caller may rerun an aborted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRerunPolicy {
    /// Total runs allowed, the first included. Values below 1 act as 1.
    pub max_runs: u32,
    /// Pause between an aborted run and the next one.
    pub delay: Duration,
}

impl Default for BatchRerunPolicy {
    fn default() -> Self {
        Self {
            max_runs: 1,
            delay: Duration::from_secs(60),
        }
    }
}

impl<P, O> BatchRunner<P, O>
where
    P: ConnectionProvider,
    O: Observer,
{
    /// Run the batch, rerunning it after aborts as `policy` allows.
    ///
    /// Stops at the first complete run, when runs are exhausted, or when
    /// cancellation is observed. Returns every run's result in order; the
    /// last one is the outcome.
    pub async fn run_with_reruns<S: AsRef<str>>(
        &self,
        queries: &[S],
        policy: &BatchRerunPolicy,
    ) -> Vec<BatchResult> {
        let max_runs = policy.max_runs.max(1);
        let mut results = Vec::new();

        for run in 1..=max_runs {
            let result = self.run(queries).await;
            let done = result.is_complete() || result.cancelled;
            results.push(result);
            if done || run == max_runs {
                break;
            }

            tracing::warn!(
                run,
                max_runs,
                "batch aborted; rerunning from the first query in {:?}",
                policy.delay
            );
            if !self.cancel_token().sleep(policy.delay).await {
                tracing::info!("cancelled before rerun {}", run + 1);
                break;
            }
        }
        results
    }
}
