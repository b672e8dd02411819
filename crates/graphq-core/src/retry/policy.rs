use std::time::Duration;

use crate::retry::FatalCause;
use crate::status::ResponseStatus;

/// High-level classification of a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// Server rejected the request for exceeding its throughput allowance.
    Throttled,
    /// Anything that another attempt cannot fix.
    Fatal(FatalCause),
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Resubmit after the given delay.
    Wait(Duration),
    /// Stop; the query is finished as a failure.
    Abort,
}

/// Per-query retry bookkeeping. A fresh state is created for every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// 1-based number of the attempt that just ran.
    pub attempt: u32,
    /// Total time spent waiting between attempts so far.
    pub cumulative_delay: Duration,
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            attempt: 1,
            cumulative_delay: Duration::ZERO,
        }
    }

    /// Record a completed wait and move to the next attempt.
    pub fn advance(&mut self, waited: Duration) {
        self.attempt = self.attempt.saturating_add(1);
        self.cumulative_delay = self.cumulative_delay.saturating_add(waited);
    }
}

/// Exponential backoff policy with caps. Only throttling is ever retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per query (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff when the server gives no advice.
    pub base_delay: Duration,
    /// Upper bound on computed backoff. Server-advised delays are not capped.
    pub max_delay: Duration,
    /// Optional bound on the total time one query may spend waiting.
    pub max_total_wait: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 9,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
            max_total_wait: None,
        }
    }
}

impl RetryPolicy {
    /// Decide what to do after a failed attempt.
    ///
    /// `state.attempt` is the 1-based attempt that just failed. A
    /// server-advised `retry_after` always wins over computed backoff.
    pub fn decide(
        &self,
        kind: &FailureKind,
        status: Option<&ResponseStatus>,
        state: &RetryState,
    ) -> RetryDecision {
        if let FailureKind::Fatal(_) = kind {
            return RetryDecision::Abort;
        }
        if state.attempt >= self.max_attempts {
            return RetryDecision::Abort;
        }

        let delay = status
            .and_then(|s| s.retry_after)
            .unwrap_or_else(|| self.backoff(state.attempt));

        if let Some(limit) = self.max_total_wait {
            if state.cumulative_delay.saturating_add(delay) > limit {
                return RetryDecision::Abort;
            }
        }
        RetryDecision::Wait(delay)
    }

    /// Computed backoff for a 1-based attempt: base * 2^(attempt-1), capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(exp).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttled_after(ms: u64) -> ResponseStatus {
        ResponseStatus {
            status_code: Some(429),
            retry_after: Some(Duration::from_millis(ms)),
            ..ResponseStatus::default()
        }
    }

    #[test]
    fn fatal_always_aborts() {
        let p = RetryPolicy::default();
        let kind = FailureKind::Fatal(FatalCause::Closed);
        assert_eq!(p.decide(&kind, None, &RetryState::new()), RetryDecision::Abort);
    }

    #[test]
    fn server_advice_wins_over_backoff() {
        let p = RetryPolicy::default();
        let status = throttled_after(200);
        let mut state = RetryState::new();
        state.advance(Duration::from_millis(200));
        state.advance(Duration::from_millis(200));
        assert_eq!(
            p.decide(&FailureKind::Throttled, Some(&status), &state),
            RetryDecision::Wait(Duration::from_millis(200))
        );
    }

    #[test]
    fn server_advice_is_not_capped() {
        let mut p = RetryPolicy::default();
        p.max_delay = Duration::from_millis(100);
        let status = throttled_after(5_000);
        assert_eq!(
            p.decide(&FailureKind::Throttled, Some(&status), &RetryState::new()),
            RetryDecision::Wait(Duration::from_secs(5))
        );
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 40;
        assert_eq!(p.backoff(1), Duration::from_millis(250));
        assert_eq!(p.backoff(2), Duration::from_millis(500));
        assert_eq!(p.backoff(3), Duration::from_millis(1000));
        assert_eq!(p.backoff(30), p.max_delay);

        let mut state = RetryState::new();
        state.attempt = 2;
        assert_eq!(
            p.decide(&FailureKind::Throttled, None, &state),
            RetryDecision::Wait(Duration::from_millis(500))
        );
    }

    #[test]
    fn respects_max_attempts() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 3;
        let mut state = RetryState::new();
        assert!(matches!(
            p.decide(&FailureKind::Throttled, None, &state),
            RetryDecision::Wait(_)
        ));
        state.advance(Duration::ZERO);
        assert!(matches!(
            p.decide(&FailureKind::Throttled, None, &state),
            RetryDecision::Wait(_)
        ));
        state.advance(Duration::ZERO);
        assert_eq!(
            p.decide(&FailureKind::Throttled, None, &state),
            RetryDecision::Abort
        );
    }

    #[test]
    fn total_wait_bound() {
        let mut p = RetryPolicy::default();
        p.max_total_wait = Some(Duration::from_millis(500));
        let status = throttled_after(300);
        let mut state = RetryState::new();
        assert_eq!(
            p.decide(&FailureKind::Throttled, Some(&status), &state),
            RetryDecision::Wait(Duration::from_millis(300))
        );
        state.advance(Duration::from_millis(300));
        assert_eq!(
            p.decide(&FailureKind::Throttled, Some(&status), &state),
            RetryDecision::Abort
        );
    }

    #[test]
    fn retry_state_only_grows() {
        let mut state = RetryState::default();
        assert_eq!(state.attempt, 1);
        state.advance(Duration::from_millis(10));
        state.advance(Duration::from_millis(15));
        assert_eq!(state.attempt, 3);
        assert_eq!(state.cumulative_delay, Duration::from_millis(25));
    }
}
