//! Batch cancellation.
//!
//! A `CancelToken` is shared between the caller (e.g. a ctrl-c handler) and
//! the batch runner. The runner checks it before submitting a query, and
//! every retry or rerun wait ends early once it is set. In-flight requests
//! are never killed; nothing new starts once the token is set.

use std::time::Duration;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cloneable cancellation token; all clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    token: CancellationToken,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("cancellation requested");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation is requested.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Sleep for `delay` unless cancelled first.
    ///
    /// Returns `true` when the full delay elapsed and the token is still
    /// clear, `false` when cancellation cut the wait short (or was already
    /// set).
    pub async fn sleep(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(delay) => !self.token.is_cancelled(),
        }
    }
}
