//! Retry and backoff policy.
//!
//! This module encapsulates failure classification (throttling versus
//! fatal rejections and transport loss) and the backoff decision so the
//! executor can stay a thin loop around them.

mod classify;
mod policy;

pub use classify::{classify, FatalCause};
pub use policy::{FailureKind, RetryDecision, RetryPolicy, RetryState};
