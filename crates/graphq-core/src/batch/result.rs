//! Aggregate result of one batch run.

use serde::Serialize;

/// Per-batch counters, built up as queries resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    /// Number of queries in the batch.
    pub total: usize,
    /// Queries that were submitted (the failing one included).
    pub attempted: usize,
    pub succeeded: usize,
    /// 0-based index of the query that ended the batch, if one did.
    pub first_failure_index: Option<usize>,
    /// True if the batch stopped before running every query.
    pub aborted: bool,
    /// True if the stop was caused by cancellation.
    pub cancelled: bool,
    /// Sum of all reported request charges, throttled attempts included.
    pub request_charge: f64,
}

impl BatchResult {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            attempted: 0,
            succeeded: 0,
            first_failure_index: None,
            aborted: false,
            cancelled: false,
            request_charge: 0.0,
        }
    }

    pub(crate) fn record_success(&mut self, charge: f64) {
        self.attempted += 1;
        self.succeeded += 1;
        self.request_charge += charge;
    }

    pub(crate) fn record_failure(&mut self, index: usize, charge: f64, cancelled: bool) {
        self.attempted += 1;
        self.request_charge += charge;
        self.first_failure_index = Some(index);
        self.aborted = true;
        self.cancelled = cancelled;
    }

    /// Cancellation observed before the next query was submitted.
    pub(crate) fn record_cancelled(&mut self) {
        self.aborted = true;
        self.cancelled = true;
    }

    /// Queries that were never submitted.
    pub fn remaining(&self) -> usize {
        self.total - self.attempted
    }

    /// Every query ran and succeeded.
    pub fn is_complete(&self) -> bool {
        !self.aborted && self.succeeded == self.total
    }
}
