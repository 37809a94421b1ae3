//! Read-only status surface over the lifecycle counters
//!
//! Status and monitoring callers hold a StatusReporter instead of the
//! counters themselves: it can only read.

use crate::counters::{CountersSnapshot, TransactionCounters};
use std::sync::Arc;

/// Read-only handle over shared [`TransactionCounters`]
#[derive(Clone)]
pub struct StatusReporter {
    counters: Arc<TransactionCounters>,
}

impl StatusReporter {
    /// Create a reporter over the given counters
    pub fn new(counters: Arc<TransactionCounters>) -> Self {
        Self { counters }
    }

    /// Most recent consistent snapshot of all four counters
    ///
    /// Pure read, no side effects; safe to call concurrently with
    /// in-flight transitions.
    pub fn snapshot(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }
}
