//! Process-wide transaction lifecycle counters
//!
//! One instance is created with the database and shared by all sessions
//! for the life of the process; nothing resets it short of a restart.
//!
//! # Consistency
//!
//! Each lifecycle event updates its two counters inside a single short
//! critical section, so a concurrent snapshot always reflects a state that
//! was true at one instant: readers can never observe `total_started`
//! bumped without the matching `current_open` bump. The invariant
//! `total_started == total_committed + total_aborted + current_open` holds
//! for every observer, not just quiescent ones. A reader/writer lock lets
//! status reads share the lock with each other, and every critical
//! section is a handful of integer operations.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
struct Cells {
    current_open: u64,
    total_started: u64,
    total_committed: u64,
    total_aborted: u64,
}

/// Lifecycle counters shared by all sessions
///
/// Owned explicitly by the database and injected wherever transitions are
/// driven; there is no global instance, so tests construct a fresh one.
#[derive(Debug, Default)]
pub struct TransactionCounters {
    cells: RwLock<Cells>,
}

impl TransactionCounters {
    /// Create counters with all values at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `NoTransaction → Active` transition
    ///
    /// Increments `total_started` and `current_open` as one event.
    pub fn record_start(&self) {
        let mut cells = self.cells.write();
        cells.total_started += 1;
        cells.current_open += 1;
    }

    /// Record an `Active → Committed` transition
    ///
    /// Increments `total_committed` and decrements `current_open` as one
    /// event. The state machine never emits a commit without a prior
    /// start, so the decrement saturates rather than underflows.
    pub fn record_commit(&self) {
        let mut cells = self.cells.write();
        cells.total_committed += 1;
        cells.current_open = cells.current_open.saturating_sub(1);
    }

    /// Record an `Active → Aborted` transition, whatever the cause
    pub fn record_abort(&self) {
        let mut cells = self.cells.write();
        cells.total_aborted += 1;
        cells.current_open = cells.current_open.saturating_sub(1);
    }

    /// Consistent point-in-time view of all four counters
    pub fn snapshot(&self) -> CountersSnapshot {
        let cells = self.cells.read();
        CountersSnapshot {
            current_open: cells.current_open,
            total_started: cells.total_started,
            total_committed: cells.total_committed,
            total_aborted: cells.total_aborted,
        }
    }

    /// Number of sessions currently inside a transaction
    pub fn current_open(&self) -> u64 {
        self.cells.read().current_open
    }
}

/// Point-in-time view of the lifecycle counters
///
/// Serializes with the camelCase field names of the status document:
/// `currentOpen`, `totalStarted`, `totalCommitted`, `totalAborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountersSnapshot {
    /// Sessions currently in an active transaction
    pub current_open: u64,
    /// Transactions ever started
    pub total_started: u64,
    /// Transactions ever committed
    pub total_committed: u64,
    /// Transactions ever aborted, regardless of cause
    pub total_aborted: u64,
}

impl CountersSnapshot {
    /// Whether this snapshot satisfies the accounting invariant
    ///
    /// `total_started == total_committed + total_aborted + current_open`
    /// must hold for every snapshot a correct implementation produces.
    pub fn is_balanced(&self) -> bool {
        self.total_started == self.total_committed + self.total_aborted + self.current_open
    }

    /// Transactions that reached a terminal state
    pub fn total_completed(&self) -> u64 {
        self.total_committed + self.total_aborted
    }
}
