//! Per-session transaction state machine
//!
//! One TransactionState exists per session, owned exclusively by it and
//! mutated only under the registry's per-session lock. Transitions:
//!
//! - `NoTransaction` → `Active` (start)
//! - `Active` → `Committed` (commit)
//! - `Active` → `Aborted` (abort: client request, failed write, teardown)
//!
//! `Committed` and `Aborted` are terminal for the transaction they end;
//! for the session they are equivalent to `NoTransaction`: the next
//! `start` succeeds and allocates a fresh id, while `commit`/`abort`
//! fail with `NoSuchTransaction`. Each successful transition emits exactly
//! one event into the shared [`TransactionCounters`].

use crate::counters::TransactionCounters;
use petrel_core::{Error, LogicalClock, LogicalTime, Result, SessionId, TxnId};
use std::fmt;
use tracing::{debug, warn};

/// Lifecycle phase of a session's transaction slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnPhase {
    /// No transaction has ever been started on this session
    NoTransaction,
    /// A transaction is open and accepting operations
    Active,
    /// The most recent transaction committed; ready for a new start
    Committed,
    /// The most recent transaction aborted; ready for a new start
    Aborted,
}

impl TxnPhase {
    /// Whether a new transaction may start from this phase
    pub fn can_start(&self) -> bool {
        !matches!(self, TxnPhase::Active)
    }
}

/// Why a transaction aborted
///
/// The counters are cause-blind; the cause appears only in the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortCause {
    /// The client issued an explicit abort request
    Client,
    /// A write inside the transaction failed and forced the abort
    WriteConflict,
    /// The owning session was torn down with the transaction still open
    SessionEnd,
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortCause::Client => write!(f, "client request"),
            AbortCause::WriteConflict => write!(f, "write conflict"),
            AbortCause::SessionEnd => write!(f, "session end"),
        }
    }
}

/// Lifecycle state of one session's transactions
#[derive(Debug)]
pub struct TransactionState {
    session: SessionId,
    phase: TxnPhase,
    /// Id of the current or most recent transaction
    current: Option<TxnId>,
    /// Allocator for per-session monotone transaction ids
    next_id: u64,
    /// Logical time the current transaction entered `Active`
    started_at: Option<LogicalTime>,
}

impl TransactionState {
    /// Create state for a session that has never run a transaction
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            phase: TxnPhase::NoTransaction,
            current: None,
            next_id: 1,
            started_at: None,
        }
    }

    /// Session this state belongs to
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> TxnPhase {
        self.phase
    }

    /// Whether a transaction is currently open
    pub fn is_active(&self) -> bool {
        self.phase == TxnPhase::Active
    }

    /// Id of the current or most recent transaction, if any
    pub fn txn_id(&self) -> Option<TxnId> {
        self.current
    }

    /// Logical start time of the current or most recent transaction
    pub fn started_at(&self) -> Option<LogicalTime> {
        self.started_at
    }

    /// Open a new transaction
    ///
    /// Valid only when no transaction is active. Allocates the next
    /// per-session id, stamps the start time, and records the start event.
    ///
    /// # Errors
    /// `Error::TransactionInProgress` if the session already has an active
    /// transaction; counters are untouched.
    pub fn start(&mut self, counters: &TransactionCounters, clock: &LogicalClock) -> Result<TxnId> {
        if !self.phase.can_start() {
            return Err(Error::TransactionInProgress {
                session: self.session,
            });
        }

        let id = TxnId::new(self.next_id);
        self.next_id += 1;
        self.current = Some(id);
        self.started_at = Some(clock.tick());
        self.phase = TxnPhase::Active;
        counters.record_start();

        debug!(
            target: "petrel::txn",
            session = %self.session,
            txn = %id,
            "transaction started"
        );
        Ok(id)
    }

    /// Commit the active transaction
    ///
    /// Not idempotent: committing twice fails the second time.
    ///
    /// # Errors
    /// `Error::NoSuchTransaction` if no transaction is active: never
    /// started, already committed, or already aborted (including an abort
    /// forced by a failed write). Counters are untouched on failure.
    pub fn commit(&mut self, counters: &TransactionCounters) -> Result<()> {
        if !self.is_active() {
            return Err(Error::NoSuchTransaction {
                session: self.session,
            });
        }

        self.phase = TxnPhase::Committed;
        counters.record_commit();

        debug!(
            target: "petrel::txn",
            session = %self.session,
            txn = self.current.map(|t| t.as_u64()),
            "transaction committed"
        );
        Ok(())
    }

    /// Abort the active transaction
    ///
    /// Every abort path (client request, failed write, session teardown)
    /// funnels through this single transition and the single counter
    /// event.
    ///
    /// # Errors
    /// `Error::NoSuchTransaction` if no transaction is active; counters
    /// are untouched on failure.
    pub fn abort(&mut self, cause: AbortCause, counters: &TransactionCounters) -> Result<()> {
        if !self.is_active() {
            return Err(Error::NoSuchTransaction {
                session: self.session,
            });
        }

        self.phase = TxnPhase::Aborted;
        counters.record_abort();

        warn!(
            target: "petrel::txn",
            session = %self.session,
            txn = self.current.map(|t| t.as_u64()),
            cause = %cause,
            "transaction aborted"
        );
        Ok(())
    }
}
