//! Session registry: session identity → owned transaction state
//!
//! At most one entry per session. The per-entry mutex is the mutual
//! exclusion point for that session's lifecycle transitions; unrelated
//! sessions never contend on it. The map itself is a DashMap so lookups
//! and teardown of different sessions proceed in parallel.
//!
//! Uses parking_lot::Mutex instead of std::sync::Mutex to avoid cascading
//! panics from mutex poisoning.

use crate::counters::TransactionCounters;
use crate::state::{AbortCause, TransactionState};
use dashmap::DashMap;
use parking_lot::Mutex;
use petrel_core::SessionId;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns the mapping from session identity to its transaction state
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Mutex<TransactionState>>>,
    counters: Arc<TransactionCounters>,
}

impl SessionRegistry {
    /// Create a registry that reports lifecycle events into `counters`
    pub fn new(counters: Arc<TransactionCounters>) -> Self {
        Self {
            sessions: DashMap::new(),
            counters,
        }
    }

    /// Counters this registry reports into
    pub fn counters(&self) -> &Arc<TransactionCounters> {
        &self.counters
    }

    /// Return the session's state, creating it on first use
    ///
    /// A fresh entry starts in `NoTransaction`.
    pub fn get_or_create(&self, session: SessionId) -> Arc<Mutex<TransactionState>> {
        self.sessions
            .entry(session)
            .or_insert_with(|| {
                debug!(target: "petrel::session", session = %session, "session registered");
                Arc::new(Mutex::new(TransactionState::new(session)))
            })
            .clone()
    }

    /// Remove a session, force-aborting any transaction still open
    ///
    /// A transaction left `Active` at teardown is driven through the
    /// normal abort transition first, so the open count never dangles.
    /// Returns whether the session existed.
    pub fn remove(&self, session: SessionId) -> bool {
        match self.sessions.remove(&session) {
            Some((_, state)) => {
                let mut state = state.lock();
                if state.is_active() {
                    // Guarded by is_active under the same lock; cannot fail.
                    let _ = state.abort(AbortCause::SessionEnd, &self.counters);
                }
                info!(target: "petrel::session", session = %session, "session removed");
                true
            }
            None => false,
        }
    }

    /// Whether the session currently has an entry
    pub fn contains(&self, session: SessionId) -> bool {
        self.sessions.contains_key(&session)
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are registered
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
