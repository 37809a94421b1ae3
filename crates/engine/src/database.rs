//! Database facade
//!
//! Owns the shared lifecycle counters, the session registry, the logical
//! clock, the collections, and the per-session write sets. Every lifecycle
//! transition for a session runs under that session's registry lock; the
//! counters are the only resource shared across sessions and they take
//! care of their own consistency.

use crate::collection::{Collection, WriteOutcome, WriteSet};
use dashmap::DashMap;
use petrel_core::{Document, Error, LogicalClock, Result, SessionId, TxnId};
use petrel_txn::{AbortCause, SessionRegistry, StatusReporter, TransactionCounters};
use std::sync::Arc;
use tracing::{debug, warn};

/// Multi-document transaction engine core
///
/// One Database per process. Counters are created with the database and
/// live as long as it does; [`Database::with_counters`] injects a
/// pre-built instance instead, which is how tests get a fresh, isolated
/// counter set.
pub struct Database {
    counters: Arc<TransactionCounters>,
    clock: LogicalClock,
    registry: SessionRegistry,
    collections: DashMap<String, Arc<Collection>>,
    write_sets: DashMap<SessionId, WriteSet>,
}

impl Database {
    /// Create a database with fresh counters
    pub fn new() -> Self {
        Self::with_counters(Arc::new(TransactionCounters::new()))
    }

    /// Create a database reporting into externally owned counters
    pub fn with_counters(counters: Arc<TransactionCounters>) -> Self {
        Self {
            registry: SessionRegistry::new(Arc::clone(&counters)),
            counters,
            clock: LogicalClock::new(),
            collections: DashMap::new(),
            write_sets: DashMap::new(),
        }
    }

    /// The lifecycle counters this database reports into
    pub fn counters(&self) -> &Arc<TransactionCounters> {
        &self.counters
    }

    /// Read-only status handle over the counters
    pub fn status_reporter(&self) -> StatusReporter {
        StatusReporter::new(Arc::clone(&self.counters))
    }

    /// The session registry
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Create a collection; returns false if it already existed
    pub fn create_collection(&self, name: &str) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.collections.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Collection::new(name)));
                debug!(target: "petrel::engine", collection = name, "collection created");
                true
            }
        }
    }

    /// Drop a collection; returns whether it existed
    pub fn drop_collection(&self, name: &str) -> bool {
        self.collections.remove(name).is_some()
    }

    /// Look up a collection by name
    pub fn collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.get(name).map(|c| Arc::clone(c.value()))
    }

    // =========================================================================
    // Transaction lifecycle
    // =========================================================================

    /// Start a transaction on the session
    ///
    /// # Errors
    /// `Error::TransactionInProgress` if the session already has one open.
    pub fn start_transaction(&self, session: SessionId) -> Result<TxnId> {
        let state = self.registry.get_or_create(session);
        let mut state = state.lock();
        let id = state.start(&self.counters, &self.clock)?;
        self.write_sets.insert(session, WriteSet::new());
        Ok(id)
    }

    /// Commit the session's active transaction, making its writes visible
    ///
    /// # Errors
    /// `Error::NoSuchTransaction` if none is active, including after an
    /// implicit abort forced by a failed write.
    pub fn commit_transaction(&self, session: SessionId) -> Result<()> {
        let state = self.registry.get_or_create(session);
        let mut state = state.lock();
        state.commit(&self.counters)?;

        if let Some((_, writes)) = self.write_sets.remove(&session) {
            self.apply_writes(writes);
        }
        Ok(())
    }

    /// Abort the session's active transaction at the client's request
    ///
    /// # Errors
    /// `Error::NoSuchTransaction` if none is active.
    pub fn abort_transaction(&self, session: SessionId) -> Result<()> {
        let state = self.registry.get_or_create(session);
        let mut state = state.lock();
        state.abort(AbortCause::Client, &self.counters)?;
        self.write_sets.remove(&session);
        Ok(())
    }

    /// Tear down a session
    ///
    /// A transaction still open on the session is aborted first (counted
    /// exactly once); its staged writes are discarded. Returns whether the
    /// session existed.
    pub fn end_session(&self, session: SessionId) -> bool {
        let existed = self.registry.remove(session);
        self.write_sets.remove(&session);
        existed
    }

    // =========================================================================
    // Write path
    // =========================================================================

    /// Insert a document on behalf of a session
    ///
    /// Inside an active transaction the write is staged and invisible
    /// until commit. A duplicate-key failure inside a transaction forces
    /// the transaction through the implicit-abort path before the failure
    /// is returned; a later commit then fails with `NoSuchTransaction`.
    /// Outside a transaction the insert applies immediately and never
    /// touches the lifecycle counters.
    ///
    /// # Errors
    /// `Error::CollectionNotFound` if the collection does not exist;
    /// `Error::DuplicateKey` on a primary-key collision.
    pub fn insert(&self, session: SessionId, collection: &str, doc: Document) -> Result<()> {
        let coll = self
            .collection(collection)
            .ok_or_else(|| Error::CollectionNotFound {
                collection: collection.to_string(),
            })?;

        let state = self.registry.get_or_create(session);
        let mut state = state.lock();

        if !state.is_active() {
            return match coll.insert(doc) {
                WriteOutcome::Applied => Ok(()),
                WriteOutcome::DuplicateKey { id } => Err(Error::DuplicateKey {
                    collection: collection.to_string(),
                    id,
                }),
            };
        }

        let outcome = {
            let mut writes = self.write_sets.entry(session).or_default();
            coll.stage_insert(&mut writes, doc)
        };

        match outcome {
            WriteOutcome::Applied => Ok(()),
            WriteOutcome::DuplicateKey { id } => {
                // The failed write aborts the transaction; the write's own
                // error still goes back to the caller.
                let _ = state.abort(AbortCause::WriteConflict, &self.counters);
                self.write_sets.remove(&session);
                Err(Error::DuplicateKey {
                    collection: collection.to_string(),
                    id,
                })
            }
        }
    }

    fn apply_writes(&self, writes: WriteSet) {
        for (name, doc) in writes.into_entries() {
            match self.collections.get(&name) {
                Some(coll) => coll.apply(doc),
                None => {
                    // Collection dropped while the transaction was open;
                    // nothing to apply the write to.
                    warn!(
                        target: "petrel::engine",
                        collection = %name,
                        "discarding committed write to dropped collection"
                    );
                }
            }
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_injection() {
        let counters = Arc::new(TransactionCounters::new());
        let db = Database::with_counters(Arc::clone(&counters));

        let session = SessionId::new();
        db.start_transaction(session).unwrap();
        assert_eq!(counters.snapshot().current_open, 1);
    }

    #[test]
    fn test_create_and_drop_collection() {
        let db = Database::new();
        assert!(db.create_collection("users"));
        assert!(!db.create_collection("users"));
        assert!(db.collection("users").is_some());
        assert!(db.drop_collection("users"));
        assert!(!db.drop_collection("users"));
        assert!(db.collection("users").is_none());
    }

    #[test]
    fn test_commit_applies_staged_writes() {
        let db = Database::new();
        db.create_collection("users");
        let session = SessionId::new();

        db.start_transaction(session).unwrap();
        db.insert(session, "users", Document::with_id("u1")).unwrap();

        let coll = db.collection("users").unwrap();
        assert!(!coll.contains("u1"));

        db.commit_transaction(session).unwrap();
        assert!(coll.contains("u1"));
    }

    #[test]
    fn test_abort_discards_staged_writes() {
        let db = Database::new();
        db.create_collection("users");
        let session = SessionId::new();

        db.start_transaction(session).unwrap();
        db.insert(session, "users", Document::with_id("u1")).unwrap();
        db.abort_transaction(session).unwrap();

        assert!(!db.collection("users").unwrap().contains("u1"));
    }

    #[test]
    fn test_duplicate_key_inside_transaction_forces_abort() {
        let db = Database::new();
        db.create_collection("users");
        let session = SessionId::new();

        db.start_transaction(session).unwrap();
        db.insert(session, "users", Document::with_id("u1")).unwrap();

        let err = db
            .insert(session, "users", Document::with_id("u1"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));

        // The transaction is gone; commit fails and the staged write was
        // discarded with it.
        let err = db.commit_transaction(session).unwrap_err();
        assert!(matches!(err, Error::NoSuchTransaction { .. }));
        assert!(!db.collection("users").unwrap().contains("u1"));

        let snap = db.counters().snapshot();
        assert_eq!(snap.total_aborted, 1);
        assert_eq!(snap.current_open, 0);
    }

    #[test]
    fn test_non_transactional_insert_skips_counters() {
        let db = Database::new();
        db.create_collection("users");
        let session = SessionId::new();

        db.insert(session, "users", Document::with_id("u1")).unwrap();
        let err = db
            .insert(session, "users", Document::with_id("u1"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));

        let snap = db.counters().snapshot();
        assert_eq!(snap.total_started, 0);
        assert_eq!(snap.total_aborted, 0);
        assert!(db.collection("users").unwrap().contains("u1"));
    }

    #[test]
    fn test_insert_into_missing_collection() {
        let db = Database::new();
        let session = SessionId::new();
        let err = db
            .insert(session, "ghost", Document::with_id("u1"))
            .unwrap_err();
        assert!(matches!(err, Error::CollectionNotFound { .. }));
    }

    #[test]
    fn test_end_session_aborts_open_transaction() {
        let db = Database::new();
        db.create_collection("users");
        let session = SessionId::new();

        db.start_transaction(session).unwrap();
        db.insert(session, "users", Document::with_id("u1")).unwrap();

        assert!(db.end_session(session));
        let snap = db.counters().snapshot();
        assert_eq!(snap.current_open, 0);
        assert_eq!(snap.total_aborted, 1);
        assert!(!db.collection("users").unwrap().contains("u1"));
        assert!(!db.end_session(session));
    }

    #[test]
    fn test_transaction_spanning_collections() {
        let db = Database::new();
        db.create_collection("users");
        db.create_collection("orders");
        let session = SessionId::new();

        db.start_transaction(session).unwrap();
        db.insert(session, "users", Document::with_id("u1")).unwrap();
        db.insert(session, "orders", Document::with_id("o1")).unwrap();
        db.commit_transaction(session).unwrap();

        assert!(db.collection("users").unwrap().contains("u1"));
        assert!(db.collection("orders").unwrap().contains("o1"));
    }
}
