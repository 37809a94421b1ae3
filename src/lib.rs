//! PetrelDB - multi-document transaction engine core
//!
//! PetrelDB tracks the lifecycle of session-scoped transactions and keeps
//! exactly-once counters over every start, commit, and abort, whether the
//! abort was requested by the client, forced by a failed write inside the
//! transaction, or forced by session teardown. A status query exposes the
//! counters as a structured document.
//!
//! # Quick Start
//!
//! ```
//! use petreldb::{Database, Document, SessionId};
//!
//! let db = Database::new();
//! db.create_collection("users");
//!
//! let session = SessionId::new();
//! db.start_transaction(session)?;
//! db.insert(session, "users", Document::with_id("u1"))?;
//! db.commit_transaction(session)?;
//!
//! let snapshot = db.counters().snapshot();
//! assert_eq!(snapshot.total_committed, 1);
//! assert_eq!(snapshot.current_open, 0);
//! # Ok::<(), petreldb::Error>(())
//! ```
//!
//! # Architecture
//!
//! The [`Database`] facade owns the session registry, the shared lifecycle
//! counters, and the collections; sessions drive it either through its
//! methods or through the typed [`Command`] set. Internal layering
//! (`petrel-core`, `petrel-txn`, `petrel-engine`) is re-exported here.

// Re-export the public API from petrel-engine
pub use petrel_engine::*;
