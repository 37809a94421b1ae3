//! Error types for PetrelDB
//!
//! This module defines all errors owned by the transaction core.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations; variants carry structured fields so callers can react
//! without parsing messages.

use crate::types::SessionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for PetrelDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the transaction core
///
/// Lifecycle errors (`TransactionInProgress`, `NoSuchTransaction`) are local
/// to the offending session and never move the counters. `DuplicateKey` is
/// the write path's own failure: when it happens inside an active
/// transaction the session layer forces an abort first and then returns the
/// error unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Error {
    /// Start requested while the session already has an active transaction
    #[error("transaction already in progress for session {session}")]
    TransactionInProgress {
        /// Session that issued the offending start
        session: SessionId,
    },

    /// Commit or abort requested while the session has no active transaction
    ///
    /// Covers never-started, already-committed, and already-aborted states,
    /// including a transaction that was just auto-aborted by a failed write.
    #[error("no such transaction for session {session}")]
    NoSuchTransaction {
        /// Session that issued the offending request
        session: SessionId,
    },

    /// Insert would violate primary-key uniqueness
    #[error("duplicate key: collection '{collection}' already contains _id '{id}'")]
    DuplicateKey {
        /// Collection the insert targeted
        collection: String,
        /// Primary key that collided
        id: String,
    },

    /// Insert targeted a collection that does not exist
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Name of the missing collection
        collection: String,
    },
}
