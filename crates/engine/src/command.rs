//! Typed command set for driving sessions
//!
//! Commands are the closed instruction set of the engine: every operation
//! a collaborator can issue against a session is a variant here. They are
//! self-contained, serializable, and pure data: no stringly-typed
//! dispatch, no closures.

use crate::database::Database;
use crate::status;
use petrel_core::{Document, Result, SessionId, TxnId};
use serde::{Deserialize, Serialize};

/// A self-contained, serializable session operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Open a transaction on the session.
    /// Returns: `Output::Started`
    StartTransaction,

    /// Commit the session's active transaction.
    /// Returns: `Output::Done`
    CommitTransaction,

    /// Abort the session's active transaction.
    /// Returns: `Output::Done`
    AbortTransaction,

    /// Insert a document. Staged when a transaction is active, applied
    /// immediately otherwise.
    /// Returns: `Output::Done`
    Insert {
        /// Target collection
        collection: String,
        /// Document to insert
        document: Document,
    },

    /// Create a collection.
    /// Returns: `Output::Bool` (true if newly created)
    CreateCollection {
        /// Collection name
        name: String,
    },

    /// Drop a collection.
    /// Returns: `Output::Bool` (true if it existed)
    DropCollection {
        /// Collection name
        name: String,
    },

    /// Tear down the session, aborting any open transaction.
    /// Returns: `Output::Bool` (true if the session existed)
    EndSession,

    /// Fetch the status document.
    /// Returns: `Output::Status`
    ServerStatus,
}

/// Result of executing a [`Command`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// A transaction opened with this id
    Started(TxnId),
    /// The operation completed with nothing to report
    Done,
    /// Boolean result
    Bool(bool),
    /// The status document
    Status(serde_json::Value),
}

impl Database {
    /// Execute a command on behalf of a session
    ///
    /// Lifecycle errors (`TransactionInProgress`, `NoSuchTransaction`) and
    /// write failures propagate unchanged to the caller; none of them
    /// tears down the session itself.
    pub fn execute(&self, session: SessionId, command: Command) -> Result<Output> {
        match command {
            Command::StartTransaction => self.start_transaction(session).map(Output::Started),
            Command::CommitTransaction => self.commit_transaction(session).map(|_| Output::Done),
            Command::AbortTransaction => self.abort_transaction(session).map(|_| Output::Done),
            Command::Insert {
                collection,
                document,
            } => self.insert(session, &collection, document).map(|_| Output::Done),
            Command::CreateCollection { name } => Ok(Output::Bool(self.create_collection(&name))),
            Command::DropCollection { name } => Ok(Output::Bool(self.drop_collection(&name))),
            Command::EndSession => Ok(Output::Bool(self.end_session(session))),
            Command::ServerStatus => Ok(Output::Status(status::server_status(self))),
        }
    }
}
