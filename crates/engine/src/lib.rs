//! Database engine facade for PetrelDB
//!
//! This crate wires the lifecycle subsystem to the surfaces that drive it:
//! - Database: owns counters, registry, collections, per-session write sets
//! - Collection / WriteSet / WriteOutcome: the minimal transactional write
//!   path (primary-key uniqueness only)
//! - Command / Output: the typed request set sessions are driven with
//! - Server status assembly (`transactions` section)
//!
//! The engine is the only component that knows about all of:
//! - session lifecycle transitions and their counter events
//! - write staging and visibility at commit
//! - the forced implicit abort when a write fails inside a transaction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod command;
pub mod database;
pub mod status;

pub use collection::{Collection, WriteOutcome, WriteSet};
pub use command::{Command, Output};
pub use database::Database;

// Re-export the types callers need to drive the engine.
pub use petrel_core::{Document, Error, LogicalTime, Result, SessionId, TxnId};
pub use petrel_txn::{AbortCause, CountersSnapshot, StatusReporter, TransactionCounters, TxnPhase};
