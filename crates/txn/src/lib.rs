//! Transaction lifecycle subsystem for PetrelDB
//!
//! This crate implements session-scoped transaction bookkeeping:
//! - TransactionState: per-session lifecycle state machine
//! - TransactionCounters: process-wide counters with consistent snapshots
//! - SessionRegistry: session identity → owned transaction state
//! - StatusReporter: read-only snapshot surface for status callers
//!
//! Every `start`/`commit`/`abort` transition emits exactly one counter
//! event, regardless of whether the abort was requested by the client,
//! forced by a failed write, or forced by session teardown. The counters
//! satisfy `total_started == total_committed + total_aborted +
//! current_open` at every observable instant.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod counters;
pub mod registry;
pub mod state;
pub mod status;

pub use counters::{CountersSnapshot, TransactionCounters};
pub use registry::SessionRegistry;
pub use state::{AbortCause, TransactionState, TxnPhase};
pub use status::StatusReporter;
