//! Core types for PetrelDB
//!
//! This crate defines the foundational types used throughout the system:
//! - SessionId: Unique identifier for client sessions
//! - TxnId: Session-scoped transaction identifier
//! - LogicalClock / LogicalTime: Monotone logical timestamps
//! - Document: A document with a unique primary key
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use document::Document;
pub use error::{Error, Result};
pub use types::{LogicalClock, LogicalTime, SessionId, TxnId};
