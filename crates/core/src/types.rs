//! Identifier and logical-time types
//!
//! This module defines the foundational types:
//! - SessionId: unique identifier for a client session
//! - TxnId: session-scoped transaction identifier
//! - LogicalClock / LogicalTime: monotone logical timestamps

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Unique identifier for a client session
///
/// A SessionId is a wrapper around a UUID v4. Session identity is assigned
/// by the layer that creates the session (driver, shell, test harness) and
/// scopes at most one active transaction at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random SessionId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a SessionId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a SessionId from a string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this SessionId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-scoped transaction identifier
///
/// TxnIds are allocated per session and increase monotonically within it.
/// They are opaque to callers; two sessions may use the same numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxnId(u64);

impl TxnId {
    /// Wrap a raw transaction number
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    /// Get the raw transaction number
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point on the process-wide logical clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogicalTime(u64);

impl LogicalTime {
    /// Get the raw tick count
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotone logical clock
///
/// Stamps transaction start times. Ticks are strictly increasing across
/// the whole process; wall-clock time is never consulted.
#[derive(Debug, Default)]
pub struct LogicalClock {
    ticks: AtomicU64,
}

impl LogicalClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock and return the new time
    pub fn tick(&self) -> LogicalTime {
        LogicalTime(self.ticks.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Read the current time without advancing
    pub fn now(&self) -> LogicalTime {
        LogicalTime(self.ticks.load(Ordering::SeqCst))
    }
}
