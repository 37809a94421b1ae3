//! Document type for multi-document transactions
//!
//! A document is a primary key plus an arbitrary JSON body. The key is the
//! only thing the write path constrains: it must be unique within its
//! collection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A document identified by a unique primary key within its collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Primary key, unique within the owning collection
    #[serde(rename = "_id")]
    pub id: String,
    /// Document body
    #[serde(default)]
    pub body: Value,
}

impl Document {
    /// Create a document with an explicit body
    pub fn new(id: impl Into<String>, body: Value) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    /// Create a key-only document with an empty body
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: Value::Null,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{_id: {}}}", self.id)
    }
}
