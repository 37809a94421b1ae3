//! In-memory document collections and the transactional write path
//!
//! The only constraint this write path enforces is primary-key uniqueness
//! of the document id within a collection. Writes inside a transaction are
//! staged in a [`WriteSet`] and become visible only at commit; a staged
//! write participates in uniqueness checks for later writes of the same
//! transaction, so a transaction can collide with itself.
//!
//! Outcomes are returned as data rather than errors so the session layer
//! can inspect them: a duplicate key inside a transaction forces an
//! implicit abort before the failure is surfaced to the caller.

use dashmap::DashMap;
use petrel_core::Document;
use std::collections::HashMap;

/// Outcome of staging or applying a single write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was staged (inside a transaction) or applied (outside)
    Applied,
    /// The document id already exists in the collection or in the
    /// transaction's own staged writes
    DuplicateKey {
        /// Primary key that collided
        id: String,
    },
}

/// Buffered writes of one transaction
///
/// Applied to collections at commit, discarded at abort. A write set can
/// span collections (multi-document transactions).
#[derive(Debug, Default)]
pub struct WriteSet {
    // collection name → id → staged document
    staged: HashMap<String, HashMap<String, Document>>,
}

impl WriteSet {
    /// Create an empty write set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this transaction already staged `id` in `collection`
    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.staged
            .get(collection)
            .is_some_and(|docs| docs.contains_key(id))
    }

    /// Number of staged documents across all collections
    pub fn len(&self) -> usize {
        self.staged.values().map(HashMap::len).sum()
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub(crate) fn stage(&mut self, collection: &str, doc: Document) {
        self.staged
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc);
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (String, Document)> {
        self.staged
            .into_iter()
            .flat_map(|(name, docs)| docs.into_values().map(move |doc| (name.clone(), doc)))
    }
}

/// An in-memory collection of documents keyed by primary id
#[derive(Debug)]
pub struct Collection {
    name: String,
    docs: DashMap<String, Document>,
}

impl Collection {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: DashMap::new(),
        }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a committed document with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    /// Fetch a committed document by id
    pub fn get(&self, id: &str) -> Option<Document> {
        self.docs.get(id).map(|d| d.value().clone())
    }

    /// Number of committed documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the collection holds no committed documents
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Insert outside a transaction: applies immediately
    pub fn insert(&self, doc: Document) -> WriteOutcome {
        use dashmap::mapref::entry::Entry;
        match self.docs.entry(doc.id.clone()) {
            Entry::Occupied(_) => WriteOutcome::DuplicateKey { id: doc.id },
            Entry::Vacant(slot) => {
                slot.insert(doc);
                WriteOutcome::Applied
            }
        }
    }

    /// Stage an insert for a transaction
    ///
    /// The uniqueness check consults committed documents and the
    /// transaction's own staged writes. On success the document lands in
    /// `writes`, not in the collection.
    pub fn stage_insert(&self, writes: &mut WriteSet, doc: Document) -> WriteOutcome {
        if self.contains(&doc.id) || writes.contains(&self.name, &doc.id) {
            return WriteOutcome::DuplicateKey { id: doc.id };
        }
        writes.stage(&self.name, doc);
        WriteOutcome::Applied
    }

    /// Apply a write from a committed transaction
    ///
    /// Cross-transaction write conflicts are the concurrency layer's
    /// concern, not this store's; a committed write always lands.
    pub(crate) fn apply(&self, doc: Document) {
        self.docs.insert(doc.id.clone(), doc);
    }
}
