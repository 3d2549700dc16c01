//! Append-only in-memory record store.
//!
//! The store is a plain order-preserving sequence of [`InsightRecord`]s:
//! records are appended exactly once and never removed or content-mutated
//! afterwards, so iteration order always equals insertion order. It lives
//! for the process lifetime only and has no internal locking — the engine
//! runs a single-threaded request/response model, and any caller embedding
//! it in a concurrent context must bring its own mutual exclusion.

use tracing::debug;
use uuid::Uuid;
use weave_types::InsightRecord;

/// Order-preserving, append-only collection of insight records.
#[derive(Debug, Default)]
pub struct InsightStore {
    records: Vec<InsightRecord>,
}

impl InsightStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. This is the store's only mutating operation.
    pub fn append(&mut self, record: InsightRecord) {
        debug!(
            id = %record.id,
            aggregate = record.is_aggregate,
            total = self.records.len() + 1,
            "record appended to store"
        );
        self.records.push(record);
    }

    /// Read-only view of every record, in insertion order.
    pub fn records(&self) -> &[InsightRecord] {
        &self.records
    }

    /// The most recently inserted record, if any.
    pub fn last(&self) -> Option<&InsightRecord> {
        self.records.last()
    }

    /// Look up a record by id.
    pub fn get(&self, id: Uuid) -> Option<&InsightRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
