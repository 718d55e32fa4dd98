//! Storage abstractions for record persistence.
//!
//! The store keeps one ordered collection of records, deduplicated by
//! upstream id. Position `i` always refers to the record with the i-th
//! smallest id, so ordering is derived from the data rather than tracked
//! separately.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Record;

// Re-export for convenience
pub use local::LocalStore;

/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was new and has been persisted.
    Inserted,
    /// A record with this id already exists; nothing was written.
    AlreadyPresent,
}

/// Trait for record storage backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether a record with this id is already stored.
    async fn contains(&self, id: i64) -> Result<bool>;

    /// Insert a record, deduplicating by id.
    ///
    /// Inserting an already-present id is a no-op and reports
    /// [`InsertOutcome::AlreadyPresent`]. A successful insert is atomic:
    /// concurrent readers observe either the pre- or post-insert store,
    /// never a partial state.
    async fn insert(&self, record: Record) -> Result<InsertOutcome>;

    /// Smallest stored id, or `None` if the store is empty.
    async fn oldest_id(&self) -> Result<Option<i64>>;

    /// Largest stored id, or `None` if the store is empty.
    async fn newest_id(&self) -> Result<Option<i64>>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize>;

    /// Text at a 0-based position, oldest record first.
    async fn get(&self, position: usize) -> Result<Option<String>>;

    /// Texts from position 0 through `upto` inclusive, oldest first.
    ///
    /// `None` (or an `upto` past the end) returns the full archive.
    async fn range(&self, upto: Option<usize>) -> Result<Vec<String>>;
}
