//! Record and cursor data structures.

use serde::{Deserialize, Serialize};

/// A single harvested record.
///
/// The id is assigned by the upstream feed and is monotonically meaningful:
/// a larger id always means a newer record. The text is stored exactly as
/// received; sanitization happens at read time only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Upstream-assigned identifier
    pub id: i64,

    /// Raw record text
    pub text: String,
}

impl Record {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Pagination cursor for an upstream fetch.
///
/// At most one of `since_id`/`max_id` is set per request: backfill walks
/// backward with `max_id`, the incremental poller walks forward with
/// `since_id`, and the very first fetch against an empty store sets neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchCursor {
    /// Only return records strictly newer than this id
    pub since_id: Option<i64>,

    /// Only return records with id at most this value
    pub max_id: Option<i64>,

    /// Maximum number of records per page
    pub count: Option<usize>,
}

impl FetchCursor {
    /// Cursor for a backward (backfill) page ending below the oldest stored id.
    pub fn backward(oldest_id: Option<i64>, page_size: usize) -> Self {
        Self {
            since_id: None,
            max_id: oldest_id.map(|id| id - 1),
            count: Some(page_size),
        }
    }

    /// Cursor for a forward (incremental) page above the newest stored id.
    pub fn forward(newest_id: Option<i64>) -> Self {
        Self {
            since_id: newest_id,
            max_id: None,
            count: None,
        }
    }
}
