//! Pipeline entry points for archiver operations.
//!
//! - `run_backfill`: Walk the feed backward until the store hits its target
//! - `run_poller` / `poll_once`: Extend the store forward from the high-water mark

pub mod backfill;
pub mod poll;

pub use backfill::{BackfillSummary, run_backfill};
pub use poll::{poll_once, run_poller};
