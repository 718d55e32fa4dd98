// src/models/mod.rs

//! Domain models for the feed archiver.

mod record;

// Re-export all public types
pub use record::{FetchCursor, Record};
