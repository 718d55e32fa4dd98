//! Service layer for the feed archiver.
//!
//! This module contains the business logic for:
//! - Upstream timeline fetching (`TimelineClient`)
//! - Read-time text sanitization (`sanitize`)
//! - Read-only record queries (`RetrievalService`)

mod feed;
mod retrieval;
pub mod sanitize;

pub use feed::{FeedClient, TimelineClient};
pub use retrieval::RetrievalService;

#[cfg(test)]
pub(crate) use feed::testing::ScriptedFeed;
