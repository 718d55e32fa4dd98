// src/pipeline/poll.rs

//! Incremental forward polling.
//!
//! Once the backfill is done, the poller extends the store forward on a
//! fixed period using the newest stored id as the `since_id` cursor. Each
//! tick is self-contained: a failed tick is logged and the next tick's
//! cursor naturally re-covers anything it missed.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::error::Result;
use crate::models::FetchCursor;
use crate::services::FeedClient;
use crate::storage::{InsertOutcome, RecordStore};

/// Fetch records newer than the stored high-water mark and insert them.
///
/// Returns the number of newly stored records.
pub async fn poll_once(store: &dyn RecordStore, feed: &dyn FeedClient) -> Result<usize> {
    let cursor = FetchCursor::forward(store.newest_id().await?);
    let page = feed.fetch_page(&cursor).await?;

    let mut stored = 0;
    for record in page {
        if store.insert(record).await? == InsertOutcome::Inserted {
            stored += 1;
        }
    }
    Ok(stored)
}

/// Run the incremental poll on a fixed period, indefinitely.
///
/// Ticks are serialized: the tick body runs inline in the schedule loop and
/// a missed deadline delays the next tick rather than bursting, so the
/// forward writer can never overlap itself.
pub async fn run_poller(
    store: Arc<dyn RecordStore>,
    feed: Arc<dyn FeedClient>,
    period: Duration,
) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately; the backfill has
    // just run, so consume it.
    interval.tick().await;

    loop {
        interval.tick().await;
        match poll_once(store.as_ref(), feed.as_ref()).await {
            Ok(0) => log::debug!("Poll tick: nothing new"),
            Ok(n) => log::info!("Poll tick: stored {n} new records"),
            Err(e) => log::error!("Poll tick failed: {e}"),
        }
    }
}
