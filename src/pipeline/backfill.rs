// src/pipeline/backfill.rs

//! Startup backfill pipeline.
//!
//! Fills the store up to a target population by repeatedly requesting the
//! page of records just older than the oldest one stored. Runs once at
//! startup; any store or upstream error aborts the whole run.

use crate::error::Result;
use crate::models::FetchCursor;
use crate::services::FeedClient;
use crate::storage::{InsertOutcome, RecordStore};

/// Summary of a completed backfill run.
#[derive(Debug, Default)]
pub struct BackfillSummary {
    /// Newly stored records
    pub stored: usize,
    /// Records skipped as already present
    pub duplicates: usize,
    /// Pages fetched from upstream
    pub pages: usize,
    /// Whether upstream ran out of history before the target was reached
    pub exhausted: bool,
}

/// Fill the store up to `target` records by walking the feed backward.
///
/// A whole fetched page is always inserted, even when it overshoots the
/// target; the target is re-checked before the next fetch. An empty page
/// means upstream history is exhausted and terminates the fill.
pub async fn run_backfill(
    store: &dyn RecordStore,
    feed: &dyn FeedClient,
    target: usize,
    page_size: usize,
) -> Result<BackfillSummary> {
    let mut summary = BackfillSummary::default();

    loop {
        let have = store.count().await?;
        log::info!("Contains {have} records.");
        if have >= target {
            break;
        }

        let cursor = FetchCursor::backward(store.oldest_id().await?, page_size);
        let page = feed.fetch_page(&cursor).await?;
        summary.pages += 1;

        if page.is_empty() {
            log::warn!("Upstream exhausted after {have} records (target {target})");
            summary.exhausted = true;
            break;
        }

        for record in page {
            match store.insert(record).await? {
                InsertOutcome::Inserted => summary.stored += 1,
                InsertOutcome::AlreadyPresent => summary.duplicates += 1,
            }
        }
    }

    log::info!(
        "Backfill done: {} stored, {} duplicates, {} pages",
        summary.stored,
        summary.duplicates,
        summary.pages
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Record;
    use crate::services::ScriptedFeed;
    use crate::storage::LocalStore;
    use async_trait::async_trait;
    use tempfile::TempDir;

    async fn empty_store(tmp: &TempDir) -> LocalStore {
        LocalStore::open(tmp.path().join("records.json"))
            .await
            .unwrap()
    }

    fn page(ids: impl IntoIterator<Item = i64>) -> Vec<Record> {
        ids.into_iter()
            .map(|id| Record::new(id, format!("r{id}")))
            .collect()
    }

    #[tokio::test]
    async fn test_terminates_once_target_reached() {
        let tmp = TempDir::new().unwrap();
        let store = empty_store(&tmp).await;
        // One full page of 1..=200 newest-first, then nothing.
        let feed = ScriptedFeed::new(vec![page((1..=200).rev())]);

        let summary = run_backfill(&store, &feed, 50, 200).await.unwrap();

        // The whole page is inserted even though it overshoots the target.
        assert_eq!(store.count().await.unwrap(), 200);
        assert_eq!(summary.stored, 200);
        assert_eq!(summary.pages, 1);
        assert!(!summary.exhausted);
    }

    #[tokio::test]
    async fn test_terminates_on_empty_page() {
        let tmp = TempDir::new().unwrap();
        let store = empty_store(&tmp).await;
        let feed = ScriptedFeed::new(vec![page((91..=100).rev()), Vec::new()]);

        let summary = run_backfill(&store, &feed, 50, 10).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 10);
        assert!(summary.exhausted);
        assert_eq!(summary.pages, 2);
        // Must not keep fetching after the empty page.
        assert_eq!(feed.seen_cursors().len(), 2);
    }

    #[tokio::test]
    async fn test_cursor_walks_backward() {
        let tmp = TempDir::new().unwrap();
        let store = empty_store(&tmp).await;
        let feed = ScriptedFeed::new(vec![page((91..=100).rev()), page((81..=90).rev())]);

        run_backfill(&store, &feed, 20, 10).await.unwrap();

        let cursors = feed.seen_cursors();
        assert_eq!(cursors[0].max_id, None);
        assert_eq!(cursors[1].max_id, Some(90));
        assert_eq!(cursors[0].count, Some(10));
        assert_eq!(store.oldest_id().await.unwrap(), Some(81));
    }

    #[tokio::test]
    async fn test_duplicate_records_are_noops() {
        let tmp = TempDir::new().unwrap();
        let store = empty_store(&tmp).await;
        // Overlapping pages: ids 5..=8 appear twice.
        let feed = ScriptedFeed::new(vec![page((5..=10).rev()), page((1..=8).rev())]);

        let summary = run_backfill(&store, &feed, 10, 6).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 10);
        assert_eq!(summary.stored, 10);
        assert_eq!(summary.duplicates, 4);
    }

    #[tokio::test]
    async fn test_upstream_error_aborts_run() {
        struct FailingFeed;

        #[async_trait]
        impl crate::services::FeedClient for FailingFeed {
            async fn fetch_page(
                &self,
                _cursor: &crate::models::FetchCursor,
            ) -> crate::error::Result<Vec<Record>> {
                Err(AppError::upstream("rate limited"))
            }
        }

        let tmp = TempDir::new().unwrap();
        let store = empty_store(&tmp).await;

        let result = run_backfill(&store, &FailingFeed, 50, 200).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
