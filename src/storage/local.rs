//! Local filesystem record store.
//!
//! Keeps the full record set in an ordered in-memory map and mirrors it to a
//! single JSON snapshot file. Every mutation rewrites the snapshot through a
//! temp-file rename, so the on-disk state is always a complete, consistent
//! archive and a crash can never leave the id index and the text archive out
//! of step.
//!
//! ## Storage Layout
//!
//! ```text
//! {store.path}              # e.g. data/records.json
//! {store.path}.tmp          # transient, renamed over the snapshot
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::Record;
use crate::storage::{InsertOutcome, RecordStore};

/// Snapshot file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    /// ISO 8601 timestamp of last update
    updated_at: DateTime<Utc>,
    /// Total record count
    count: usize,
    /// Records in ascending id order
    records: Vec<Record>,
}

/// Local filesystem storage backend.
pub struct LocalStore {
    path: PathBuf,
    records: RwLock<BTreeMap<i64, String>>,
}

impl LocalStore {
    /// Open the store at the given snapshot path, loading any existing
    /// snapshot. A missing file yields an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match Self::read_snapshot(&path).await? {
            Some(snapshot) => {
                log::info!(
                    "Loaded {} records from {}",
                    snapshot.records.len(),
                    path.display()
                );
                snapshot
                    .records
                    .into_iter()
                    .map(|r| (r.id, r.text))
                    .collect()
            }
            None => {
                log::info!("No snapshot at {}, starting empty", path.display());
                BTreeMap::new()
            }
        };

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    async fn read_snapshot(path: &Path) -> Result<Option<Snapshot>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::store(format!("read {}: {}", path.display(), e))),
        };
        let snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::store(format!("parse {}: {}", path.display(), e)))?;
        Ok(Some(snapshot))
    }

    /// Write the snapshot atomically (write to temp, then rename).
    async fn write_snapshot(&self, records: &BTreeMap<i64, String>) -> Result<()> {
        let snapshot = Snapshot {
            updated_at: Utc::now(),
            count: records.len(),
            records: records
                .iter()
                .map(|(&id, text)| Record::new(id, text.clone()))
                .collect(),
        };
        let bytes = serde_json::to_vec(&snapshot)
            .map_err(|e| AppError::store(format!("serialize snapshot: {e}")))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::store(format!("create {}: {}", parent.display(), e)))?;
        }

        let tmp = self.path.with_extension("tmp");
        let write = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&tmp, &self.path).await
        };
        write
            .await
            .map_err(|e| AppError::store(format!("write {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn contains(&self, id: i64) -> Result<bool> {
        Ok(self.records.read().await.contains_key(&id))
    }

    async fn insert(&self, record: Record) -> Result<InsertOutcome> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Ok(InsertOutcome::AlreadyPresent);
        }

        let id = record.id;
        log::debug!("Adding record {}: {}", id, record.text);
        records.insert(id, record.text);

        // Undo the in-memory insert if the snapshot write fails, keeping
        // memory and disk in step.
        if let Err(e) = self.write_snapshot(&records).await {
            records.remove(&id);
            return Err(e);
        }
        Ok(InsertOutcome::Inserted)
    }

    async fn oldest_id(&self) -> Result<Option<i64>> {
        Ok(self.records.read().await.keys().next().copied())
    }

    async fn newest_id(&self) -> Result<Option<i64>> {
        Ok(self.records.read().await.keys().next_back().copied())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    async fn get(&self, position: usize) -> Result<Option<String>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .nth(position)
            .cloned())
    }

    async fn range(&self, upto: Option<usize>) -> Result<Vec<String>> {
        let records = self.records.read().await;
        let take = match upto {
            Some(end) => end.saturating_add(1).min(records.len()),
            None => records.len(),
        };
        Ok(records.values().take(take).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store(tmp: &TempDir) -> LocalStore {
        LocalStore::open(tmp.path().join("records.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_contains() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let outcome = store.insert(Record::new(10, "ten")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert!(store.contains(10).await.unwrap());
        assert!(!store.contains(11).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        store.insert(Record::new(10, "ten")).await.unwrap();
        let outcome = store.insert(Record::new(10, "ten")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::AlreadyPresent);

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.range(None).await.unwrap(), vec!["ten".to_string()]);
    }

    #[tokio::test]
    async fn test_position_follows_id_order() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        // Backfill-style arrival: newest first, then older, then a forward
        // extension. Positions must still read oldest-first.
        for (id, text) in [(30, "c"), (20, "b"), (10, "a"), (40, "d")] {
            store.insert(Record::new(id, text)).await.unwrap();
        }

        assert_eq!(store.oldest_id().await.unwrap(), Some(10));
        assert_eq!(store.newest_id().await.unwrap(), Some(40));
        assert_eq!(store.get(0).await.unwrap(), Some("a".to_string()));
        assert_eq!(store.get(3).await.unwrap(), Some("d".to_string()));
        assert_eq!(store.get(4).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_range_bounds() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        for id in 1..=5 {
            store
                .insert(Record::new(id, format!("r{id}")))
                .await
                .unwrap();
        }

        assert_eq!(store.range(Some(2)).await.unwrap().len(), 3);
        assert_eq!(store.range(Some(99)).await.unwrap().len(), 5);
        assert_eq!(store.range(None).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_count_matches_range_length() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        for id in [5, 1, 9, 1, 5] {
            store
                .insert(Record::new(id, format!("r{id}")))
                .await
                .unwrap();
        }

        let count = store.count().await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(store.range(None).await.unwrap().len(), count);
    }

    #[tokio::test]
    async fn test_reopen_reloads_snapshot() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("records.json");

        {
            let store = LocalStore::open(&path).await.unwrap();
            store.insert(Record::new(2, "two")).await.unwrap();
            store.insert(Record::new(1, "one")).await.unwrap();
        }

        let reopened = LocalStore::open(&path).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);
        assert_eq!(reopened.get(0).await.unwrap(), Some("one".to_string()));
        assert_eq!(reopened.newest_id().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_open_empty_when_missing() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.oldest_id().await.unwrap(), None);
        assert_eq!(store.newest_id().await.unwrap(), None);
        assert!(store.range(None).await.unwrap().is_empty());
    }
}

