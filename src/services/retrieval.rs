// src/services/retrieval.rs

//! Read-only query surface over the record store.
//!
//! Every text handed out passes through the sanitizer. Absence (empty store,
//! out-of-range position) is reported as `None`, never as an error.

use std::sync::Arc;

use rand::Rng;

use crate::error::Result;
use crate::services::sanitize::sanitize;
use crate::storage::RecordStore;

/// Read-only record queries composed with the sanitizer.
#[derive(Clone)]
pub struct RetrievalService {
    store: Arc<dyn RecordStore>,
}

impl RetrievalService {
    /// Create a retrieval service over the given store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Pick a uniformly random record, returning its text and position.
    pub async fn pick_random(&self) -> Result<Option<(String, usize)>> {
        let count = self.store.count().await?;
        if count == 0 {
            return Ok(None);
        }
        let position = rand::rng().random_range(0..count);
        Ok(self
            .store
            .get(position)
            .await?
            .map(|text| (sanitize(&text), position)))
    }

    /// Record at a fixed archive position, oldest first.
    pub async fn pick_at(&self, position: usize) -> Result<Option<String>> {
        Ok(self.store.get(position).await?.map(|t| sanitize(&t)))
    }

    /// Record at the given position, or a random one when none is supplied.
    pub async fn pick(&self, position: Option<usize>) -> Result<Option<String>> {
        match position {
            Some(position) => self.pick_at(position).await,
            None => Ok(self.pick_random().await?.map(|(text, _)| text)),
        }
    }

    /// All records from the oldest through `upto` (inclusive), or the whole
    /// archive when `upto` is not given.
    pub async fn dump(&self, upto: Option<usize>) -> Result<Vec<String>> {
        Ok(self
            .store
            .range(upto)
            .await?
            .iter()
            .map(|t| sanitize(t))
            .collect())
    }

    /// Number of stored records.
    pub async fn population(&self) -> Result<usize> {
        self.store.count().await
    }
}
