// src/services/feed.rs

//! Upstream timeline client.
//!
//! Fetches pages of records from the upstream user-timeline endpoint using
//! `since_id`/`max_id` cursors. The engine makes no assumption about the
//! order of records within a page, only about the cursor contract.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use crate::models::{FetchCursor, Record};

/// Trait for paginated upstream fetching.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch one page of records bounded by the cursor.
    ///
    /// An empty page for a `max_id` query signals upstream exhaustion.
    async fn fetch_page(&self, cursor: &FetchCursor) -> Result<Vec<Record>>;
}

/// One entry of the upstream timeline response.
///
/// The upstream payload carries many more fields; only the id and text are
/// of interest here.
#[derive(Debug, Deserialize)]
struct TimelineEntry {
    id: i64,
    text: String,
}

/// HTTP client for the upstream timeline API.
pub struct TimelineClient {
    client: reqwest::Client,
    base_url: String,
    screen_name: String,
    bearer_token: String,
}

impl TimelineClient {
    /// Create a client from the upstream configuration.
    ///
    /// The bearer token is read from the environment variable named by
    /// `config.bearer_token_env`; a missing token is a configuration error.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let bearer_token = std::env::var(&config.bearer_token_env).map_err(|_| {
            AppError::config(format!(
                "Environment variable {} is undefined",
                config.bearer_token_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            screen_name: config.screen_name.clone(),
            bearer_token,
        })
    }
}

#[async_trait]
impl FeedClient for TimelineClient {
    async fn fetch_page(&self, cursor: &FetchCursor) -> Result<Vec<Record>> {
        let url = format!("{}/statuses/user_timeline.json", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("screen_name", self.screen_name.clone()),
            ("trim_user", "true".to_string()),
            ("exclude_replies", "true".to_string()),
            ("include_rts", "false".to_string()),
        ];
        if let Some(count) = cursor.count {
            query.push(("count", count.to_string()));
        }
        if let Some(since_id) = cursor.since_id {
            query.push(("since_id", since_id.to_string()));
        }
        if let Some(max_id) = cursor.max_id {
            query.push(("max_id", max_id.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "timeline request returned {status}: {body}"
            )));
        }

        let entries: Vec<TimelineEntry> = response.json().await?;
        Ok(entries
            .into_iter()
            .map(|e| Record::new(e.id, e.text))
            .collect())
    }
}
