// src/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream feed settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Record store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Backfill and polling behavior
    #[serde(default)]
    pub ingest: IngestConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.screen_name.trim().is_empty() {
            return Err(AppError::config("upstream.screen_name is empty"));
        }
        if self.upstream.user_agent.trim().is_empty() {
            return Err(AppError::config("upstream.user_agent is empty"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(AppError::config("upstream.timeout_secs must be > 0"));
        }
        if self.upstream.page_size == 0 || self.upstream.page_size > 200 {
            return Err(AppError::config(
                "upstream.page_size must be in 1..=200 (upstream page limit)",
            ));
        }
        if self.store.path.trim().is_empty() {
            return Err(AppError::config("store.path is empty"));
        }
        if self.ingest.backfill_target == 0 {
            return Err(AppError::config("ingest.backfill_target must be > 0"));
        }
        if self.ingest.poll_interval_secs == 0 {
            return Err(AppError::config("ingest.poll_interval_secs must be > 0"));
        }
        Ok(())
    }
}

/// Upstream timeline API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Account whose timeline is harvested
    #[serde(default = "defaults::screen_name")]
    pub screen_name: String,

    /// Environment variable holding the bearer token
    #[serde(default = "defaults::bearer_token_env")]
    pub bearer_token_env: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Records requested per backfill page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            screen_name: defaults::screen_name(),
            bearer_token_env: defaults::bearer_token_env(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_size: defaults::page_size(),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the snapshot file
    #[serde(default = "defaults::store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: defaults::store_path(),
        }
    }
}

/// Backfill and polling behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Target population for the startup backfill
    #[serde(default = "defaults::backfill_target")]
    pub backfill_target: usize,

    /// Period of the incremental poll in seconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            backfill_target: defaults::backfill_target(),
            poll_interval_secs: defaults::poll_interval(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "defaults::bind")]
    pub bind: String,

    /// Listen port
    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
            port: defaults::port(),
        }
    }
}

mod defaults {
    // Upstream defaults
    pub fn base_url() -> String {
        "https://api.twitter.com/1.1".into()
    }
    pub fn screen_name() -> String {
        "horse_ebooks".into()
    }
    pub fn bearer_token_env() -> String {
        "UPSTREAM_BEARER_TOKEN".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; fortuned/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn page_size() -> usize {
        200
    }

    // Store defaults
    pub fn store_path() -> String {
        "data/records.json".into()
    }

    // Ingest defaults
    pub fn backfill_target() -> usize {
        3000
    }
    pub fn poll_interval() -> u64 {
        600
    }

    // Server defaults
    pub fn bind() -> String {
        "0.0.0.0".into()
    }
    pub fn port() -> u16 {
        1337
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_screen_name() {
        let mut config = Config::default();
        config.upstream.screen_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_page() {
        let mut config = Config::default();
        config.upstream.page_size = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_target() {
        let mut config = Config::default();
        config.ingest.backfill_target = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [upstream]
            screen_name = "someone_else"

            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.screen_name, "someone_else");
        assert_eq!(config.upstream.page_size, 200);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ingest.backfill_target, 3000);
    }
}
