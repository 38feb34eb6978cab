//! Configuration loading for the discovery engine
//!
//! Each field resolves through the same priority chain:
//! 1. `MOODMEALS_*` environment variable (highest priority)
//! 2. TOML config file
//! 3. Compiled default
//!
//! The external API key has no compiled default; `load` fails when it is
//! absent from every layer so misconfiguration is caught at startup rather
//! than on the first external query.

use crate::error::{DiscoveryError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_EXTERNAL_BASE_URL: &str = "https://api.spoonacular.com";
pub const DEFAULT_COMMUNITY_BASE_URL: &str = "http://localhost:5000/api";
/// Records requested per external page
pub const DEFAULT_PAGE_SIZE: u32 = 12;
/// Quiet period before a free-text search change is dispatched
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Engine configuration shared by all source adapters
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub external_base_url: String,
    pub external_api_key: String,
    pub community_base_url: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
}

/// Optional overrides read from a TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    external_base_url: Option<String>,
    external_api_key: Option<String>,
    community_base_url: Option<String>,
    page_size: Option<u32>,
    search_debounce_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl DiscoveryConfig {
    /// Resolve configuration from environment, optional TOML file, and
    /// compiled defaults, in that priority order.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file = match config_file {
            Some(path) => read_config_file(path)?,
            None => FileConfig::default(),
        };

        let external_api_key = env_var("MOODMEALS_EXTERNAL_API_KEY")
            .or(file.external_api_key)
            .ok_or_else(|| {
                DiscoveryError::Config(
                    "external API key not set (MOODMEALS_EXTERNAL_API_KEY or config file)"
                        .to_string(),
                )
            })?;

        Ok(Self {
            external_base_url: env_var("MOODMEALS_EXTERNAL_BASE_URL")
                .or(file.external_base_url)
                .unwrap_or_else(|| DEFAULT_EXTERNAL_BASE_URL.to_string()),
            external_api_key,
            community_base_url: env_var("MOODMEALS_COMMUNITY_BASE_URL")
                .or(file.community_base_url)
                .unwrap_or_else(|| DEFAULT_COMMUNITY_BASE_URL.to_string()),
            page_size: env_parsed("MOODMEALS_PAGE_SIZE")?
                .or(file.page_size)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            search_debounce_ms: env_parsed("MOODMEALS_SEARCH_DEBOUNCE_MS")?
                .or(file.search_debounce_ms)
                .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS),
            request_timeout_secs: env_parsed("MOODMEALS_REQUEST_TIMEOUT_SECS")?
                .or(file.request_timeout_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Direct construction with explicit base URLs, used by callers that
    /// already resolved endpoints (and by tests pointing at stub servers).
    pub fn for_base_urls(
        external_base_url: impl Into<String>,
        external_api_key: impl Into<String>,
        community_base_url: impl Into<String>,
    ) -> Self {
        Self {
            external_base_url: external_base_url.into(),
            external_api_key: external_api_key.into(),
            community_base_url: community_base_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| DiscoveryError::Config(format!("invalid value for {}: {}", name, raw))),
    }
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DiscoveryError::Config(format!("cannot read config file {}: {}", path.display(), e))
    })?;
    toml::from_str(&content).map_err(|e| {
        DiscoveryError::Config(format!("invalid config file {}: {}", path.display(), e))
    })
}
