//! Plugin settings and the store they are loaded from.
//!
//! The host owns persistence. This module only defines the settings shape,
//! its defaults, and the [`SettingsStore`] seam the host implements. Stored
//! objects may be partial: every field is `#[serde(default)]`, so a load
//! merges whatever was saved over [`Settings::default`].

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::oauth::DeviceFlowConfig;
use crate::stars::AggregatorConfig;

/// Client ID of the public OAuth App used for the device flow.
pub const DEFAULT_CLIENT_ID: &str = "d783633d6045383d4d16";

/// Scope needed to star public repositories.
pub const DEFAULT_SCOPE: &str = "public_repo";

pub const DEFAULT_DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
pub const DEFAULT_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_PLUGIN_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/obsidianmd/obsidian-releases/master/community-plugins.json";
pub const DEFAULT_THEME_CATALOG_URL: &str = "https://raw.githubusercontent.com/obsidianmd/obsidian-releases/master/community-css-themes.json";

/// Concurrent page requests while aggregating starred repositories.
/// Kept low to stay clear of secondary rate limits.
pub const DEFAULT_PAGE_CONCURRENCY: usize = 2;

/// Page size requested from the starred endpoint (GitHub's maximum).
pub const DEFAULT_PER_PAGE: u32 = 100;

pub const DEFAULT_USER_AGENT: &str = concat!("thanks/", env!("CARGO_PKG_VERSION"));

/// All user-tunable settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OAuth App client ID.
    pub client_id: String,
    /// OAuth scope requested during the device flow.
    pub scope: String,
    pub device_code_url: String,
    pub token_url: String,
    /// REST API root, without a trailing slash.
    pub api_base_url: String,
    pub plugin_catalog_url: String,
    pub theme_catalog_url: String,
    /// Maximum concurrent page requests during aggregation.
    pub page_concurrency: usize,
    pub per_page: u32,
    /// Fetch real star counts for repositories the user has not starred.
    pub lookup_star_counts: bool,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            plugin_catalog_url: DEFAULT_PLUGIN_CATALOG_URL.to_string(),
            theme_catalog_url: DEFAULT_THEME_CATALOG_URL.to_string(),
            page_concurrency: DEFAULT_PAGE_CONCURRENCY,
            per_page: DEFAULT_PER_PAGE,
            lookup_star_counts: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    /// Device flow configuration derived from these settings.
    pub fn device_flow(&self) -> DeviceFlowConfig {
        DeviceFlowConfig {
            client_id: self.client_id.clone(),
            device_code_url: self.device_code_url.clone(),
            token_url: self.token_url.clone(),
        }
    }

    /// Aggregator configuration derived from these settings.
    pub fn aggregator(&self) -> AggregatorConfig {
        AggregatorConfig {
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            per_page: self.per_page.max(1),
            page_concurrency: self.page_concurrency.max(1),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Errors raised by a [`SettingsStore`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Read(String),

    #[error("failed to write settings: {0}")]
    Write(String),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Host-provided persistence for [`Settings`].
pub trait SettingsStore: Send + Sync {
    /// Load settings, merged over defaults. A store with nothing saved
    /// returns `Settings::default()`.
    fn load(&self) -> Result<Settings, SettingsError>;

    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings store that keeps a serialized copy in memory.
///
/// Round-trips through JSON so partial documents behave like a real store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    raw: Mutex<Option<String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw JSON document (may be partial).
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        let raw = self
            .raw
            .lock()
            .map_err(|e| SettingsError::Read(e.to_string()))?;
        match raw.as_deref() {
            Some(doc) => {
                serde_json::from_str(doc).map_err(|e| SettingsError::Invalid(e.to_string()))
            }
            None => Ok(Settings::default()),
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let doc =
            serde_json::to_string(settings).map_err(|e| SettingsError::Write(e.to_string()))?;
        let mut raw = self
            .raw
            .lock()
            .map_err(|e| SettingsError::Write(e.to_string()))?;
        *raw = Some(doc);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(settings.scope, "public_repo");
        assert_eq!(settings.page_concurrency, 2);
        assert_eq!(settings.per_page, 100);
        assert!(!settings.lookup_star_counts);
        assert!(settings.user_agent.starts_with("thanks/"));
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_document_is_merged_with_defaults() {
        let store = MemorySettingsStore::with_raw(r#"{"page_concurrency": 8, "scope": "repo"}"#);
        let settings = store.load().unwrap();

        assert_eq!(settings.page_concurrency, 8);
        assert_eq!(settings.scope, "repo");
        assert_eq!(settings.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(settings.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemorySettingsStore::new();
        let settings = Settings {
            lookup_star_counts: true,
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_invalid_document_is_reported() {
        let store = MemorySettingsStore::with_raw("not json");
        assert!(matches!(store.load(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_aggregator_config_normalizes_values() {
        let settings = Settings {
            api_base_url: "https://ghe.example.com/api/v3/".to_string(),
            page_concurrency: 0,
            per_page: 0,
            ..Settings::default()
        };
        let config = settings.aggregator();
        assert_eq!(config.api_base_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.page_concurrency, 1);
        assert_eq!(config.per_page, 1);
    }
}
