//! Configuration file support for thanks.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `THANKS_`, e.g., `THANKS_GITHUB_TOKEN`)
//! 3. Config file (./thanks.toml, then ~/.config/thanks/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! github_token = "gho_..."   # or use THANKS_GITHUB_TOKEN env var
//! vault = "/home/me/Notes"   # or use THANKS_VAULT env var
//!
//! page_concurrency = 4
//! lookup_star_counts = true
//! ```
//!
//! Every field of [`thanks::Settings`] may appear at the top level.

use std::fs;
use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat, Map};
use directories::ProjectDirs;
use serde::Deserialize;
use thanks::settings::{Settings, SettingsError, SettingsStore};

const ENV_PREFIX: &str = "THANKS";

/// Keys read as strings even when the environment value looks numeric,
/// e.g. `THANKS_CLIENT_ID=1234567`.
const STRING_KEYS: &[&str] = &[
    "github_token",
    "vault",
    "client_id",
    "scope",
    "device_code_url",
    "token_url",
    "api_base_url",
    "plugin_catalog_url",
    "theme_catalog_url",
    "user_agent",
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pre-issued GitHub token. Skips the device flow when set.
    pub github_token: Option<String>,
    /// Default vault directory.
    pub vault: Option<PathBuf>,
    /// Library settings.
    #[serde(flatten)]
    pub settings: Settings,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/thanks/config.toml)
    /// 3. Local config file (./thanks.toml)
    /// 4. Environment variables with THANKS_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("thanks.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./thanks.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let builder = match with_env(builder, std::env::vars().collect()) {
            Ok(builder) => builder,
            Err(e) => {
                tracing::warn!("Failed to apply environment overrides: {}", e);
                return Config::default();
            }
        };

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the GitHub token, ignoring blank values.
    pub fn github_token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "thanks").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Layer `THANKS_*` variables from `vars` over `builder`.
///
/// Numbers and booleans are parsed (THANKS_PAGE_CONCURRENCY -> page_concurrency),
/// then [`STRING_KEYS`] are re-applied verbatim so the flattened string
/// fields never see an integer.
fn with_env(
    builder: config::builder::ConfigBuilder<DefaultState>,
    vars: Map<String, String>,
) -> Result<config::builder::ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(vars.clone())),
    );
    for key in STRING_KEYS {
        let var = format!("{ENV_PREFIX}_{}", key.to_ascii_uppercase());
        if let Some(value) = vars.get(&var) {
            builder = builder.set_override(*key, value.as_str())?;
        }
    }
    Ok(builder)
}

/// [`SettingsStore`] backed by a TOML file.
///
/// A missing file loads as defaults; a partial file is merged over them.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| SettingsError::Read(e.to_string()))?;
        toml::from_str(&content).map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Write(e.to_string()))?;
        }
        let content =
            toml::to_string_pretty(settings).map_err(|e| SettingsError::Write(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| SettingsError::Write(e.to_string()))
    }
}
