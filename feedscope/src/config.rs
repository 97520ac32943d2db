//! CLI configuration management
//!
//! Two concerns live here:
//! - [`ConfigStore`] reads and writes the on-disk TOML document holding the
//!   stored credentials, preserving every key it does not own
//! - [`Settings`] are the resolved runtime settings (API endpoint, timeout,
//!   cache location), built through [`SettingsBuilder`]'s priority chain

use anyhow::{Context, Result};
use feedscope_core::api::DEFAULT_API_URL;
use feedscope_core::config::ApiConfig;
use feedscope_core::{default_cache_dir, default_config_path, Auth, ConfigFile, FeedscopeError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use toml_edit::{value, DocumentMut, Item, Table};

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "FEEDSCOPE_API_URL";

/// Environment variable overriding the request timeout (seconds)
pub const TIMEOUT_ENV: &str = "FEEDSCOPE_TIMEOUT";

const AUTH_TABLE: &str = "auth";

/// Reads and writes the configuration document.
///
/// Writes are read-merge-write through `toml_edit`, so comments, ordering and
/// unrelated tables survive. No locking is done: two processes saving at the
/// same time can lose one of the writes.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store operating on the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default per-user location
    pub fn default_location() -> Self {
        Self::new(default_config_path())
    }

    /// Path of the configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, or defaults when the file does not exist
    pub fn load(&self) -> Result<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config file {}", self.path.display()))?;

        ConfigFile::from_toml(&content)
            .map_err(FeedscopeError::from)
            .with_context(|| format!("Failed to parse config file {}", self.path.display()))
    }

    /// Load stored credentials, if complete
    pub fn credentials(&self) -> Result<Option<Auth>> {
        let config = self.load()?;
        Ok(config.auth.is_complete().then_some(config.auth))
    }

    /// Store credentials in the `[auth]` table
    pub fn save(&self, email: &str, password: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let mut doc = self.read_document()?.unwrap_or_default();

        let has_auth_table = doc
            .get(AUTH_TABLE)
            .map(|item| item.is_table_like())
            .unwrap_or(false);
        if !has_auth_table {
            doc.insert(AUTH_TABLE, Item::Table(Table::new()));
        }

        let auth = doc
            .get_mut(AUTH_TABLE)
            .and_then(|item| item.as_table_like_mut())
            .context("Failed to get auth section")?;
        auth.insert("email", value(email));
        auth.insert("password", value(password));

        // Credentials used to live at the top level
        doc.remove("email");
        doc.remove("password");

        self.write_document(&doc)
    }

    /// Delete the `[auth]` table
    pub fn remove(&self) -> Result<()> {
        let Some(mut doc) = self.read_document()? else {
            return Err(
                FeedscopeError::ConfigNotFound("No configuration file found".to_string()).into(),
            );
        };

        if doc.remove(AUTH_TABLE).is_none() {
            return Err(FeedscopeError::ConfigNotFound(
                "No authentication credentials found".to_string(),
            )
            .into());
        }

        self.write_document(&doc)
    }

    fn read_document(&self) -> Result<Option<DocumentMut>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config file {}", self.path.display()))?;

        let doc = contents
            .parse::<DocumentMut>()
            .with_context(|| format!("Failed to parse config file {}", self.path.display()))?;

        Ok(Some(doc))
    }

    fn write_document(&self, doc: &DocumentMut) -> Result<()> {
        std::fs::write(&self.path, doc.to_string())
            .with_context(|| format!("Failed to write config file {}", self.path.display()))
    }
}

/// Resolved runtime settings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Settings {
    /// API base URL, without trailing slash
    pub api_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Configuration file path
    pub config_path: PathBuf,

    /// HTTP cache directory
    pub cache_dir: PathBuf,

    /// Whether responses go through the on-disk cache
    pub cache_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: 30,
            config_path: default_config_path(),
            cache_dir: default_cache_dir(),
            cache_enabled: true,
        }
    }
}

impl Settings {
    /// Create a new builder for constructing settings
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Directory containing the configuration file
    pub fn config_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Builder for settings with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. `[api]` table of the config file
/// 3. Environment variables
/// 4. CLI arguments
///
/// Each step overwrites what the previous ones set.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    api_url: Option<String>,
    timeout: Option<u64>,
    config_path: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    cache_enabled: Option<bool>,
}

impl SettingsBuilder {
    /// Create a new settings builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API base URL (with validation)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.api_url = Some(url);
        Ok(self)
    }

    /// Set timeout (with validation)
    pub fn with_timeout(mut self, timeout: u64) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Set the configuration file path
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set the HTTP cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Enable or disable the HTTP cache
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = Some(enabled);
        self
    }

    /// Apply the `[api]` table of a config document
    pub fn with_api_config(mut self, api: &ApiConfig) -> Result<Self> {
        if let Some(url) = &api.url {
            self = self
                .with_api_url(url.clone())
                .context("Invalid api.url in config file")?;
        }
        if let Some(timeout) = api.timeout {
            self = self
                .with_timeout(timeout)
                .context("Invalid api.timeout in config file")?;
        }
        Ok(self)
    }

    /// Load endpoint overrides from the config file at the configured path.
    ///
    /// A missing or unreadable file leaves the builder untouched; commands
    /// that need the file report the problem themselves.
    pub fn with_config_file(self) -> Result<Self> {
        let path = self.config_path.clone().unwrap_or_else(default_config_path);

        match ConfigStore::new(path).load() {
            Ok(config) => self.with_api_config(&config.api),
            Err(e) => {
                tracing::debug!("Ignoring config file for settings: {:#}", e);
                Ok(self)
            }
        }
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            // Validate before applying
            if Self::validate_url(&url).is_ok() {
                self.api_url = Some(url);
            }
        }

        if let Ok(timeout) = std::env::var(TIMEOUT_ENV) {
            if let Ok(timeout) = timeout.parse() {
                if Self::validate_timeout(timeout).is_ok() {
                    self.timeout = Some(timeout);
                }
            }
        }

        self
    }

    /// Build the final settings with validation
    pub fn build(self) -> Result<Settings> {
        let defaults = Settings::default();

        let api_url = self.api_url.unwrap_or(defaults.api_url);
        let timeout = self.timeout.unwrap_or(defaults.timeout);

        // Validate final values
        Self::validate_url(&api_url)?;
        Self::validate_timeout(timeout)?;

        Ok(Settings {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout,
            config_path: self.config_path.unwrap_or(defaults.config_path),
            cache_dir: self.cache_dir.unwrap_or(defaults.cache_dir),
            cache_enabled: self.cache_enabled.unwrap_or(defaults.cache_enabled),
        })
    }

    /// Validate URL format
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(FeedscopeError::Config("API URL cannot be empty".to_string()).into());
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FeedscopeError::Config(
                "API URL must start with http:// or https://".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Validate timeout value
    fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(FeedscopeError::Config("Timeout must be greater than 0".to_string()).into());
        }

        if timeout > 300 {
            return Err(FeedscopeError::Config(
                "Timeout must be less than or equal to 300 seconds".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
