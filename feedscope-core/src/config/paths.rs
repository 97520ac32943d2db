//! Default path resolution for configuration and cache files
//!
//! Uses the platform config/cache directories from `dirs`, with environment
//! overrides so tests and packagers can relocate everything.

use std::path::PathBuf;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "FEEDSCOPE_CONFIG_DIR";

/// Environment variable overriding the HTTP cache directory
pub const CACHE_DIR_ENV: &str = "FEEDSCOPE_CACHE_DIR";

/// File name of the configuration document
pub const CONFIG_FILE_NAME: &str = "config.toml";

const APP_DIR: &str = "feedscope";

/// Returns the directory holding the configuration file.
///
/// - `$FEEDSCOPE_CONFIG_DIR` when set and non-empty
/// - Linux: `~/.config/feedscope`
/// - macOS: `~/Library/Application Support/feedscope`
/// - Fallback: `./.feedscope`
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = env_dir(CONFIG_DIR_ENV) {
        return dir;
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".feedscope"))
}

/// Returns the path of the configuration file.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

/// Returns the directory used by the on-disk HTTP cache.
///
/// - `$FEEDSCOPE_CACHE_DIR` when set and non-empty
/// - Linux: `~/.cache/feedscope/http-cache`
/// - Fallback: `./.feedscope/http-cache`
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = env_dir(CACHE_DIR_ENV) {
        return dir;
    }

    dirs::cache_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".feedscope"))
        .join("http-cache")
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
