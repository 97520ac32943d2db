//! Configuration types for Feedscope
//!
//! - [`ConfigFile`] - the on-disk document, with an `[auth]` table for
//!   credentials and an optional `[api]` table for endpoint overrides
//! - path helpers resolving the per-user config and cache directories

mod file;
mod paths;

pub use file::{ApiConfig, Auth, ConfigFile};
pub use paths::{
    default_cache_dir, default_config_dir, default_config_path, CACHE_DIR_ENV, CONFIG_DIR_ENV,
    CONFIG_FILE_NAME,
};
