//! Feedscope Core Library
//!
//! Shared types, API models, and utilities for the Feedscope Feedbin client.
//! The CLI crate builds its HTTP client and command handlers on top of these.

pub mod api;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use api::{FeedChoice, Subscription};
pub use config::{default_cache_dir, default_config_dir, default_config_path, Auth, ConfigFile};
pub use error::*;
