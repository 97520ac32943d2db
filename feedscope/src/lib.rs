//! Feedscope CLI Library
//!
//! This library provides the core functionality for the `feedscope` tool, a
//! command-line client for the Feedbin REST API.
//!
//! # Public API
//!
//! The primary public API is the [`client::FeedbinClient`], which provides
//! programmatic access to a Feedbin account. Settings and the credential
//! store live in [`config`].
//!
//! ```no_run
//! use feedscope::client::FeedbinClient;
//! use feedscope::config::{ConfigStore, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::builder().with_env_overrides().build()?;
//! let auth = ConfigStore::new(settings.config_path.clone())
//!     .credentials()?
//!     .expect("run `feedscope auth login` first");
//!
//! let client = FeedbinClient::new(&settings, auth)?;
//! let response = client.list_subscriptions(false).await?;
//! println!("{} subscriptions", response.record_count().unwrap_or(0));
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for the Feedbin API.
pub mod client;

/// Credential store and runtime settings.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

/// Logging setup.
pub mod logging;

/// Interactive prompts.
pub mod prompt;

#[cfg(test)]
pub mod test_utils;
