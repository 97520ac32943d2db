//! Typed view of the configuration document

use serde::{Deserialize, Serialize};

/// Stored Feedbin credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Account password
    #[serde(default)]
    pub password: String,
}

impl Auth {
    /// Create credentials from an email and password
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields are set. Anything less counts as "no credentials".
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

/// Optional API endpoint overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Configuration document.
///
/// Only the tables Feedscope reads are modelled here; unknown keys are
/// ignored on load and preserved on save by the CLI's config store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Credentials
    #[serde(default)]
    pub auth: Auth,
    /// Endpoint overrides
    #[serde(default)]
    pub api: ApiConfig,
}

impl ConfigFile {
    /// Parse a configuration document from TOML.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
