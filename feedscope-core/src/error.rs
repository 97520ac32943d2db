//! Error types for Feedscope

use thiserror::Error;

/// Exit code for every handled failure
pub const EXIT_FAILURE: i32 = 1;

/// Exit code when the user declines an interactive confirmation
pub const EXIT_ABORTED: i32 = 2;

/// Core error type for Feedscope operations
#[derive(Error, Debug)]
pub enum FeedscopeError {
    /// No usable credentials in the config file
    #[error("No credentials stored. Please run `feedscope auth login` first.")]
    MissingCredentials,

    /// The API rejected the credentials (HTTP 401)
    #[error("Authentication failed - invalid credentials. Please run `feedscope auth login` again.")]
    AuthenticationFailed,

    /// The subscription belongs to another user (HTTP 403)
    #[error("Access forbidden: subscription {0} does not belong to this account")]
    Forbidden(u64),

    /// Resource not found (HTTP 404)
    #[error("{0}")]
    NotFound(String),

    /// Several feeds matched the URL (HTTP 300)
    #[error("Multiple feeds found ({0} choices). Re-run with one of the feed URLs above.")]
    Ambiguous(usize),

    /// Any other non-success status
    #[error("Unexpected response: {0}")]
    UnexpectedStatus(u16),

    /// Transport-level failure (connection refused, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Config file or auth section absent
    #[error("{0}")]
    ConfigNotFound(String),

    /// User declined a confirmation prompt
    #[error("Aborted.")]
    Aborted,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FeedscopeError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FeedscopeError::Aborted => EXIT_ABORTED,
            _ => EXIT_FAILURE,
        }
    }
}

/// Result type alias for Feedscope operations
pub type Result<T> = std::result::Result<T, FeedscopeError>;

impl From<serde_json::Error> for FeedscopeError {
    fn from(err: serde_json::Error) -> Self {
        FeedscopeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for FeedscopeError {
    fn from(err: toml::de::Error) -> Self {
        FeedscopeError::Config(err.to_string())
    }
}
