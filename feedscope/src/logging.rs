//! Logging setup
//!
//! Without `--log-config`, events at `warn` and above (or whatever `RUST_LOG`
//! asks for) go to stderr. A log configuration file replaces that with one
//! `tracing_subscriber::fmt` layer per declared handler:
//!
//! ```toml
//! handlers = [
//!   { sink = "/tmp/feedscope.log", level = "debug", format = "message" },
//!   { sink = "stderr", level = "warn" },
//! ]
//! ```
//!
//! JSON files with the same shape are accepted too.

use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Errors raised while applying a log configuration file
#[derive(Error, Debug)]
pub enum LogConfigError {
    #[error("file does not exist")]
    Missing,

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid level '{level}' for sink '{sink}'")]
    Level { sink: String, level: String },

    #[error("unknown format '{0}' (expected full, compact or message)")]
    Format(String),

    #[error("no handlers declared")]
    Empty,

    #[error("a global subscriber is already installed")]
    AlreadyInitialized,
}

/// One output declared in a log configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogHandler {
    /// `stderr`, `stdout`, or a file path (appended to)
    pub sink: String,
    /// Minimum level, `info` when absent
    #[serde(default)]
    pub level: Option<String>,
    /// `full` (default), `compact`, or `message`
    #[serde(default)]
    pub format: Option<String>,
}

/// Contents of a log configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub handlers: Vec<LogHandler>,
}

impl LogConfig {
    /// Read a TOML (`.toml` extension) or JSON log configuration
    pub fn from_path(path: &Path) -> Result<Self, LogConfigError> {
        if !path.is_file() {
            return Err(LogConfigError::Missing);
        }

        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Ok(toml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    fn layers(&self) -> Result<Vec<BoxedLayer>, LogConfigError> {
        if self.handlers.is_empty() {
            return Err(LogConfigError::Empty);
        }

        self.handlers.iter().map(handler_layer).collect()
    }
}

fn handler_layer(handler: &LogHandler) -> Result<BoxedLayer, LogConfigError> {
    let level_name = handler.level.as_deref().unwrap_or("info");
    let level: LevelFilter = level_name.parse().map_err(|_| LogConfigError::Level {
        sink: handler.sink.clone(),
        level: level_name.to_string(),
    })?;
    let format = handler.format.as_deref().unwrap_or("full");

    match handler.sink.as_str() {
        "stderr" => build_layer(std::io::stderr, format, true, level),
        "stdout" => build_layer(std::io::stdout, format, true, level),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(PathBuf::from(path))?;
            build_layer(Mutex::new(file), format, false, level)
        }
    }
}

fn build_layer<W>(
    writer: W,
    format: &str,
    ansi: bool,
    level: LevelFilter,
) -> Result<BoxedLayer, LogConfigError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = fmt::layer::<Registry>()
        .with_writer(writer)
        .with_ansi(ansi);

    let layer: BoxedLayer = match format {
        "full" => Box::new(base.with_filter(level)),
        "compact" => Box::new(base.compact().with_filter(level)),
        "message" => Box::new(
            base.without_time()
                .with_target(false)
                .with_level(false)
                .with_filter(level),
        ),
        other => return Err(LogConfigError::Format(other.to_string())),
    };

    Ok(layer)
}

/// Install the global subscriber.
///
/// With a configuration file, every handler is validated before anything is
/// installed, so a bad file leaves logging untouched.
pub fn init(log_config: Option<&Path>) -> Result<(), LogConfigError> {
    let Some(path) = log_config else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
            .try_init()
            .map_err(|_| LogConfigError::AlreadyInitialized)?;
        return Ok(());
    };

    let layers = LogConfig::from_path(path)?.layers()?;
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|_| LogConfigError::AlreadyInitialized)?;

    debug!("Logging configured from {}", path.display());
    Ok(())
}
