//! Output formatting utilities for the CLI
//!
//! Provides line, JSON and JSONL rendering of API results, plus coloured
//! status markers.

use anyhow::Result;
use colored::*;
use feedscope_core::Subscription;
use serde::Serialize;

/// Message printed for an empty subscription list in text modes
pub const NO_SUBSCRIPTIONS: &str = "No subscriptions found.";

/// How a list of results is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// `[id] title - feed_url`, one per line
    Text,
    /// One compact JSON object per line
    Jsonl,
    /// One indented JSON object per item
    Pretty,
}

impl ListFormat {
    /// Pick the format from the `--jsonl` and `--extended` flags.
    /// JSONL wins when both are given.
    pub fn from_flags(jsonl: bool, extended: bool) -> Self {
        if jsonl {
            ListFormat::Jsonl
        } else if extended {
            ListFormat::Pretty
        } else {
            ListFormat::Text
        }
    }
}

/// Format one subscription as a summary line
pub fn format_subscription_line(subscription: &Subscription) -> String {
    format!(
        "[{}] {} - {}",
        subscription.id, subscription.title, subscription.feed_url
    )
}

/// Format a list of subscriptions.
///
/// Returns `None` when there is nothing to print (an empty list in JSONL
/// mode); an empty list in the other modes yields [`NO_SUBSCRIPTIONS`].
pub fn format_subscriptions(
    subscriptions: &[Subscription],
    format: ListFormat,
) -> Result<Option<String>> {
    if subscriptions.is_empty() {
        return Ok(match format {
            ListFormat::Jsonl => None,
            ListFormat::Text | ListFormat::Pretty => Some(NO_SUBSCRIPTIONS.to_string()),
        });
    }

    let lines: Vec<String> = match format {
        ListFormat::Text => subscriptions.iter().map(format_subscription_line).collect(),
        ListFormat::Jsonl => subscriptions
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?,
        ListFormat::Pretty => subscriptions
            .iter()
            .map(serde_json::to_string_pretty)
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(Some(lines.join("\n")))
}

/// Format a single record as indented JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

/// Format error message
pub fn format_error(message: &str) -> String {
    format!("{} {}", "✗".red().bold(), message)
}

/// Format informational message
pub fn format_info(message: &str) -> String {
    format!("{} {}", "ℹ".blue(), message)
}
