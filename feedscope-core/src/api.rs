//! API models for the Feedbin REST API
//!
//! This module contains request and response models for the v2 API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Base URL of the hosted Feedbin API
pub const DEFAULT_API_URL: &str = "https://api.feedbin.com/v2";

/// Response header carrying the total number of records across all pages
pub const RECORD_COUNT_HEADER: &str = "X-Feedbin-Record-Count";

/// Query parameter value requesting extended subscription metadata
pub const EXTENDED_MODE: &str = "extended";

/// A feed the authenticated user follows.
///
/// Fields beyond the core set are kept verbatim in `extra`, so extended-mode
/// metadata survives into JSON output without the client modelling it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription identifier
    pub id: u64,
    /// Creation timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Identifier of the underlying feed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<u64>,
    /// Display title
    pub title: String,
    /// Feed URL
    pub feed_url: String,
    /// Website URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    /// Extended metadata
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    /// Create a subscription with only the required fields set
    pub fn new(id: u64, title: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            id,
            created_at: None,
            feed_id: None,
            title: title.into(),
            feed_url: feed_url.into(),
            site_url: None,
            extra: Map::new(),
        }
    }
}

/// Candidate feed returned when a URL resolves to several feeds (HTTP 300)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedChoice {
    /// Feed URL to subscribe to
    pub feed_url: String,
    /// Feed title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Any other fields the server sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Subscription creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    /// URL of the feed or of a site advertising one
    pub feed_url: String,
}

/// Subscription rename request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubscriptionRequest {
    /// New display title
    pub title: String,
}
