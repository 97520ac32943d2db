//! HTTP client for the Feedbin REST API.

use feedscope_core::api::{
    CreateSubscriptionRequest, UpdateSubscriptionRequest, EXTENDED_MODE, RECORD_COUNT_HEADER,
};
use feedscope_core::{Auth, FeedscopeError, Result};
use http::request::Parts;
use http_cache_reqwest::{
    CACacheManager, Cache, CacheMode, CacheOptions, HttpCache, HttpCacheOptions,
};
use reqwest::header::{HeaderMap, LINK, LOCATION};
use reqwest::{Method, StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::Settings;

/// Body of an API response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Payload parsed as JSON
    Json(Value),
    /// Anything else, including an empty body
    Raw(Vec<u8>),
}

/// Status, headers and body of one API call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// URL the request was sent to
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl ApiResponse {
    /// Deserialize the JSON body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.body {
            ResponseBody::Json(value) => Ok(T::deserialize(value)?),
            ResponseBody::Raw(_) => Err(FeedscopeError::Serialization(format!(
                "expected a JSON body in the {} response",
                self.status.as_u16()
            ))),
        }
    }

    /// URL of the next page, from the `Link` header
    pub fn next_link(&self) -> Option<String> {
        self.headers
            .get_all(LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(parse_next_link)
    }

    /// Total number of records across all pages
    pub fn record_count(&self) -> Option<u64> {
        self.headers
            .get(RECORD_COUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    }

    /// `Location` header, set on redirects such as an existing subscription
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

/// Extract the `rel="next"` target from a `Link` header value.
///
/// The header is a comma-separated list of `<url>; param; param` entries.
fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let url = target.strip_prefix('<')?.strip_suffix('>')?;

        let is_next = parts.any(|param| {
            let param = param.trim();
            param
                .strip_prefix("rel=")
                .map(|rel| {
                    rel.trim_matches('"')
                        .split_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("next"))
                })
                .unwrap_or(false)
        });

        is_next.then(|| url.to_string())
    })
}

/// Feedbin API client.
///
/// Every request carries HTTP Basic credentials and goes through an on-disk
/// HTTP cache that honours the server's cache-control headers. Redirects are
/// not followed: a 302 from the API is a result in its own right.
///
/// Build one per command and drop it when the command returns. A single
/// request attempt is made; failures are reported, never retried.
#[derive(Clone)]
pub struct FeedbinClient {
    client: ClientWithMiddleware,
    base_url: Url,
    auth: Auth,
}

impl FeedbinClient {
    /// Create a client for the given settings and credentials.
    pub fn new(settings: &Settings, auth: Auth) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout))
            .user_agent(concat!("feedscope/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FeedscopeError::Network(format!("failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(settings.api_url.trim_end_matches('/'))
            .map_err(|e| FeedscopeError::Config(format!("invalid API URL: {}", e)))?;

        let mut builder = ClientBuilder::new(http);
        if settings.cache_enabled {
            debug!("HTTP cache at {}", settings.cache_dir.display());
            builder = builder.with(Cache(HttpCache {
                mode: CacheMode::Default,
                manager: CACacheManager {
                    path: settings.cache_dir.clone(),
                    ..Default::default()
                },
                options: cache_options(&auth.email),
            }));
        }

        Ok(Self {
            client: builder.build(),
            base_url,
            auth,
        })
    }

    /// Email of the account this client authenticates as
    pub fn email(&self) -> &str {
        &self.auth.email
    }

    /// Resolve an API path (`subscriptions.json`) or absolute URL.
    ///
    /// Absolute URLs come from response headers (`Link`, `Location`) and
    /// must share the API's origin, since every request carries credentials.
    fn url(&self, path_or_url: &str, query: &[(&str, &str)]) -> Result<Url> {
        let is_absolute = path_or_url.starts_with("http://") || path_or_url.starts_with("https://");
        let raw = if is_absolute {
            path_or_url.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.as_str().trim_end_matches('/'),
                path_or_url.trim_start_matches('/')
            )
        };

        let mut url = Url::parse(&raw)
            .map_err(|e| FeedscopeError::InvalidInput(format!("invalid URL {}: {}", raw, e)))?;

        if is_absolute && url.origin() != self.base_url.origin() {
            return Err(FeedscopeError::InvalidInput(format!(
                "refusing to send credentials to {}: not on {}",
                url,
                self.base_url.origin().ascii_serialization()
            )));
        }

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Issue one request and collect the response.
    ///
    /// Only transport failures are errors here; every HTTP status comes back
    /// as an [`ApiResponse`] for the caller to interpret.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path_or_url: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<ApiResponse> {
        let url = self.url(path_or_url, query)?;
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .basic_auth(&self.auth.email, Some(&self.auth.password));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FeedscopeError::Network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedscopeError::Network(e.to_string()))?;

        debug!("{} {} -> {}", method, url, status);

        let body = if bytes.is_empty() {
            ResponseBody::Raw(Vec::new())
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Raw(bytes.to_vec()),
            }
        };

        Ok(ApiResponse {
            url,
            status,
            headers,
            body,
        })
    }

    /// `GET authentication.json`
    pub async fn check_authentication(&self) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, "authentication.json", &[], None)
            .await
    }

    /// First page of `GET subscriptions.json`
    pub async fn list_subscriptions(&self, extended: bool) -> Result<ApiResponse> {
        self.request::<()>(
            Method::GET,
            "subscriptions.json",
            mode_query(extended),
            None,
        )
        .await
    }

    /// Follow a pagination link
    pub async fn get_page(&self, url: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, url, &[], None).await
    }

    /// `GET subscriptions/{id}.json`
    pub async fn get_subscription(&self, id: u64, extended: bool) -> Result<ApiResponse> {
        self.request::<()>(
            Method::GET,
            &subscription_path(id),
            mode_query(extended),
            None,
        )
        .await
    }

    /// `POST subscriptions.json`
    pub async fn create_subscription(&self, feed_url: &str) -> Result<ApiResponse> {
        let body = CreateSubscriptionRequest {
            feed_url: feed_url.to_string(),
        };
        self.request(Method::POST, "subscriptions.json", &[], Some(&body))
            .await
    }

    /// `PATCH subscriptions/{id}.json`
    pub async fn update_subscription(&self, id: u64, title: &str) -> Result<ApiResponse> {
        let body = UpdateSubscriptionRequest {
            title: title.to_string(),
        };
        self.request(Method::PATCH, &subscription_path(id), &[], Some(&body))
            .await
    }

    /// `DELETE subscriptions/{id}.json`
    pub async fn delete_subscription(&self, id: u64) -> Result<ApiResponse> {
        self.request::<()>(Method::DELETE, &subscription_path(id), &[], None)
            .await
    }
}

/// Private-cache semantics, keyed per account.
///
/// A shared cache never stores responses to requests carrying
/// `Authorization`, and every Feedbin request does.
fn cache_options(email: &str) -> HttpCacheOptions {
    let account = email.to_string();
    HttpCacheOptions {
        cache_key: Some(Arc::new(move |parts: &Parts| {
            format!("{}:{}:{}", account, parts.method, parts.uri)
        })),
        cache_options: Some(CacheOptions {
            shared: false,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn subscription_path(id: u64) -> String {
    format!("subscriptions/{}.json", id)
}

fn mode_query(extended: bool) -> &'static [(&'static str, &'static str)] {
    if extended {
        &[("mode", EXTENDED_MODE)]
    } else {
        &[]
    }
}
