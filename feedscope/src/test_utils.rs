//! Test utilities for CLI testing
//!
//! Provides a mock Feedbin server and a scripted [`Interaction`] for handler
//! tests.

use anyhow::{anyhow, Result};
use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use feedscope_core::Subscription;
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::prompt::Interaction;

/// Account the mock server accepts
pub const EMAIL: &str = "reader@example.com";
/// Password the mock server accepts
pub const PASSWORD: &str = "correct horse";

#[derive(Debug)]
struct Inner {
    subscriptions: Vec<Subscription>,
    foreign: Vec<u64>,
    page_size: usize,
    fixed_next: Option<String>,
    forced_status: Option<u16>,
    requests: Vec<String>,
    base_url: String,
    next_id: u64,
}

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                subscriptions: Vec::new(),
                foreign: Vec::new(),
                page_size: 100,
                fixed_next: None,
                forced_status: None,
                requests: Vec::new(),
                base_url: String::new(),
                next_id: 1000,
            })),
        }
    }
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Subscriptions owned by the test account
    pub fn with_subscriptions(self, subscriptions: Vec<Subscription>) -> Self {
        self.lock().subscriptions = subscriptions;
        self
    }

    /// Subscription ids that belong to somebody else (403)
    pub fn with_foreign(self, id: u64) -> Self {
        self.lock().foreign.push(id);
        self
    }

    /// Items per page of `subscriptions.json`
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.lock().page_size = page_size.max(1);
        self
    }

    /// Always advertise this `rel="next"` link on `subscriptions.json`.
    /// Paths starting with `/` are relative to the API base URL.
    pub fn with_fixed_next(self, link: &str) -> Self {
        self.lock().fixed_next = Some(link.to_string());
        self
    }

    /// Answer every request with this status
    pub fn with_forced_status(self, status: u16) -> Self {
        self.lock().forced_status = Some(status);
        self
    }

    /// Ids of the subscriptions currently stored
    pub fn subscription_ids(&self) -> Vec<u64> {
        self.lock().subscriptions.iter().map(|s| s.id).collect()
    }
}

/// Mock Feedbin API server
#[derive(Debug)]
pub struct MockServer {
    state: MockState,
    url: String,
}

impl MockServer {
    /// Start the mock server on an ephemeral port
    pub async fn start(state: MockState) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let url = format!("http://{}/v2", addr);
        state.lock().base_url = url.clone();

        let app = create_router(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        // Give the server a moment to start and verify it's running
        for _ in 0..20 {
            if tokio::net::TcpStream::connect(addr).await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Ok(Self { state, url })
    }

    /// API base URL, ending in `/v2`
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &MockState {
        &self.state
    }

    /// `METHOD /path?query` of every request received so far
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }
}

fn create_router(state: MockState) -> Router {
    Router::new()
        .route("/v2/authentication.json", get(authentication_handler))
        .route(
            "/v2/subscriptions.json",
            get(list_subscriptions_handler).post(create_subscription_handler),
        )
        .route(
            "/v2/subscriptions/:id",
            get(get_subscription_handler)
                .patch(update_subscription_handler)
                .delete(delete_subscription_handler),
        )
        .layer(middleware::from_fn_with_state(state.clone(), guard))
        .with_state(state)
}

/// Record the request, then apply the forced status and Basic auth check
async fn guard(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let (forced, authorized) = {
        let mut inner = state.lock();
        inner
            .requests
            .push(format!("{} {}", request.method(), request.uri()));
        (inner.forced_status, is_authorized(request.headers()))
    };

    if let Some(code) = forced {
        return StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response();
    }
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(request).await
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .map(|credentials| credentials == format!("{}:{}", EMAIL, PASSWORD))
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<usize>,
    mode: Option<String>,
}

impl ListQuery {
    fn extended(&self) -> bool {
        self.mode.as_deref() == Some("extended")
    }
}

fn render(subscription: &Subscription, extended: bool) -> Value {
    let mut value = serde_json::to_value(subscription).unwrap();
    if extended {
        value["feed_type"] = json!("xml");
    }
    value
}

fn lookup(inner: &Inner, raw_id: &str) -> std::result::Result<usize, StatusCode> {
    let id: u64 = raw_id
        .strip_suffix(".json")
        .unwrap_or(raw_id)
        .parse()
        .map_err(|_| StatusCode::NOT_FOUND)?;

    if inner.foreign.contains(&id) {
        return Err(StatusCode::FORBIDDEN);
    }

    inner
        .subscriptions
        .iter()
        .position(|s| s.id == id)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn authentication_handler() -> StatusCode {
    StatusCode::OK
}

async fn list_subscriptions_handler(
    State(state): State<MockState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let inner = state.lock();
    let page = query.page.unwrap_or(1).max(1);
    let start = (page - 1) * inner.page_size;
    let total = inner.subscriptions.len();

    let items: Vec<Value> = inner
        .subscriptions
        .iter()
        .skip(start)
        .take(inner.page_size)
        .map(|s| render(s, query.extended()))
        .collect();

    let mut headers = HeaderMap::new();
    headers.insert("x-feedbin-record-count", HeaderValue::from(total));
    if let Some(fixed) = &inner.fixed_next {
        let next = if fixed.starts_with('/') {
            format!("{}{}", inner.base_url, fixed)
        } else {
            fixed.clone()
        };
        let link = format!("<{}>; rel=\"next\"", next);
        headers.insert(header::LINK, HeaderValue::from_str(&link).unwrap());
    } else if start + inner.page_size < total {
        let mut next = format!("{}/subscriptions.json?page={}", inner.base_url, page + 1);
        if query.extended() {
            next.push_str("&mode=extended");
        }
        let link = format!("<{}>; rel=\"next\"", next);
        headers.insert(header::LINK, HeaderValue::from_str(&link).unwrap());
    }

    (headers, Json(items)).into_response()
}

async fn get_subscription_handler(
    State(state): State<MockState>,
    Path(raw_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let inner = state.lock();
    match lookup(&inner, &raw_id) {
        Ok(index) => Json(render(&inner.subscriptions[index], query.extended())).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn update_subscription_handler(
    State(state): State<MockState>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.lock();
    let index = match lookup(&inner, &raw_id) {
        Ok(index) => index,
        Err(status) => return status.into_response(),
    };

    if let Some(title) = body.get("title").and_then(Value::as_str) {
        inner.subscriptions[index].title = title.to_string();
    }
    Json(inner.subscriptions[index].clone()).into_response()
}

async fn delete_subscription_handler(
    State(state): State<MockState>,
    Path(raw_id): Path<String>,
) -> StatusCode {
    let mut inner = state.lock();
    match lookup(&inner, &raw_id) {
        Ok(index) => {
            inner.subscriptions.remove(index);
            StatusCode::NO_CONTENT
        }
        Err(status) => status,
    }
}

/// 302 for a feed already followed, 300 for URLs containing "multi",
/// 404 for URLs containing "missing", 201 otherwise
async fn create_subscription_handler(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> Response {
    let feed_url = body
        .get("feed_url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let mut inner = state.lock();

    if let Some(existing) = inner.subscriptions.iter().find(|s| s.feed_url == feed_url) {
        let location = format!("{}/subscriptions/{}.json", inner.base_url, existing.id);
        return (
            StatusCode::FOUND,
            [(header::LOCATION, location)],
            Json(existing.clone()),
        )
            .into_response();
    }

    if feed_url.contains("multi") {
        let choices = json!([
            { "feed_url": format!("{}/rss", feed_url), "title": "RSS", "feed_type": "rss" },
            { "feed_url": format!("{}/atom", feed_url), "title": "Atom" },
        ]);
        return (StatusCode::MULTIPLE_CHOICES, Json(choices)).into_response();
    }

    if feed_url.contains("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let id = inner.next_id;
    inner.next_id += 1;
    let subscription = Subscription::new(id, "New Feed", feed_url);
    inner.subscriptions.push(subscription.clone());

    (StatusCode::CREATED, Json(subscription)).into_response()
}

/// Canned answers for interactive prompts
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    passwords: RefCell<VecDeque<String>>,
    inputs: RefCell<VecDeque<String>>,
    confirms: RefCell<VecDeque<bool>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(self, answer: &str) -> Self {
        self.passwords.borrow_mut().push_back(answer.to_string());
        self
    }

    pub fn with_input(self, answer: &str) -> Self {
        self.inputs.borrow_mut().push_back(answer.to_string());
        self
    }

    pub fn with_confirm(self, answer: bool) -> Self {
        self.confirms.borrow_mut().push_back(answer);
        self
    }

    /// Every prompt shown, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Interaction for ScriptedPrompt {
    fn password(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.passwords
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected password prompt: {}", prompt))
    }

    fn input(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.inputs
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected input prompt: {}", prompt))
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirms
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected confirmation: {}", prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_rejects_bad_credentials() {
        let server = MockServer::start(MockState::default()).await.unwrap();
        let client = reqwest::Client::new();

        let ok = client
            .get(format!("{}/authentication.json", server.url()))
            .basic_auth(EMAIL, Some(PASSWORD))
            .send()
            .await
            .unwrap();
        assert_eq!(ok.status(), reqwest::StatusCode::OK);

        let rejected = client
            .get(format!("{}/authentication.json", server.url()))
            .basic_auth(EMAIL, Some("nope"))
            .send()
            .await
            .unwrap();
        assert_eq!(rejected.status(), reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(server.requests().len(), 2);
    }
}
