//! Shared helpers for the fedicap conformance suite.
//!
//! Provides [`spawn_instance`]: binds a `TcpListener` on an ephemeral port,
//! serves a small mock server that speaks just enough of the API for the
//! client's end-to-end paths, and returns the base URL plus a handle on the
//! mock's state so tests can inspect exactly what arrived on the wire.
//!
//! # Routes
//!
//! | Route | Behavior |
//! |-------|----------|
//! | `GET /.well-known/nodeinfo` | JRD whose 2.0 link is plain `http` |
//! | `GET /nodeinfo/2.0` | `akkoma 3.10.4` |
//! | `GET /api/v1/instance` | Instance document advertising `pleroma_emoji_reactions` |
//! | `GET /api/v1/timelines/home` | Five statuses, bearer token required, `Link` cursors |
//! | `GET /api/v1/statuses/{id}` | `404` JSON error, or a `503` HTML page for id `html` |
//! | `POST /api/v1/statuses` | Echoes the posted text |
//! | `POST /api/v2/media` | Accepts the raw multipart body |

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, OnceLock};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

/// Token the home timeline accepts.
pub const VALID_TOKEN: &str = "conformance-token";

/// Status ids served by the home timeline, newest first.
pub const HOME_IDS: [u64; 5] = [105, 104, 103, 102, 101];

/// Opaque cursor prefix. `Link` URLs carry it as `cursor%2B`, and the client
/// must send it back in that form.
pub const CURSOR_PREFIX: &str = "cursor+";

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    /// Lower-cased names.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Default)]
pub struct MockState {
    base_url: OnceLock<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) {
        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                method,
                path: uri.path().to_string(),
                query: uri.query().map(str::to_string),
                headers,
                body: body.to_vec(),
            });
    }

    fn base_url(&self) -> &str {
        self.base_url.get().map(String::as_str).unwrap_or_default()
    }
}

/// Start an ephemeral mock instance and return `(base_url, state)`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_instance() -> (Url, Arc<MockState>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let state = Arc::new(MockState::default());
    state
        .base_url
        .set(base_url.clone())
        .expect("base url set once");

    let router = build_router(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("mock instance error");
    });

    (Url::parse(&base_url).expect("valid base url"), state)
}

fn build_router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/.well-known/nodeinfo", get(well_known))
        .route("/nodeinfo/2.0", get(node_info))
        .route("/api/v1/instance", get(instance))
        .route("/api/v1/timelines/home", get(home_timeline))
        .route("/api/v1/statuses", post(post_status))
        .route("/api/v1/statuses/{id}", get(get_status))
        .route("/api/v2/media", post(upload_media))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn status_json(id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "uri": format!("https://mock.example/statuses/{id}"),
        "created_at": "2024-05-01T12:00:00.000Z",
        "content": content,
        "visibility": "public",
        "account": {"id": "1", "username": "alice", "acct": "alice"},
    })
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn well_known(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(method, &uri, &headers, &[]);
    Json(json!({
        "links": [{
            "rel": "http://nodeinfo.diaspora.software/ns/schema/2.0",
            "href": format!("{}/nodeinfo/2.0", state.base_url()),
        }]
    }))
}

async fn node_info(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(method, &uri, &headers, &[]);
    Json(json!({
        "version": "2.0",
        "software": {"name": "akkoma", "version": "3.10.4"},
        "openRegistrations": false,
    }))
}

async fn instance(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(method, &uri, &headers, &[]);
    Json(json!({
        "uri": "mock.example",
        "title": "Mock",
        "version": "2.7.2 (compatible; Akkoma 3.10.4)",
        "pleroma": {"metadata": {"features": ["pleroma_emoji_reactions"]}},
    }))
}

async fn home_timeline(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(method, &uri, &headers, &[]);

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {VALID_TOKEN}").as_str());
    if !authorized {
        return api_error(StatusCode::UNAUTHORIZED, "The access token is invalid");
    }

    let max_id = match query.get("max_id") {
        Some(cursor) => match cursor
            .strip_prefix(CURSOR_PREFIX)
            .and_then(|id| id.parse::<u64>().ok())
        {
            Some(id) => Some(id),
            None => return api_error(StatusCode::BAD_REQUEST, "malformed cursor"),
        },
        None => None,
    };
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(20);

    let page: Vec<u64> = HOME_IDS
        .iter()
        .copied()
        .filter(|id| max_id.map_or(true, |max| *id < max))
        .take(limit)
        .collect();
    let body: Vec<Value> = page
        .iter()
        .map(|id| status_json(&id.to_string(), &format!("status {id}")))
        .collect();

    let mut response = Json(body).into_response();
    if let (Some(oldest), Some(newest)) = (page.last(), page.first()) {
        let endpoint = format!("{}/api/v1/timelines/home", state.base_url());
        let link = format!(
            "<{endpoint}?max_id=cursor%2B{oldest}>; rel=\"next\", \
             <{endpoint}?min_id=cursor%2B{newest}>; rel=\"prev\""
        );
        if let Ok(value) = link.parse() {
            response.headers_mut().insert(header::LINK, value);
        }
    }
    response
}

async fn get_status(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(method, &uri, &headers, &[]);
    if id == "html" {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/html")],
            "<html><body>Maintenance</body></html>",
        )
            .into_response();
    }
    api_error(StatusCode::NOT_FOUND, "Record not found")
}

async fn post_status(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(method, &uri, &headers, &body);
    let Ok(posted) = serde_json::from_slice::<Value>(&body) else {
        return api_error(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed");
    };
    let text = posted["status"].as_str().unwrap_or_default().to_string();
    Json(status_json("200", &text)).into_response()
}

async fn upload_media(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(method, &uri, &headers, &body);
    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data; boundary="));
    if !is_multipart {
        return api_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected multipart");
    }
    Json(json!({
        "id": "m1",
        "type": "image",
        "url": null,
        "description": "a cat",
    }))
    .into_response()
}
