//! Test helpers: in-process stub upstreams
//!
//! One axum server on an ephemeral port plays both upstreams: the
//! external search/detail API and the community catalog. Behavior is
//! steered through shared state (per-query delays, failure injection,
//! canned detail records) so the real reqwest-based adapters can be
//! exercised end to end, including cancellation races.

// Each test binary compiles this module separately and uses a different
// subset of it.
#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Inner {
    /// totalResults reported by the search endpoint
    total_results: u64,
    /// Artificial latency keyed by search query text
    delays_ms: HashMap<String, u64>,
    /// Respond to searches with this status instead of results
    fail_search_with: Option<u16>,
    /// Query params of every search request received
    search_requests: Vec<HashMap<String, String>>,
    /// Canned external detail records; absent ids 404
    external_details: HashMap<i64, Value>,
    community_recipes: Vec<Value>,
    /// Canned community detail records; absent ids 404
    community_details: HashMap<String, Value>,
}

#[derive(Clone, Default)]
pub struct StubState {
    inner: Arc<Mutex<Inner>>,
}

impl StubState {
    pub fn set_total_results(&self, total: u64) {
        self.inner.lock().unwrap().total_results = total;
    }

    pub fn delay_query(&self, query: &str, ms: u64) {
        self.inner.lock().unwrap().delays_ms.insert(query.to_string(), ms);
    }

    pub fn fail_search_with(&self, status: u16) {
        self.inner.lock().unwrap().fail_search_with = Some(status);
    }

    pub fn clear_search_failure(&self) {
        self.inner.lock().unwrap().fail_search_with = None;
    }

    pub fn search_requests(&self) -> Vec<HashMap<String, String>> {
        self.inner.lock().unwrap().search_requests.clone()
    }

    pub fn add_external_detail(&self, id: i64, record: Value) {
        self.inner.lock().unwrap().external_details.insert(id, record);
    }

    pub fn set_community_recipes(&self, recipes: Vec<Value>) {
        self.inner.lock().unwrap().community_recipes = recipes;
    }

    pub fn add_community_detail(&self, id: &str, record: Value) {
        self.inner
            .lock()
            .unwrap()
            .community_details
            .insert(id.to_string(), record);
    }
}

/// Search endpoint: synthesizes `number` records per page unless failure
/// injection is active. Titles embed the query text so client-side title
/// filtering keeps them.
async fn complex_search(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (delay, fail, total) = {
        let mut inner = state.inner.lock().unwrap();
        inner.search_requests.push(params.clone());
        let query = params.get("query").cloned().unwrap_or_default();
        (
            inner.delays_ms.get(&query).copied(),
            inner.fail_search_with,
            inner.total_results,
        )
    };

    if let Some(ms) = delay {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    if let Some(status) = fail {
        return (
            StatusCode::from_u16(status).unwrap(),
            Json(json!({"message": "stubbed upstream failure"})),
        )
            .into_response();
    }

    let number: u64 = params
        .get("number")
        .and_then(|n| n.parse().ok())
        .unwrap_or(12);
    let offset: u64 = params
        .get("offset")
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    let query = params.get("query").cloned().unwrap_or_default();
    let label = if query.is_empty() { "tasty".to_string() } else { query };

    let count = number.min(total.saturating_sub(offset));
    let results: Vec<Value> = (0..count)
        .map(|i| {
            let id = offset + i + 1;
            json!({
                "id": id,
                "title": format!("{} recipe {}", label, id),
                "image": format!("https://img.test/{}.jpg", id),
                "summary": "a stubbed dish",
                "diets": ["vegetarian"],
            })
        })
        .collect();

    Json(json!({"results": results, "totalResults": total})).into_response()
}

async fn external_detail(
    State(state): State<StubState>,
    Path(id): Path<i64>,
) -> Response {
    let record = state.inner.lock().unwrap().external_details.get(&id).cloned();
    match record {
        Some(record) => Json(record).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response(),
    }
}

async fn community_list(State(state): State<StubState>) -> Json<Value> {
    let recipes = state.inner.lock().unwrap().community_recipes.clone();
    Json(Value::Array(recipes))
}

async fn community_detail(
    State(state): State<StubState>,
    Path(id): Path<String>,
) -> Response {
    let record = state.inner.lock().unwrap().community_details.get(&id).cloned();
    match record {
        Some(record) => Json(record).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response(),
    }
}

pub struct StubServer {
    pub addr: SocketAddr,
    pub state: StubState,
}

/// Install a test subscriber once; `RUST_LOG` steers verbosity.
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

impl StubServer {
    /// Bind an ephemeral port and serve both stub upstreams from it.
    pub async fn start() -> Self {
        init_tracing();
        let state = StubState::default();
        state.set_total_results(100);

        let app = Router::new()
            .route("/recipes/complexSearch", get(complex_search))
            .route("/recipes/:id/information", get(external_detail))
            .route("/community", get(community_list))
            .route("/community/:id", get(community_detail))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL for both the external API and the community catalog.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}
