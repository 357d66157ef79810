//! In-process mock of the configuration backend, served by axum on an ephemeral port.

#![allow(dead_code)]

use agentcfg::model_config::ModelConfig;
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Backend-side state, inspectable by tests.
#[derive(Default)]
pub struct MockState {
    pub registry: Option<Vec<ModelConfig>>,
    pub current_model: Option<String>,
    pub catalog: Value,
    pub enabled: Option<Vec<String>>,
    /// Raw body served by GET /get_auto_tools_selection_mode.
    pub mode_body: Value,
    /// Raw query strings received by the query-only endpoints, in order.
    pub queries: Vec<String>,
    /// Paths hit, in order.
    pub hits: Vec<String>,
    /// Write endpoints that answer 500 instead of storing anything.
    pub failing: Vec<String>,
    /// Delay before the write endpoints answer.
    pub write_delay: Option<Duration>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub url: String,
    pub state: Shared,
}

impl MockBackend {
    pub fn hits(&self) -> Vec<String> {
        self.state.lock().unwrap().hits.clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.hits().iter().filter(|h| h.as_str() == path).count()
    }
}

pub fn sample_catalog() -> Value {
    json!({
        "PKPM_Structural modeling": {
            "create_beam": "Create a beam between two nodes",
            "create_column": "Create a column at a node"
        },
        "Files_Local files": {
            "read_file": "Read a file from the workspace"
        },
        "Web_Search": {
            "search": "Search the web"
        }
    })
}

fn hit(state: &Shared, path: &str) {
    state.lock().unwrap().hits.push(path.to_string());
}

/// Shared prelude of the tool write endpoints: record the hit, honor the configured delay,
/// and answer 500 when the path is marked as failing.
async fn write_guard(state: &Shared, path: &str) -> Option<Response> {
    hit(state, path);
    let (delay, fails) = {
        let st = state.lock().unwrap();
        (st.write_delay, st.failing.iter().any(|p| p == path))
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    fails.then(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "storage unavailable", "details": path })),
        )
            .into_response()
    })
}

async fn get_model_config(
    State(s): State<Shared>,
    Json(candidates): Json<Vec<ModelConfig>>,
) -> Json<Vec<ModelConfig>> {
    hit(&s, "/get_model_config");
    let mut st = s.lock().unwrap();
    let registry = st.registry.get_or_insert(candidates).clone();
    Json(registry)
}

async fn set_model_config(
    State(s): State<Shared>,
    Json(configs): Json<Vec<ModelConfig>>,
) -> Json<Value> {
    hit(&s, "/set_model_config");
    s.lock().unwrap().registry = Some(configs);
    Json(json!({ "message": "Model configuration saved" }))
}

fn query_value(raw: &Option<String>, key: &str) -> Option<String> {
    raw.as_deref()?
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.replace('+', " ").replace("%20", " "))
}

async fn set_current_model(State(s): State<Shared>, RawQuery(q): RawQuery) -> Json<Value> {
    hit(&s, "/set_current_model");
    let name = query_value(&q, "model_name");
    let mut st = s.lock().unwrap();
    st.queries.push(q.unwrap_or_default());
    st.current_model = name.clone();
    Json(json!({ "message": format!("Current model set to {}", name.unwrap_or_default()) }))
}

async fn get_current_model(State(s): State<Shared>) -> Json<Value> {
    hit(&s, "/get_current_model");
    let st = s.lock().unwrap();
    Json(json!({ "current_model": st.current_model.clone().unwrap_or_default() }))
}

async fn check_model_connectivity(
    State(s): State<Shared>,
    Json(config): Json<ModelConfig>,
) -> Json<Value> {
    hit(&s, "/check_model_connectivity");
    if config.api_key.starts_with("sk-bad") {
        Json(json!({ "Error": "Authentication failed: invalid api key" }))
    } else {
        Json(json!({ "Success": format!("{} is reachable", config.name) }))
    }
}

async fn get_tools(State(s): State<Shared>) -> Json<Value> {
    hit(&s, "/get_tools");
    Json(s.lock().unwrap().catalog.clone())
}

async fn get_enabled_tools_set(State(s): State<Shared>) -> Json<Value> {
    hit(&s, "/get_enabled_tools_set");
    match &s.lock().unwrap().enabled {
        Some(list) => Json(json!({ "enabled_tools_set": list })),
        None => Json(json!({})),
    }
}

async fn set_enabled_tools_set(
    State(s): State<Shared>,
    Json(names): Json<Vec<String>>,
) -> Response {
    if let Some(failure) = write_guard(&s, "/set_enabled_tools_set").await {
        return failure;
    }
    s.lock().unwrap().enabled = Some(names);
    Json(json!({ "message": "Enabled tools updated" })).into_response()
}

async fn get_auto_mode(State(s): State<Shared>) -> Json<Value> {
    hit(&s, "/get_auto_tools_selection_mode");
    Json(s.lock().unwrap().mode_body.clone())
}

async fn set_auto_mode(State(s): State<Shared>, RawQuery(q): RawQuery) -> Response {
    if let Some(failure) = write_guard(&s, "/set_auto_tools_selection_mode").await {
        return failure;
    }
    let enabled = query_value(&q, "enabled").as_deref() == Some("true");
    let mut st = s.lock().unwrap();
    st.queries.push(q.unwrap_or_default());
    st.mode_body = json!({ "selection_mode": enabled });
    Json(json!({ "message": "Selection mode updated" })).into_response()
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

/// Well-behaved backend with an empty registry and the sample catalog.
pub async fn spawn_backend() -> MockBackend {
    spawn_backend_with(MockState {
        catalog: sample_catalog(),
        mode_body: json!({}),
        ..MockState::default()
    })
    .await
}

pub async fn spawn_backend_with(state: MockState) -> MockBackend {
    let state: Shared = Arc::new(Mutex::new(state));
    let app = Router::new()
        .route("/get_model_config", post(get_model_config))
        .route("/set_model_config", post(set_model_config))
        .route("/set_current_model", post(set_current_model))
        .route("/get_current_model", get(get_current_model))
        .route("/check_model_connectivity", post(check_model_connectivity))
        .route("/get_tools", get(get_tools))
        .route("/get_enabled_tools_set", get(get_enabled_tools_set))
        .route("/set_enabled_tools_set", post(set_enabled_tools_set))
        .route("/get_auto_tools_selection_mode", get(get_auto_mode))
        .route("/set_auto_tools_selection_mode", post(set_auto_mode))
        .with_state(state.clone());
    let url = serve(app).await;
    MockBackend { url, state }
}

/// Backend that answers every request with the given status and raw body.
pub async fn spawn_failing(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().fallback(move || async move { (status, body).into_response() });
    serve(app).await
}

/// Backend that never answers within the test's lifetime.
pub async fn spawn_stalled() -> String {
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Json(json!({}))
    });
    serve(app).await
}

/// URL of a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn deepseek(key: &str) -> ModelConfig {
    ModelConfig::new("DeepSeek", "deepseek-chat", "https://api.deepseek.com", key)
}
