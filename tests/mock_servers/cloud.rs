//! Mock device hub API for testing
//!
//! Serves the connector status, the device list, per-device stats and the
//! command/query form endpoints. Every request is recorded.

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// One request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Decoded value of a form field in the body
    pub fn form_field(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Mock API state
struct MockCloudState {
    status: Value,
    devices: Vec<String>,
    stats: BTreeMap<String, Value>,
    fail_with: Option<u16>,
    requests: Vec<RecordedRequest>,
}

/// Mock device hub API server
pub struct MockCloudServer {
    addr: SocketAddr,
    state: Arc<RwLock<MockCloudState>>,
    handle: JoinHandle<()>,
}

impl MockCloudServer {
    /// Start a mock API on a random port
    pub async fn start() -> Self {
        let state = Arc::new(RwLock::new(MockCloudState {
            status: json!({"metrics": {}, "units": {}}),
            devices: Vec::new(),
            stats: BTreeMap::new(),
            fail_with: None,
            requests: Vec::new(),
        }));

        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// API root to hand to the connector
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn set_status(&self, status: Value) {
        self.state.write().await.status = status;
    }

    /// Register a connected device with its stats
    pub async fn add_device(&self, device_id: &str, stats: Value) {
        let mut state = self.state.write().await;
        state.devices.push(device_id.to_string());
        state.stats.insert(device_id.to_string(), stats);
    }

    /// Answer every request with this status and a plain-text body
    pub async fn fail_with(&self, status: Option<u16>) {
        self.state.write().await.fail_with = status;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.read().await.requests.clone()
    }

    pub async fn last_request(&self) -> Option<RecordedRequest> {
        self.state.read().await.requests.last().cloned()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

async fn handle(
    State(state): State<Arc<RwLock<MockCloudState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = state.write().await;
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: body.clone(),
    });

    if let Some(code) = state.fail_with {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "unavailable").into_response();
    }

    let segments: Vec<&str> = uri.path().trim_start_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["cloud-connector", "status"]) => Json(state.status.clone()).into_response(),
        ("GET", ["devices"]) => Json(json!({"devices": state.devices})).into_response(),
        ("GET", ["devices", id, "show"]) => match state.stats.get(*id) {
            Some(stats) => Json(stats.clone()).into_response(),
            None => (StatusCode::NOT_FOUND, "no such device").into_response(),
        },
        ("GET", ["garbage"]) => (StatusCode::OK, "<html>not json</html>").into_response(),
        ("POST", ["devices", kind @ ("command" | "query"), id]) => {
            let payload = url::form_urlencoded::parse(body.as_bytes())
                .find(|(key, _)| key == "payload")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default();
            if state.stats.contains_key(*id) {
                Json(json!({"response": format!("{kind} {payload} ok"), "errors": ""}))
                    .into_response()
            } else {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"response": "", "errors": format!("Device {id} is not connected")})),
                )
                    .into_response()
            }
        }
        _ => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
