//! Mock Denvr control plane with scripted readiness.
//!
//! Detail and server queries answer with the next status from a script; the
//! last scripted status repeats once the script runs out.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use denvr_api::{Credentials, DenvrConfig, HttpClient};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "access1";

#[derive(Default)]
struct MockState {
    statuses: VecDeque<String>,
    last_status: Option<String>,
    calls: Vec<String>,
}

impl MockState {
    fn next_status(&mut self) -> Option<String> {
        if let Some(status) = self.statuses.pop_front() {
            self.last_status = Some(status);
        }
        self.last_status.clone()
    }
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockControlPlane {
    addr: SocketAddr,
    state: Shared,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl MockControlPlane {
    /// Spawn a mock whose status queries walk through `statuses`.
    pub async fn spawn(statuses: &[&str]) -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState {
            statuses: statuses.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }));

        let router = Router::new()
            .route("/api/TokenAuth/Authenticate", post(authenticate))
            .route("/api/v1/servers/virtual/CreateServer", post(create_server))
            .route("/api/v1/servers/virtual/GetServer", get(get_server))
            .route(
                "/api/v1/servers/virtual/DestroyServer",
                delete(destroy_server),
            )
            .route(
                "/api/v1/servers/applications/CreateCatalogApplication",
                post(create_application),
            )
            .route(
                "/api/v1/servers/applications/CreateCustomApplication",
                post(create_application),
            )
            .route(
                "/api/v1/servers/applications/GetApplicationDetails",
                get(get_application_details),
            )
            .route(
                "/api/v1/servers/applications/DestroyApplication",
                delete(destroy_application),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            addr,
            state,
            shutdown_tx,
        }
    }

    pub fn client(&self) -> Arc<HttpClient> {
        let config = DenvrConfig::with_server(
            format!("http://{}", self.addr),
            Credentials {
                username: "test@foobar.com".into(),
                password: "test.foo.bar.baz".into(),
            },
        );
        Arc::new(HttpClient::new(config).expect("Failed to build client"))
    }

    /// Control-plane calls made so far, authentication excluded.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"message": "Unauthorized"}})),
    )
}

fn not_found(kind: &str, id: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": {"message": format!("{} \"{}\" not found", kind, id)}})),
    )
}

fn ok(result: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "result": result })))
}

fn server_json(id: &str, status: Option<String>) -> Value {
    json!({
        "id": id,
        "cluster": "Hou1",
        "namespace": "denvr",
        "status": status,
        "ip": "198.16.0.37",
        "privateIp": "172.16.0.36",
        "username": "test@foobar.com",
        "tenancy_name": "denvr",
        "gpu_type": "nvidia.com/A100PCIE40GB",
        "gpus": 1,
        "image": "Ubuntu 22.04.4 LTS",
        "memory": 115,
        "storage": 1700,
        "storageType": "na",
        "vcpus": 14,
        "directAttachedStoragePersisted": false
    })
}

async fn authenticate(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] != "test.foo.bar.baz" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"message": "Invalid user name or password"}})),
        );
    }
    ok(json!({
        "accessToken": TOKEN,
        "expireInSeconds": 600
    }))
}

async fn create_server(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.lock().unwrap().calls.push("CreateServer".into());
    let id = body["name"].as_str().unwrap_or("unnamed").to_string();
    ok(server_json(&id, None))
}

async fn get_server(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = query.get("Id").cloned().unwrap_or_default();
    let status = {
        let mut state = state.lock().unwrap();
        state.calls.push("GetServer".into());
        state.next_status()
    };
    if id == "missing" {
        return not_found("Server", &id);
    }
    ok(server_json(&id, status))
}

async fn destroy_server(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.lock().unwrap().calls.push("DestroyServer".into());
    let id = query.get("Id").cloned().unwrap_or_default();
    if id == "missing" {
        return not_found("Server", &id);
    }
    ok(server_json(&id, Some("DELETING".into())))
}

async fn create_application(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.lock().unwrap().calls.push("CreateApplication".into());
    ok(json!({
        "id": body["name"],
        "cluster": body["cluster"],
        "applicationCatalogItemName": body["applicationCatalogItemName"],
        "createdBy": "test@foobar.com",
        "tenant": "denvr"
    }))
}

async fn get_application_details(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = query.get("Id").cloned().unwrap_or_default();
    let status = {
        let mut state = state.lock().unwrap();
        state.calls.push("GetApplicationDetails".into());
        state.next_status()
    };
    if id == "missing" {
        return not_found("Application", &id);
    }
    ok(json!({
        "instanceDetails": {
            "id": id,
            "cluster": query.get("Cluster"),
            "status": status,
            "privateIP": "172.16.0.96",
            "dns": format!("{}.denvr.cloud", id)
        }
    }))
}

async fn destroy_application(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.lock().unwrap().calls.push("DestroyApplication".into());
    let id = query.get("Id").cloned().unwrap_or_default();
    if id == "missing" {
        return not_found("Application", &id);
    }
    ok(json!({"id": id, "cluster": query.get("Cluster")}))
}
