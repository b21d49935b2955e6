//! Mock Denvr control plane for client integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use denvr_api::{Credentials, DenvrConfig, HttpClient};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const TOKEN: &str = "access1";

/// A request as seen by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct MockState {
    pub auth_calls: usize,
    pub requests: Vec<Recorded>,
    /// Overrides the advertised token lifetime (600 seconds when unset).
    pub token_lifetime: Option<u64>,
}

type Shared = Arc<Mutex<MockState>>;

/// Mock server bound to an ephemeral port.
pub struct MockControlPlane {
    pub addr: SocketAddr,
    pub state: Shared,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl MockControlPlane {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));

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
            .fallback(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": {"message": "Path not found"}})),
                )
            })
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

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> HttpClient {
        let config = DenvrConfig::with_server(
            self.base_url(),
            Credentials {
                username: "test@foobar.com".into(),
                password: "test.foo.bar.baz".into(),
            },
        );
        HttpClient::new(config).expect("Failed to build client")
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn auth_calls(&self) -> usize {
        self.state.lock().unwrap().auth_calls
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

fn record(state: &Shared, path: &str, query: HashMap<String, String>, body: Option<Value>) {
    state.lock().unwrap().requests.push(Recorded {
        path: path.to_string(),
        query,
        body,
    });
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

fn server_json(id: &str, status: &str) -> Value {
    json!({
        "gpu_type": "nvidia.com/A100PCIE40GB",
        "gpus": 1,
        "id": id,
        "cluster": "Msc1",
        "image": "ubuntu-22.04_LTS",
        "ip": "198.16.0.37",
        "memory": 115,
        "namespace": "denvr",
        "privateIp": "172.16.0.36",
        "status": status,
        "storage": 1700,
        "storageType": "na",
        "tenancy_name": "denvr",
        "username": "test@foobar.com",
        "vcpus": 10
    })
}

async fn authenticate(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let lifetime = {
        let mut state = state.lock().unwrap();
        state.auth_calls += 1;
        state.token_lifetime.unwrap_or(600)
    };
    if body["password"] != "test.foo.bar.baz" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"message": "Invalid user name or password"}})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "result": {
                "accessToken": TOKEN,
                "refreshToken": "refresh",
                "expireInSeconds": lifetime,
                "refreshTokenExpireInSeconds": 3600
            }
        })),
    )
}

async fn create_server(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    record(&state, "CreateServer", HashMap::new(), Some(body.clone()));
    let id = body["name"].as_str().unwrap_or("unnamed").to_string();
    (
        StatusCode::OK,
        Json(json!({"result": server_json(&id, "PENDING")})),
    )
}

async fn get_server(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    lookup_server(&state, &headers, "GetServer", query)
}

async fn destroy_server(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    lookup_server(&state, &headers, "DestroyServer", query)
}

fn lookup_server(
    state: &Shared,
    headers: &HeaderMap,
    path: &str,
    query: HashMap<String, String>,
) -> (StatusCode, Json<Value>) {
    if !authorized(headers) {
        return unauthorized();
    }
    let id = query.get("Id").cloned().unwrap_or_default();
    record(state, path, query, None);
    if id == "missing" {
        return not_found("Server", &id);
    }
    (
        StatusCode::OK,
        Json(json!({"result": server_json(&id, "ONLINE")})),
    )
}

async fn create_application(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    record(&state, "CreateApplication", HashMap::new(), Some(body.clone()));
    (
        StatusCode::OK,
        Json(json!({
            "result": {
                "id": body["name"],
                "cluster": body["cluster"],
                "applicationCatalogItemName": body["applicationCatalogItemName"],
                "createdBy": "test@foobar.com",
                "privateIP": "172.16.0.96",
                "tenant": "denvr"
            }
        })),
    )
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
    record(&state, "GetApplicationDetails", query, None);
    match id.as_str() {
        "missing" => not_found("Application", &id),
        "empty" => (StatusCode::OK, Json(json!({"result": null}))),
        _ => (
            StatusCode::OK,
            Json(json!({
                "result": {
                    "InstanceDetails": {
                        "id": id,
                        "cluster": "Msc1",
                        "status": "ONLINE",
                        "publicIP": "198.16.0.40",
                        "privateIP": "172.16.0.96",
                        "dns": "terraform-app.denvr.cloud"
                    }
                }
            })),
        ),
    }
}

async fn destroy_application(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = query.get("Id").cloned().unwrap_or_default();
    let cluster = query.get("Cluster").cloned().unwrap_or_default();
    record(&state, "DestroyApplication", query, None);
    if id == "missing" {
        return not_found("Application", &id);
    }
    (
        StatusCode::OK,
        Json(json!({"result": {"cluster": cluster, "id": id}})),
    )
}
