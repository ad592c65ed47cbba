//! Docker Engine API のインプロセスモック

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use harborline_engine::EngineClient;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BUILT_ID: &str = "sha256:5f1c0ad2b8e4";

/// モックが受け取ったリクエスト1件
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// API バージョンを除いたパス（例: `/images/create`）
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
}

impl Recorded {
    /// `X-Registry-Auth` をデコードしたもの
    pub fn registry_auth(&self) -> Option<Value> {
        let raw = self.headers.get("X-Registry-Auth")?.to_str().ok()?;
        let decoded = base64::engine::general_purpose::STANDARD.decode(raw).ok()?;
        serde_json::from_slice(&decoded).ok()
    }
}

#[derive(Default)]
pub struct MockState {
    pub requests: Vec<Recorded>,
    /// `GET /images/json` で返す一覧
    pub images: Vec<Value>,
    /// 設定するとストリーム系の操作が `{"error": ...}` を流す
    pub stream_error: Option<String>,
}

pub type SharedState = Arc<Mutex<MockState>>;

pub struct MockDaemon {
    pub state: SharedState,
    /// bollard に渡すエンドポイント（`tcp://127.0.0.1:port`）
    pub host: String,
}

impl MockDaemon {
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState::default()));

        // イメージ名に `/` や `:` が入るため、ルーティングは自前で行う
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            host: format!("tcp://{}", addr),
        }
    }

    pub fn client(&self) -> EngineClient {
        EngineClient::connect(Some(&self.host)).unwrap()
    }

    pub fn add_image(&self, id: &str, repo_tags: &[&str]) {
        self.state.lock().unwrap().images.push(json!({
            "Id": id,
            "ParentId": "",
            "RepoTags": repo_tags,
            "RepoDigests": [],
            "Created": 1_700_000_000,
            "Size": 1024,
            "SharedSize": -1,
            "Labels": {},
            "Containers": 0
        }));
    }

    pub fn fail_streams_with(&self, message: &str) {
        self.state.lock().unwrap().stream_error = Some(message.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// 指定メソッド・パスのリクエストだけを返す
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

/// `/v1.49/images/create` -> `/images/create`
fn strip_version(path: &str) -> &str {
    match path.strip_prefix("/v1.") {
        Some(rest) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/"),
        None => path,
    }
}

fn json_lines(lines: &[Value]) -> Response {
    let body: String = lines.iter().map(|line| format!("{}\n", line)).collect();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

fn json_value(status: StatusCode, value: Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        value.to_string(),
    )
        .into_response()
}

async fn handle(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    _body: Bytes,
) -> Response {
    let path = strip_version(uri.path()).to_string();
    let mut state = state.lock().unwrap();
    state.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query,
        headers,
    });

    let stream_error = state
        .stream_error
        .clone()
        .map(|error| json!({ "error": error, "errorDetail": { "message": error } }));

    match (method, path.as_str()) {
        (Method::GET, "/_ping") => (StatusCode::OK, "OK").into_response(),
        (Method::POST, "/build") => match stream_error {
            Some(error) => json_lines(&[json!({ "stream": "Step 1/2 : FROM scratch\n" }), error]),
            None => json_lines(&[
                json!({ "stream": "Step 1/2 : FROM scratch\n" }),
                json!({ "stream": "Step 2/2 : LABEL harborline.test=mock\n" }),
                json!({ "aux": { "ID": BUILT_ID } }),
                json!({ "stream": "Successfully built 5f1c0ad2b8e4\n" }),
            ]),
        },
        (Method::POST, "/images/create") => match stream_error {
            Some(error) => json_lines(&[error]),
            None => json_lines(&[
                json!({ "status": "Pulling fs layer", "id": "a1b2c3" }),
                json!({ "status": "Download complete", "id": "a1b2c3" }),
            ]),
        },
        (Method::GET, "/images/json") => json_value(StatusCode::OK, Value::Array(state.images.clone())),
        (Method::POST, p) if p.ends_with("/push") => match stream_error {
            Some(error) => json_lines(&[json!({ "status": "Preparing", "id": "a1b2c3" }), error]),
            None => json_lines(&[
                json!({ "status": "Pushing", "id": "a1b2c3" }),
                json!({ "status": "Pushed", "id": "a1b2c3" }),
            ]),
        },
        (Method::POST, p) if p.ends_with("/tag") => StatusCode::CREATED.into_response(),
        (Method::DELETE, p) if p.starts_with("/images/") => {
            let id = p.trim_start_matches("/images/").to_string();
            let before = state.images.len();
            state.images.retain(|image| image["Id"].as_str() != Some(id.as_str()));
            if state.images.len() == before {
                json_value(
                    StatusCode::NOT_FOUND,
                    json!({ "message": format!("No such image: {}", id) }),
                )
            } else {
                json_value(StatusCode::OK, json!([{ "Deleted": id }]))
            }
        }
        _ => json_value(
            StatusCode::NOT_FOUND,
            json!({ "message": "page not found" }),
        ),
    }
}
