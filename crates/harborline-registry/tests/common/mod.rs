//! Harbor 管理 API のインプロセスモック

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "Harbor12345";

#[derive(Default)]
pub struct MockState {
    /// (project, repository, tag)
    pub artifacts: HashSet<(String, String, String)>,
    /// id, name, scope, project_id
    pub labels: Vec<Value>,
    pub projects: Vec<Value>,
    /// (namespace/project) -> tags
    pub tags: HashMap<String, Value>,
    /// POST / PUT で受け取ったボディ
    pub received: Vec<Value>,
    /// GET /labels で受け取ったクエリ
    pub label_queries: Vec<HashMap<String, String>>,
}

pub type SharedState = Arc<Mutex<MockState>>;

pub struct MockRegistry {
    pub state: SharedState,
    /// クライアントに渡すレジストリ URL（`/v2` 付き）
    pub registry_url: String,
}

impl MockRegistry {
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState::default()));

        let api = Router::new()
            .route(
                "/projects/{project}/repositories/{repository}/artifacts/{reference}/tags",
                get(list_artifact_tags),
            )
            .route(
                "/projects/{project}/repositories/{repository}/artifacts/{reference}/tags/{tag}",
                delete(delete_artifact_tag),
            )
            .route("/labels", get(list_labels).post(create_label))
            .route("/labels/{id}", put(update_label))
            .route("/projects", get(list_projects))
            .route("/repositories/{namespace}/{project}/tags", get(list_tags));

        let app = Router::new()
            .nest("/api/v2.0", api)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            registry_url: format!("http://{}/v2", addr),
        }
    }

    pub fn add_artifact(&self, project: &str, repository: &str, tag: &str) {
        self.state.lock().unwrap().artifacts.insert((
            project.to_string(),
            repository.to_string(),
            tag.to_string(),
        ));
    }

    pub fn add_label(&self, label: Value) {
        self.state.lock().unwrap().labels.push(label);
    }

    pub fn add_project(&self, id: i64, name: &str) {
        self.state
            .lock()
            .unwrap()
            .projects
            .push(json!({ "project_id": id, "name": name }));
    }

    pub fn set_tags(&self, namespace: &str, project: &str, tags: Value) {
        self.state
            .lock()
            .unwrap()
            .tags
            .insert(format!("{}/{}", namespace, project), tags);
    }

    pub fn received(&self) -> Vec<Value> {
        self.state.lock().unwrap().received.clone()
    }

    pub fn label_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().label_queries.clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = "Basic YWRtaW46SGFyYm9yMTIzNDU="; // admin:Harbor12345
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
        && headers
            .get(header::ACCEPT)
            .is_some_and(|v| v == "application/json")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "errors": [{ "code": "UNAUTHORIZED", "message": "unauthorized" }] })),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "errors": [{ "code": "NOT_FOUND", "message": message }] })),
    )
        .into_response()
}

async fn list_artifact_tags(
    State(state): State<SharedState>,
    Path((project, repository, reference)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    if state
        .artifacts
        .contains(&(project, repository, reference.clone()))
    {
        Json(json!([{ "id": 1, "name": reference, "push_time": "2021-03-04T05:06:07Z" }]))
            .into_response()
    } else {
        not_found("artifact not found")
    }
}

async fn delete_artifact_tag(
    State(state): State<SharedState>,
    Path((project, repository, reference, tag)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if reference != tag {
        return not_found("tag not attached to artifact");
    }
    let mut state = state.lock().unwrap();
    if state.artifacts.remove(&(project, repository, tag)) {
        StatusCode::OK.into_response()
    } else {
        not_found("tag not found")
    }
}

async fn list_labels(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    state.label_queries.push(query.clone());

    let matches: Vec<Value> = state
        .labels
        .iter()
        .filter(|label| {
            query
                .get("name")
                .is_none_or(|name| label["name"].as_str() == Some(name.as_str()))
                && query
                    .get("scope")
                    .is_none_or(|scope| label["scope"].as_str() == Some(scope.as_str()))
        })
        .cloned()
        .collect();
    Json(Value::Array(matches)).into_response()
}

async fn create_label(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    state.received.push(body.clone());
    state.labels.push(body);
    StatusCode::CREATED.into_response()
}

async fn update_label(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    state.received.push(body);
    if state.labels.iter().any(|label| label["id"].as_i64() == Some(id)) {
        StatusCode::OK.into_response()
    } else {
        not_found("label not found")
    }
}

async fn list_projects(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    // Harbor の name 検索は部分一致
    let name = query.get("name").cloned().unwrap_or_default();
    let matches: Vec<Value> = state
        .projects
        .iter()
        .filter(|project| {
            project["name"]
                .as_str()
                .is_some_and(|n| n.contains(name.as_str()))
        })
        .cloned()
        .collect();
    Json(Value::Array(matches)).into_response()
}

async fn list_tags(
    State(state): State<SharedState>,
    Path((namespace, project)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    match state.tags.get(&format!("{}/{}", namespace, project)) {
        Some(tags) => Json(tags.clone()).into_response(),
        None => not_found("repository not found"),
    }
}
