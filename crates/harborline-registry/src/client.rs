//! Harbor management API client

use crate::error::{RegistryError, Result};
use crate::response::OperationResult;
use harborline_core::{Credentials, Label, LabelScope, Project, RegistryCoordinates, Tag};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use std::time::Duration;

const API_ROOT_SUFFIX: &str = "api/v2.0";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Harbor レジストリの管理 API クライアント
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    api_url: String,
    credentials: Credentials,
}

/// レジストリ URL から管理 API のルートを導出
///
/// - `https://harbor.example.com/v2` -> `https://harbor.example.com/api/v2.0`
/// - `https://harbor.example.com` -> `https://harbor.example.com/api/v2.0`
pub fn api_root(registry_url: &str) -> Result<String> {
    let url = registry_url.trim().trim_end_matches('/');
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| RegistryError::InvalidUrl(registry_url.to_string()))?;
    if rest.is_empty() {
        return Err(RegistryError::InvalidUrl(registry_url.to_string()));
    }

    if url.ends_with(&format!("/{}", API_ROOT_SUFFIX)) {
        return Ok(url.to_string());
    }

    let root = match rest.rsplit_once('/') {
        // 最後のパスセグメントを置き換える
        Some((base, _)) => format!("{}://{}/{}", scheme, base, API_ROOT_SUFFIX),
        None => format!("{}://{}/{}", scheme, rest, API_ROOT_SUFFIX),
    };
    Ok(root)
}

impl RegistryClient {
    pub fn new(registry_url: &str, username: &str, password: &str) -> Result<Self> {
        Self::with_credentials(Credentials::new(username, password, registry_url))
    }

    pub fn with_credentials(credentials: Credentials) -> Result<Self> {
        let api_url = api_root(&credentials.registry_address)?;
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        tracing::debug!("Registry API root: {}", api_url);

        Ok(Self {
            client,
            api_url,
            credentials,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.credentials.basic_auth_header()) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .headers(self.headers())
    }

    /// リクエストを送信し、結果をまとめる
    async fn execute(&self, request: RequestBuilder, expected: StatusCode) -> OperationResult {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return OperationResult::transport_failure(e.to_string()),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => OperationResult::from_response(status, expected.as_u16(), body),
            Err(e) => OperationResult::transport_failure(e.to_string()),
        }
    }

    fn coordinates(image: &str, action: &str) -> Option<RegistryCoordinates> {
        match RegistryCoordinates::parse(image) {
            Ok(coords) => Some(coords),
            Err(e) => {
                tracing::error!("Registry {} skipped: {}", action, e);
                None
            }
        }
    }

    /// イメージ（タグ）がレジストリに存在するか
    pub async fn exists(&self, image: &str) -> bool {
        let Some(coords) = Self::coordinates(image, "exist image") else {
            return false;
        };

        let path = format!("{}/tags", coords.artifact_path());
        let result = self
            .execute(self.request(Method::GET, &path), StatusCode::OK)
            .await;

        // 存在しないのは通常の流れなので debug で出す（通信失敗は error）
        if result.status.is_some() {
            result.log_debug("exist image");
        } else {
            result.log("exist image");
        }
        result.success
    }

    /// レジストリからタグを削除
    pub async fn remove_tag(&self, image: &str) -> bool {
        let Some(coords) = Self::coordinates(image, "remove image") else {
            return false;
        };

        let path = format!("{}/tags/{}", coords.artifact_path(), coords.tag);
        let result = self
            .execute(self.request(Method::DELETE, &path), StatusCode::OK)
            .await;

        result.log("remove image");
        result.success
    }

    /// 名前でラベルを取得
    ///
    /// `project_id` が未指定または0ならグローバルスコープを検索する
    pub async fn get_label_by_name(&self, label_name: &str, project_id: Option<i64>) -> Option<Label> {
        let mut query = vec![("name", label_name.to_string())];
        match LabelScope::for_project(project_id) {
            LabelScope::Global => query.push(("scope", LabelScope::Global.as_str().to_string())),
            LabelScope::Project => {
                query.push(("scope", LabelScope::Project.as_str().to_string()));
                query.push(("project_id", project_id.unwrap_or_default().to_string()));
            }
        }

        let request = self.request(Method::GET, "/labels").query(&query);
        let result = self.execute(request, StatusCode::OK).await;
        result.log("get labels");
        if !result.success {
            return None;
        }

        result
            .parse_list::<Label>("get labels")?
            .into_iter()
            .next()
    }

    /// ラベルを作成
    ///
    /// scope は project_id から導出され、呼び出し側の指定は上書きされる
    pub async fn add_label(&self, mut label: Label) -> bool {
        label.apply_scope();

        let request = self.request(Method::POST, "/labels").json(&label);
        let result = self.execute(request, StatusCode::CREATED).await;
        result.log("add label");
        result.success
    }

    /// ラベルを更新
    pub async fn update_label(&self, label_id: i64, label: &Label) -> bool {
        let path = format!("/labels/{}", label_id);
        let request = self.request(Method::PUT, &path).json(label);
        let result = self.execute(request, StatusCode::OK).await;
        result.log("update label");
        result.success
    }

    /// プロジェクト名からIDを取得
    ///
    /// サーバー側の名前検索は部分一致のため、完全一致を再確認する
    pub async fn get_project_id_by_name(&self, project_name: &str) -> Option<i64> {
        let request = self
            .request(Method::GET, "/projects")
            .query(&[("name", project_name)]);
        let result = self.execute(request, StatusCode::OK).await;
        result.log("get projects");
        if !result.success {
            return None;
        }

        let project_id = result
            .parse_list::<Project>("get projects")?
            .into_iter()
            .filter(|project| project.name == project_name)
            .find_map(|project| project.project_id);

        if project_id.is_none() {
            tracing::debug!("No project named exactly '{}'", project_name);
        }
        project_id
    }

    /// リポジトリのタグ一覧を取得
    pub async fn get_tags(&self, namespace: &str, project_name: &str) -> Option<Vec<Tag>> {
        let path = format!("/repositories/{}/{}/tags", namespace, project_name);
        let result = self
            .execute(self.request(Method::GET, &path), StatusCode::OK)
            .await;
        result.log("get tags");
        if !result.success {
            return None;
        }

        result.parse_list::<Tag>("get tags")
    }
}
