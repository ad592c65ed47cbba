//! コンテナエンジンクライアント
//!
//! ローカルの Docker デーモンに対して build / pull / push / tag / list / remove を行います。
//! ストリーム系の操作は内部でイベントを消費し、終端の結果だけを返します。

use crate::auth::docker_credentials;
use crate::context::{BuildContext, ContextBuilder, DOCKERFILE_NAME};
use crate::error::{EngineError, Result};
use crate::progress::{ProgressEvent, ProgressSink, TracingSink};
use crate::wait::await_bounded;
use bollard::auth::DockerCredentials;
use bollard::errors::Error as BollardError;
use bollard::models::{BuildInfo, ImageSummary};
use bollard::query_parameters::{
    CreateImageOptions, ListImagesOptions, PushImageOptions, RemoveImageOptions, TagImageOptions,
};
use bollard::{API_DEFAULT_VERSION, Docker};
use futures_util::stream::StreamExt;
use harborline_core::{Credentials, ImageReference};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Docker デーモンへの接続タイムアウト（秒）
const CONNECT_TIMEOUT_SECS: u64 = 120;

/// ローカルのコンテナエンジンを操作するクライアント
#[derive(Clone)]
pub struct EngineClient {
    docker: Docker,
    credentials: Option<Credentials>,
    sink: Arc<dyn ProgressSink>,
}

impl EngineClient {
    /// 既存の Docker 接続から作成
    pub fn new(docker: Docker) -> Self {
        Self {
            docker,
            credentials: None,
            sink: Arc::new(TracingSink),
        }
    }

    /// エンドポイントを指定して接続
    ///
    /// - `unix://...` : UNIX ソケット
    /// - `tcp://...` / `http://...` : HTTP
    /// - 未指定: ローカルのデフォルト（`DOCKER_HOST` を尊重）
    pub fn connect(host: Option<&str>) -> Result<Self> {
        let docker = match host.map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) if host.starts_with("unix://") => {
                Docker::connect_with_socket(host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)?
            }
            Some(host) => {
                Docker::connect_with_http(host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)?
            }
            None => Docker::connect_with_local_defaults()?,
        };
        tracing::debug!("Docker client created for {}", host.unwrap_or("local defaults"));
        Ok(Self::new(docker))
    }

    /// 認証付き pull / push で使う認証情報を設定
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// 進捗イベントの受け取り先を設定
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn docker(&self) -> &Docker {
        &self.docker
    }

    /// デーモンへの疎通確認
    pub async fn ping(&self) -> Result<()> {
        self.docker.ping().await?;
        Ok(())
    }

    fn auth_for(&self, use_auth: bool) -> Option<DockerCredentials> {
        if !use_auth {
            return None;
        }
        match &self.credentials {
            Some(credentials) => Some(docker_credentials(credentials)),
            None => {
                tracing::debug!("Authentication requested but no registry credentials configured");
                None
            }
        }
    }

    /// イメージを pull（完了まで待機）
    pub async fn pull(&self, image: &str, use_auth: bool) -> Result<()> {
        self.pull_inner(image, use_auth, None).await
    }

    /// イメージを pull（最大 `timeout` まで待機）
    pub async fn pull_with_timeout(
        &self,
        image: &str,
        use_auth: bool,
        timeout: Duration,
    ) -> Result<()> {
        self.pull_inner(image, use_auth, Some(timeout)).await
    }

    async fn pull_inner(
        &self,
        image: &str,
        use_auth: bool,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let reference = ImageReference::parse(image)?;
        let credentials = self.auth_for(use_auth);
        let docker = self.docker.clone();
        let sink = self.sink.clone();

        tracing::debug!("Pulling image: {}", reference);

        let operation = async move {
            let options = CreateImageOptions {
                from_image: Some(reference.repository.clone()),
                tag: Some(reference.tag.clone()),
                ..Default::default()
            };

            let mut stream = docker.create_image(Some(options), None, credentials);

            while let Some(result) = stream.next().await {
                match result {
                    Ok(info) => sink.on_event(&ProgressEvent::from_pull(&info)),
                    Err(e) => {
                        tracing::error!("Pull image error: {}: {}", reference, e);
                        return Err(classify(e, |message| EngineError::PullFailed {
                            image: reference.to_string(),
                            message,
                        }));
                    }
                }
            }

            tracing::debug!("Pulled image: {}", reference);
            Ok(())
        };

        await_bounded("Pull image", operation, timeout).await
    }

    /// イメージを push（完了まで待機）
    pub async fn push(&self, image: &str, use_auth: bool) -> Result<()> {
        self.push_inner(image, use_auth, None).await
    }

    /// イメージを push（最大 `timeout` まで待機）
    pub async fn push_with_timeout(
        &self,
        image: &str,
        use_auth: bool,
        timeout: Duration,
    ) -> Result<()> {
        self.push_inner(image, use_auth, Some(timeout)).await
    }

    async fn push_inner(
        &self,
        image: &str,
        use_auth: bool,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let reference = ImageReference::parse(image)?;
        let credentials = self.auth_for(use_auth);
        let docker = self.docker.clone();
        let sink = self.sink.clone();

        tracing::debug!("Pushing image: {}", reference);

        let operation = async move {
            let options = PushImageOptions {
                tag: Some(reference.tag.clone()),
                ..Default::default()
            };

            let mut stream = docker.push_image(&reference.repository, Some(options), credentials);

            while let Some(result) = stream.next().await {
                match result {
                    Ok(info) => sink.on_event(&ProgressEvent::from_push(&info)),
                    Err(e) => {
                        tracing::error!("Push image error: {}: {}", reference, e);
                        return Err(classify(e, |message| EngineError::PushFailed {
                            image: reference.to_string(),
                            message,
                        }));
                    }
                }
            }

            tracing::debug!("Pushed image: {}", reference);
            Ok(())
        };

        await_bounded("Push image", operation, timeout).await
    }

    /// 既存イメージに新しいタグを付ける（レイヤーの転送は行わない）
    ///
    /// どちらの参照もタグ省略時は `latest`
    pub async fn copy(&self, source: &str, destination: &str) -> Result<()> {
        let source = ImageReference::parse(source)?;
        let destination = ImageReference::parse(destination)?;

        let options = TagImageOptions {
            repo: Some(destination.repository.clone()),
            tag: Some(destination.tag.clone()),
            ..Default::default()
        };

        self.docker
            .tag_image(&source.to_string(), Some(options))
            .await?;

        tracing::debug!("Tagged image {} as {}", source, destination);
        Ok(())
    }

    /// ローカルのイメージ一覧
    ///
    /// `filter` を指定した場合はエンジンの `reference` フィルタで絞り込む
    pub async fn list_images(&self, filter: Option<&str>) -> Result<Vec<ImageSummary>> {
        let filters = filter.map(|name| {
            let mut filters = HashMap::new();
            filters.insert("reference".to_string(), vec![name.to_string()]);
            filters
        });

        let options = ListImagesOptions {
            all: false,
            filters,
            ..Default::default()
        };

        let images = self.docker.list_images(Some(options)).await?;
        tracing::debug!("Listed {} image(s) (filter: {:?})", images.len(), filter);
        Ok(images)
    }

    /// イメージをビルドし、イメージIDを返す
    ///
    /// `dockerfile_path` はビルドコンテキストのディレクトリ、または Dockerfile そのもの
    pub async fn build(
        &self,
        image_name: &str,
        dockerfile_path: impl AsRef<Path>,
        build_args: Option<&HashMap<String, String>>,
    ) -> Result<String> {
        let context = BuildContext::resolve(dockerfile_path.as_ref())?;
        let context_data = ContextBuilder::create_context(&context)?;

        tracing::info!("Building image: {}", image_name);

        let build_args_refs: HashMap<&str, &str> = build_args
            .map(|args| {
                args.iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if !build_args_refs.is_empty() {
            tracing::debug!("Build args: {:?}", build_args_refs.keys().collect::<Vec<_>>());
        }

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: DOCKERFILE_NAME,
            t: image_name,
            buildargs: build_args_refs,
            rm: true,
            forcerm: true,
            ..Default::default()
        };

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        let mut image_id: Option<String> = None;

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(output) => {
                    // 最初に報告されたID（aux の完全なID）を採用する
                    if let Some(id) = self.handle_build_output(output)? {
                        image_id.get_or_insert(id);
                    }
                }
                Err(e) => {
                    tracing::error!("Build image error: {}: {}", image_name, e);
                    return Err(classify(e, EngineError::BuildFailed));
                }
            }
        }

        let image_id = image_id.ok_or_else(|| {
            EngineError::BuildFailed(format!("no image id reported for {}", image_name))
        })?;

        tracing::info!("Successfully built: {} ({})", image_name, image_id);
        Ok(image_id)
    }

    /// ビルド出力の処理（イメージIDが含まれていれば返す）
    fn handle_build_output(&self, output: BuildInfo) -> Result<Option<String>> {
        // error 付きの行はストリーム側でエラーになるため、ここに来るのは error_detail のみ
        if let Some(error_detail) = output.error_detail {
            let error_msg = error_detail
                .message
                .unwrap_or_else(|| "Unknown build error".to_string());
            return Err(EngineError::BuildFailed(error_msg));
        }

        let event = ProgressEvent::from_build(&output);
        if !event.is_empty() {
            self.sink.on_event(&event);
        }

        if let Some(id) = output.aux.and_then(|aux| aux.id) {
            return Ok(Some(id));
        }

        Ok(output.stream.as_deref().and_then(parse_built_id))
    }

    /// 名前でイメージを削除
    ///
    /// 名前で絞り込んだ最初のイメージを強制削除する。見つからなければ何もしない。
    pub async fn remove_image(&self, image_name: &str) -> Result<()> {
        let images = self.list_images(Some(image_name)).await?;
        match images.first() {
            Some(image) => self.remove_image_by_id(&image.id).await,
            None => {
                tracing::debug!("No local image matches {}, nothing to remove", image_name);
                Ok(())
            }
        }
    }

    /// IDでイメージを強制削除
    pub async fn remove_image_by_id(&self, image_id: &str) -> Result<()> {
        let options = RemoveImageOptions {
            force: true,
            ..Default::default()
        };

        let results = self
            .docker
            .remove_image(image_id, Some(options), None)
            .await?;

        for result in results {
            if let Some(untagged) = result.untagged {
                tracing::debug!("Untagged: {}", untagged);
            }
            if let Some(deleted) = result.deleted {
                tracing::debug!("Deleted: {}", deleted);
            }
        }
        Ok(())
    }
}

/// デーモンが報告した失敗は操作ごとのエラーに、それ以外は接続エラーに振り分ける
fn classify(
    error: BollardError,
    reported: impl FnOnce(String) -> EngineError,
) -> EngineError {
    match error {
        BollardError::DockerStreamError { error } => reported(error),
        BollardError::DockerResponseServerError { message, .. } => reported(message),
        other => EngineError::DockerConnection(other),
    }
}

/// `Successfully built <id>` からイメージIDを取り出す（古いビルダー向け）
fn parse_built_id(line: &str) -> Option<String> {
    line.trim()
        .strip_prefix("Successfully built ")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}
