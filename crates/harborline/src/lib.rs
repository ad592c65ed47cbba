//! Harborline
//!
//! デプロイ先ごとに1つ作る複合クライアント。コンテナエンジン（build / push など）と
//! Harbor レジストリ（存在確認やラベル管理）の2つのクライアントを束ねます。
//! 2つのクライアントは互いに呼び合わず、呼び出し側が必要に応じて交互に使います。

pub use harborline_config::ClientConfig;
pub use harborline_core::{
    Credentials, ImageReference, Label, LabelScope, RegistryCoordinates, Tag,
};
pub use harborline_engine::{EngineClient, EngineError, ProgressSink};
pub use harborline_registry::RegistryClient;

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error(transparent)]
    Engine(#[from] harborline_engine::EngineError),

    #[error(transparent)]
    Registry(#[from] harborline_registry::RegistryError),

    #[error(transparent)]
    Config(#[from] harborline_config::ConfigError),
}

pub type Result<T> = std::result::Result<T, OpsError>;

/// エンジンとレジストリの複合クライアント
#[derive(Clone)]
pub struct ImageOps {
    engine: EngineClient,
    registry: Option<RegistryClient>,
}

impl ImageOps {
    /// Docker エンドポイントとレジストリ認証情報から作成
    ///
    /// 認証情報がない場合はレジストリ操作を持たない
    pub fn new(docker_host: Option<&str>, credentials: Option<Credentials>) -> Result<Self> {
        let mut engine = EngineClient::connect(docker_host)?;
        let registry = match credentials {
            Some(credentials) => {
                engine = engine.with_credentials(credentials.clone());
                Some(RegistryClient::with_credentials(credentials)?)
            }
            None => None,
        };

        Ok(Self { engine, registry })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.docker_host.as_deref(), config.credentials()?)
    }

    /// 進捗イベントの受け取り先を差し替える
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.engine = self.engine.with_sink(sink);
        self
    }

    pub fn engine(&self) -> &EngineClient {
        &self.engine
    }

    pub fn registry(&self) -> Option<&RegistryClient> {
        self.registry.as_ref()
    }
}
