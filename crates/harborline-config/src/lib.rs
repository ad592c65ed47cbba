pub mod error;

pub use error::*;

use harborline_core::Credentials;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "HARBORLINE_CONFIG";
pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";
pub const REGISTRY_URL_ENV: &str = "HARBORLINE_REGISTRY_URL";
pub const REGISTRY_USERNAME_ENV: &str = "HARBORLINE_REGISTRY_USERNAME";
pub const REGISTRY_PASSWORD_ENV: &str = "HARBORLINE_REGISTRY_PASSWORD";

const CANDIDATES: [&str; 2] = ["harborline.local.yaml", "harborline.yaml"];

/// デプロイ先ごとの接続設定
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Docker デーモンのエンドポイント（例: `tcp://10.0.0.5:2375`）
    pub docker_host: Option<String>,
    /// レジストリ URL（例: `https://harbor.example.com/v2`）
    pub registry_url: Option<String>,
    pub registry_username: Option<String>,
    pub registry_password: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("docker_host", &self.docker_host)
            .field("registry_url", &self.registry_url)
            .field("registry_username", &self.registry_username)
            .field(
                "registry_password",
                &self.registry_password.as_ref().map(|_| "********"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// YAML ファイルから読み込む
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 環境変数で上書き（空文字列は無視）
    pub fn apply_env(mut self) -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(host) = read(DOCKER_HOST_ENV) {
            self.docker_host = Some(host);
        }
        if let Some(url) = read(REGISTRY_URL_ENV) {
            self.registry_url = Some(url);
        }
        if let Some(username) = read(REGISTRY_USERNAME_ENV) {
            self.registry_username = Some(username);
        }
        if let Some(password) = read(REGISTRY_PASSWORD_ENV) {
            self.registry_password = Some(password);
        }
        self
    }

    /// 設定ファイル（あれば）と環境変数から設定を組み立てる
    ///
    /// 設定ファイルが見つからなくてもエラーにはしない
    pub fn load() -> Result<Self> {
        let config = match find_config_file()? {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                tracing::debug!("No config file found, using environment only");
                Self::default()
            }
        };
        Ok(config.apply_env())
    }

    /// レジストリの認証情報（URL が未設定なら `None`）
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        let Some(url) = &self.registry_url else {
            return Ok(None);
        };
        let username = self
            .registry_username
            .as_ref()
            .ok_or(ConfigError::Missing("registry_username"))?;
        let password = self
            .registry_password
            .as_ref()
            .ok_or(ConfigError::Missing("registry_password"))?;

        Ok(Some(Credentials::new(username, password, url)))
    }
}

/// Harborline の設定ディレクトリ
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("harborline"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 HARBORLINE_CONFIG (直接パス指定)
/// 2. カレントディレクトリ: harborline.local.yaml, harborline.yaml
/// 3. ~/.config/harborline/config.yaml (グローバル設定)
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} points to a missing file: {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Some(dir) = config_dir() {
        let global_config = dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}
