//! イメージ参照とレジストリ座標

use crate::error::{CoreError, Result};
use std::fmt;

/// タグ省略時のデフォルト
pub const DEFAULT_TAG: &str = "latest";

/// `repository[:tag]` 形式のイメージ参照
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// イメージ名とタグを分離
    ///
    /// # Examples
    /// - `harbor.example.com/proj/app:v1.0` -> `("harbor.example.com/proj/app", "v1.0")`
    /// - `proj/app` -> `("proj/app", "latest")`
    /// - `localhost:5000/app` -> `("localhost:5000/app", "latest")`
    pub fn parse(image: &str) -> Result<Self> {
        let image = image.trim();
        if image.is_empty() {
            return Err(CoreError::invalid_reference(image, "empty image name"));
        }

        // 最後の : の後ろに / があればレジストリのポート番号
        let (repository, tag) = match image.rsplit_once(':') {
            Some((repository, tag)) if !tag.contains('/') => (repository, tag),
            _ => (image, DEFAULT_TAG),
        };

        if repository.is_empty() {
            return Err(CoreError::invalid_reference(image, "missing repository"));
        }
        let tag = if tag.is_empty() { DEFAULT_TAG } else { tag };

        Ok(Self::new(repository, tag))
    }

    /// リポジトリ名の先頭セグメントがレジストリホストかどうか
    pub fn registry_host(&self) -> Option<&str> {
        let (first, _) = self.repository.split_once('/')?;
        if first.contains('.') || first.contains(':') || first == "localhost" {
            Some(first)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

impl std::str::FromStr for ImageReference {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Harbor API 上の project / repository / tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCoordinates {
    pub project: String,
    pub repository: String,
    pub tag: String,
}

impl RegistryCoordinates {
    /// イメージ参照からレジストリ座標を導出
    ///
    /// 3セグメント（`host/project/repo`）の場合は先頭のホストを取り除く。
    /// 4セグメント以上でも先頭がホスト形式なら同様に取り除く。
    pub fn from_reference(reference: &ImageReference) -> Result<Self> {
        let segments = reference.repository.split('/').count();
        let path = if segments == 3 || (segments > 3 && reference.registry_host().is_some()) {
            reference
                .repository
                .split_once('/')
                .map(|(_, rest)| rest)
                .unwrap_or(&reference.repository)
        } else {
            reference.repository.as_str()
        };

        let (project, repository) = path.split_once('/').ok_or_else(|| {
            CoreError::invalid_reference(&reference.to_string(), "expected <project>/<repository>")
        })?;

        if project.is_empty() || repository.is_empty() {
            return Err(CoreError::invalid_reference(
                &reference.to_string(),
                "empty project or repository segment",
            ));
        }

        Ok(Self {
            project: project.to_string(),
            repository: repository.to_string(),
            tag: reference.tag.clone(),
        })
    }

    pub fn parse(image: &str) -> Result<Self> {
        Self::from_reference(&ImageReference::parse(image)?)
    }

    /// API パスに埋め込むリポジトリ名
    ///
    /// Harbor はネストしたリポジトリ名の `/` を二重エンコード（`%252F`）で受け付ける
    pub fn repository_path(&self) -> String {
        self.repository.replace('/', "%252F")
    }

    /// `/projects/{project}/repositories/{repository}/artifacts/{tag}`
    pub fn artifact_path(&self) -> String {
        format!(
            "/projects/{}/repositories/{}/artifacts/{}",
            self.project,
            self.repository_path(),
            self.tag
        )
    }
}
