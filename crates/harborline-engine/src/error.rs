use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Build context not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Dockerfile not found: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Pull failed for {image}: {message}")]
    PullFailed { image: String, message: String },

    #[error("Push failed for {image}: {message}")]
    PushFailed { image: String, message: String },

    #[error("Invalid image reference: {0}")]
    InvalidReference(#[from] harborline_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            EngineError::DockerConnection(e) => {
                format!(
                    "Dockerに接続できません: {}\n\
                     \n\
                     ヒント:\n  \
                     • Dockerデーモンが起動しているか確認してください\n  \
                     • DOCKER_HOST の設定を確認してください",
                    e
                )
            }
            EngineError::BuildFailed(msg) => {
                format!(
                    "ビルドに失敗しました: {}\n\
                     \n\
                     Dockerfileの内容を確認してください。",
                    msg
                )
            }
            EngineError::PullFailed { image, message } => {
                format!(
                    "プルに失敗しました: {}\n理由: {}\n\
                     \n\
                     イメージ名とタグ、レジストリの認証情報を確認してください。",
                    image, message
                )
            }
            EngineError::PushFailed { image, message } => {
                format!(
                    "プッシュに失敗しました: {}\n理由: {}\n\
                     \n\
                     レジストリの認証情報とプロジェクトの権限を確認してください。",
                    image, message
                )
            }
            EngineError::ContextNotFound(path) => {
                format!(
                    "ビルドコンテキストが見つかりません: {}\n\
                     \n\
                     Dockerfileのパスを確認してください。",
                    path.display()
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
