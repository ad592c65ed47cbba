use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("無効なイメージ参照です: '{reference}'\n理由: {message}")]
    InvalidReference { reference: String, message: String },
}

impl CoreError {
    pub(crate) fn invalid_reference(reference: &str, message: impl Into<String>) -> Self {
        CoreError::InvalidReference {
            reference: reference.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
