//! レジストリ認証情報

use base64::Engine;
use std::fmt;

/// レジストリの Basic 認証情報
///
/// クライアント生成時に一度だけ作られ、クライアントの生存期間中保持される。
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// レジストリのアドレス（例: `https://harbor.example.com/v2`）
    pub registry_address: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        registry_address: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            registry_address: registry_address.into(),
        }
    }

    /// `Authorization` ヘッダーの値（`Basic base64(username:password)`）
    pub fn basic_auth_header(&self) -> String {
        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .field("registry_address", &self.registry_address)
            .finish()
    }
}
