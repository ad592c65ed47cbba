//! レジストリ認証処理
//!
//! 設定済みの認証情報を Bollard の DockerCredentials に変換します。

use bollard::auth::DockerCredentials;
use harborline_core::Credentials;

/// 認証情報を DockerCredentials に変換
pub fn docker_credentials(credentials: &Credentials) -> DockerCredentials {
    DockerCredentials {
        username: Some(credentials.username.clone()),
        password: Some(credentials.password.clone()),
        serveraddress: Some(credentials.registry_address.clone()),
        ..Default::default()
    }
}
