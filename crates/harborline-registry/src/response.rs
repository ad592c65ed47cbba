//! レジストリ呼び出しの結果

use serde::de::DeserializeOwned;

/// レジストリ API 呼び出し1回分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    /// 期待したステータスコードが返ったかどうか
    pub success: bool,
    /// HTTP ステータス（通信自体に失敗した場合は `None`）
    pub status: Option<u16>,
    /// レスポンスボディ（通信失敗時はエラーメッセージ）
    pub body: String,
}

impl OperationResult {
    pub fn from_response(status: u16, expected: u16, body: String) -> Self {
        Self {
            success: status == expected,
            status: Some(status),
            body,
        }
    }

    pub fn transport_failure(message: String) -> Self {
        Self {
            success: false,
            status: None,
            body: message,
        }
    }

    /// 成功なら debug、失敗なら error でログ出力
    pub fn log(&self, action: &str) {
        if self.success {
            self.log_debug(action);
        } else {
            tracing::error!("Registry {} result [{}] {}", action, self.status_text(), self.body);
        }
    }

    pub fn log_debug(&self, action: &str) {
        tracing::debug!("Registry {} result [{}] {}", action, self.status_text(), self.body);
    }

    fn status_text(&self) -> String {
        self.status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "transport error".to_string())
    }

    /// ボディを JSON 配列として解析（空ボディや `null` は空配列）
    pub fn parse_list<T: DeserializeOwned>(&self, action: &str) -> Option<Vec<T>> {
        let body = self.body.trim();
        if body.is_empty() {
            return Some(Vec::new());
        }
        match serde_json::from_str::<Option<Vec<T>>>(body) {
            Ok(items) => Some(items.unwrap_or_default()),
            Err(e) => {
                tracing::error!("Registry {} returned malformed body: {}", action, e);
                None
            }
        }
    }
}
