//! レジストリのプロジェクト

use serde::{Deserialize, Serialize};

/// `GET /projects` の要素（必要なフィールドのみ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub project_id: Option<i64>,
    pub name: String,
}
