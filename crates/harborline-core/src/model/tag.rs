//! レジストリのタグ

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// レジストリ上のタグ（読み取り専用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, alias = "push_time")]
    pub created: Option<DateTime<Utc>>,
}
