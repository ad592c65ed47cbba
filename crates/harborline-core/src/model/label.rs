//! レジストリのラベル

use serde::{Deserialize, Serialize};

/// ラベルのスコープ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelScope {
    /// システム全体
    #[serde(rename = "g")]
    Global,
    /// プロジェクト単位
    #[serde(rename = "p")]
    Project,
}

impl LabelScope {
    /// project_id から導出する（未指定または0ならグローバル）
    pub fn for_project(project_id: Option<i64>) -> Self {
        match project_id {
            None | Some(0) => LabelScope::Global,
            Some(_) => LabelScope::Project,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelScope::Global => "g",
            LabelScope::Project => "p",
        }
    }
}

/// Harbor のラベル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<LabelScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_project_id(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// scope を project_id から設定し直す
    ///
    /// 呼び出し側が指定した scope は無視される。
    pub fn apply_scope(&mut self) {
        self.scope = Some(LabelScope::for_project(self.project_id));
    }
}
