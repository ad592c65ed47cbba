//! ストリーム進捗の通知
//!
//! build / pull / push のストリームイベントを1行ずつ診断出力に流します。

use bollard::models::{BuildInfo, CreateImageInfo, PushImageInfo};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Duration;

/// 進捗を発生させた操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Build,
    Pull,
    Push,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Build => "build",
            Operation::Pull => "pull",
            Operation::Push => "push",
        }
    }
}

/// エンジンから届いた進捗イベント1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub operation: Operation,
    /// レイヤーIDなど
    pub id: Option<String>,
    pub status: Option<String>,
    pub progress: Option<String>,
    /// build の出力行
    pub stream: Option<String>,
}

impl ProgressEvent {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            id: None,
            status: None,
            progress: None,
            stream: None,
        }
    }

    pub fn from_build(info: &BuildInfo) -> Self {
        Self {
            id: info.id.clone(),
            status: info.status.clone(),
            progress: info.progress.clone(),
            stream: info
                .stream
                .as_deref()
                .map(|s| s.trim_end().to_string())
                .filter(|s| !s.is_empty()),
            ..Self::new(Operation::Build)
        }
    }

    pub fn from_pull(info: &CreateImageInfo) -> Self {
        Self {
            id: info.id.clone(),
            status: info.status.clone(),
            progress: info.progress.clone(),
            ..Self::new(Operation::Pull)
        }
    }

    pub fn from_push(info: &PushImageInfo) -> Self {
        Self {
            status: info.status.clone(),
            progress: info.progress.clone(),
            ..Self::new(Operation::Push)
        }
    }

    /// 表示する内容がない（空行や aux のみ）イベント
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.stream.is_none()
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(stream) = &self.stream {
            return write!(f, "{}", stream);
        }
        if let Some(id) = &self.id {
            write!(f, "{}: ", id)?;
        }
        write!(f, "{}", self.status.as_deref().unwrap_or(""))?;
        if let Some(progress) = &self.progress {
            write!(f, " {}", progress)?;
        }
        Ok(())
    }
}

/// 進捗イベントの受け取り先
///
/// バッファリングせず、イベントが届くたびに呼ばれる。
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// tracing の debug レベルに流すデフォルトの受け取り先
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_event(&self, event: &ProgressEvent) {
        tracing::debug!(operation = event.operation.as_str(), "{}", event);
    }
}

/// 端末にスピナーを表示する受け取り先
pub struct SpinnerSink {
    progress_bar: ProgressBar,
}

impl SpinnerSink {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(message.to_string());

        Self { progress_bar: pb }
    }

    pub fn finish(&self, message: &str) {
        self.progress_bar.finish_with_message(message.to_string());
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .abandon_with_message(format!("failed: {}", error));
    }
}

impl ProgressSink for SpinnerSink {
    fn on_event(&self, event: &ProgressEvent) {
        // build の出力行はスピナーの上に流す
        if let Some(stream) = &event.stream {
            self.progress_bar.println(stream);
        } else {
            self.progress_bar.set_message(event.to_string());
        }
    }
}
