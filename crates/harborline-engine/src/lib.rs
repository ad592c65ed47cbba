//! Harborline container engine client
//!
//! This crate drives a local Docker-compatible engine through bollard:
//! image build, pull, push, tag copy, listing and removal. Long-running
//! streamed operations are consumed internally and exposed as plain
//! `async` calls with an optional bounded wait.

pub mod auth;
pub mod client;
pub mod context;
pub mod error;
pub mod progress;
pub mod wait;

pub use auth::docker_credentials;
pub use client::EngineClient;
pub use context::{BuildContext, ContextBuilder};
pub use error::{EngineError, Result};
pub use progress::{Operation, ProgressEvent, ProgressSink, SpinnerSink, TracingSink};
pub use wait::await_bounded;

/// イメージ一覧の要素
pub use bollard::models::ImageSummary;
