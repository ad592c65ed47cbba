//! Harborline core
//!
//! コンテナエンジンとレジストリの両方で共有する値オブジェクトを定義します。

pub mod error;
pub mod model;

pub use error::*;
pub use model::*;
