//! データモデル

mod credentials;
mod label;
mod project;
mod reference;
mod tag;

pub use credentials::*;
pub use label::*;
pub use project::*;
pub use reference::*;
pub use tag::*;
