//! Harbor registry client
//!
//! Direct implementation of the subset of the Harbor "v2.0" management API
//! Harborline needs: artifact tag existence and removal, tag listing,
//! label lookup / create / update and project lookup.
//!
//! Every operation returns a sentinel (`false` / `None`) on failure instead
//! of an error; the HTTP status and response body are logged.
//!
//! # Example
//!
//! ```ignore
//! use harborline_registry::RegistryClient;
//!
//! let registry = RegistryClient::new("https://harbor.example.com/v2", "admin", "secret")?;
//! if !registry.exists("harbor.example.com/proj/app:1.0").await {
//!     // push first
//! }
//! ```

pub mod client;
pub mod error;
pub mod response;

pub use client::{RegistryClient, api_root};
pub use error::{RegistryError, Result};
pub use response::OperationResult;
