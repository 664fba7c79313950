//! zapp-common — Shared types, errors, HTTP client, and configuration used
//! across all ZAPP Atlas crates.

pub mod config;
pub mod error;
pub mod http;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, ZappError};
pub use http::CappedClient;
