//! Configuration loading.
//!
//! - [`types`]: `Config`, `ServerInfo` and `SessionConfig`
//! - [`defaults`]: serde default functions

mod defaults;
mod types;

pub use types::{Config, ConfigError, ServerInfo, SessionConfig};
