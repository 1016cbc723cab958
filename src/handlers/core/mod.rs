//! Core handler infrastructure: the dispatch context and the registry.

pub mod context;
pub mod registry;

pub use context::{Context, Handler};
pub use registry::Registry;
