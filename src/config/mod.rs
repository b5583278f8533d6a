//! Configuration model for simfleet.
//!
//! This module defines the Config struct that represents `simfleet.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::Config;
pub use operations::DEFAULT_CONFIG_FILE;
pub use types::{CodeOptimization, ValidationPolicy, commit_kind};
