//! Shared utilities for the storage gateway services

// Re-export common dependencies
pub use anyhow;
pub use chrono;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;

pub mod env;
pub mod observability;
