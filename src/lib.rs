//! Linkstat: durable, crash-recoverable link availability checking
//!
//! This crate accepts batches of URLs, probes each one for reachability and
//! records the outcome under a task identifier so a report can be produced later.
//! Work that was interrupted by a restart is picked up again by the recovery pass.

pub mod config;
pub mod engine;
pub mod prober;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Linkstat operations
#[derive(Debug, Error)]
pub enum LinkstatError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Caller-correctable input problem (empty batch, empty id list, empty URL)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying storage was unreadable, unwritable or corrupt
    #[error("Persistence error: {0}")]
    Persistence(#[from] storage::StorageError),

    #[error("Task {0} is not pending")]
    TaskNotPending(state::TaskId),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Linkstat operations
pub type Result<T> = std::result::Result<T, LinkstatError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::TaskEngine;
pub use prober::{HttpProber, Prober};
pub use state::{LinkRecord, TaskId, TaskState};
pub use storage::TaskStore;
