//! Configuration module for Linkstat
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional; omitted values take their defaults.
//!
//! # Example
//!
//! ```no_run
//! use linkstat::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkstat.toml")).unwrap();
//! println!("Storage backend: {:?}", config.storage.backend);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BackendKind, Config, EngineConfig, ProberConfig, StorageConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
