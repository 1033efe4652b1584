//! Storage module for persisting tasks
//!
//! This module handles everything that touches stable storage:
//! - Document backends (JSON files, SQLite, memory)
//! - The pending and completed task collections
//! - The persisted task identifier counter
//! - The store-wide readers-writer lock

mod allocator;
mod json_file;
mod memory;
mod schema;
mod sqlite;
mod store;
mod traits;

pub use allocator::{peek_next_id, COUNTER_DOCUMENT};
pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use store::{StoreReader, StoreStats, StoreWriter, TaskMap, TaskStore};
pub use traits::{Backend, StorageError, StorageResult};

use crate::config::{BackendKind, StorageConfig};
use std::path::Path;

/// Opens the backend selected by the storage configuration
///
/// # Arguments
///
/// * `config` - The storage section of the configuration
///
/// # Returns
///
/// * `Ok(Box<dyn Backend>)` - Backend ready for use
/// * `Err(StorageError)` - The data directory or database could not be opened
pub fn open_backend(config: &StorageConfig) -> StorageResult<Box<dyn Backend>> {
    let path = Path::new(&config.path);
    let backend: Box<dyn Backend> = match config.backend {
        BackendKind::Json => Box::new(JsonFileBackend::new(path)?),
        BackendKind::Sqlite => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(SqliteBackend::new(path)?)
        }
        BackendKind::Memory => Box::new(MemoryBackend::new()),
    };

    tracing::debug!("Opened {} storage backend at {}", backend.kind(), config.path);
    Ok(backend)
}

/// Opens the configured backend and wraps it in a task store
pub fn open_store(config: &StorageConfig) -> StorageResult<TaskStore> {
    Ok(TaskStore::from_boxed(open_backend(config)?))
}
