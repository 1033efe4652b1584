//! Storage traits and error types
//!
//! This module defines the trait interface for document backends and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The document exists but its contents cannot be parsed
    #[error("Corrupt document '{document}': {message}")]
    Corrupt { document: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Identifier counter overflowed")]
    CounterOverflow,

    #[error("Backend lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document backend implementations
///
/// A backend stores whole named documents. Reads return the full body and
/// writes replace it wholesale; there are no partial or append writes.
/// Callers serialize access through [`crate::storage::TaskStore`], so
/// implementations need not coordinate concurrent writers themselves.
pub trait Backend: Send + Sync {
    /// Reads a document
    ///
    /// # Returns
    ///
    /// * `Ok(Some(body))` - The document exists
    /// * `Ok(None)` - The document has never been written
    /// * `Err(StorageError)` - The underlying resource could not be read
    fn read_document(&self, name: &str) -> StorageResult<Option<String>>;

    /// Overwrites a document with a new body
    fn write_document(&mut self, name: &str, body: &str) -> StorageResult<()>;

    /// Short backend label for logging
    fn kind(&self) -> &'static str;
}
