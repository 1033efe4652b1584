//! In-memory storage backend
//!
//! Nothing survives the process. Used for tests and throwaway runs.

use crate::storage::traits::{Backend, StorageResult};
use std::collections::HashMap;

/// Document backend kept entirely in process memory
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    documents: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document body, bypassing any encoding
    pub fn with_document(mut self, name: &str, body: &str) -> Self {
        self.documents.insert(name.to_string(), body.to_string());
        self
    }
}

impl Backend for MemoryBackend {
    fn read_document(&self, name: &str) -> StorageResult<Option<String>> {
        Ok(self.documents.get(name).cloned())
    }

    fn write_document(&mut self, name: &str, body: &str) -> StorageResult<()> {
        self.documents.insert(name.to_string(), body.to_string());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
