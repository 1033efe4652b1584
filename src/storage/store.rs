//! The durable task store
//!
//! `TaskStore` owns a backend behind a single readers-writer lock. Shared
//! access hands out a [`StoreReader`], exclusive access a [`StoreWriter`];
//! every load, save, delete and allocation goes through one of the two, so
//! multi-step sequences are atomic with respect to other store users as long
//! as the caller keeps the guard alive across all of them.

use crate::state::{LinkRecord, TaskId, TaskState};
use crate::storage::allocator::{allocate_id, peek_next_id};
use crate::storage::traits::{Backend, StorageError, StorageResult};
use crate::storage::MemoryBackend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One collection: task identifier to its ordered links
pub type TaskMap = BTreeMap<TaskId, Vec<LinkRecord>>;

/// On-disk shape of a collection document
#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionDocument {
    #[serde(default)]
    tasks: TaskMap,
}

/// Snapshot of the store's size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub pending: usize,
    pub completed: usize,
    pub next_id: TaskId,
}

/// Pending and completed collections plus the identifier counter
pub struct TaskStore {
    backend: RwLock<Box<dyn Backend>>,
}

impl TaskStore {
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn Backend>) -> Self {
        Self {
            backend: RwLock::new(backend),
        }
    }

    /// A store that forgets everything when dropped
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Acquires the shared lock
    pub async fn read(&self) -> StoreReader<'_> {
        StoreReader {
            backend: self.backend.read().await,
        }
    }

    /// Acquires the exclusive lock
    pub async fn write(&self) -> StoreWriter<'_> {
        StoreWriter {
            backend: self.backend.write().await,
        }
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore").finish_non_exhaustive()
    }
}

/// Shared-lock view of the store
pub struct StoreReader<'a> {
    backend: RwLockReadGuard<'a, Box<dyn Backend>>,
}

impl StoreReader<'_> {
    pub fn load(&self, state: TaskState) -> StorageResult<TaskMap> {
        load_collection(&**self.backend, state)
    }

    pub fn load_pending(&self) -> StorageResult<TaskMap> {
        self.load(TaskState::Pending)
    }

    pub fn load_completed(&self) -> StorageResult<TaskMap> {
        self.load(TaskState::Completed)
    }

    pub fn stats(&self) -> StorageResult<StoreStats> {
        collect_stats(&**self.backend)
    }
}

/// Exclusive-lock view of the store
pub struct StoreWriter<'a> {
    backend: RwLockWriteGuard<'a, Box<dyn Backend>>,
}

impl StoreWriter<'_> {
    pub fn load(&self, state: TaskState) -> StorageResult<TaskMap> {
        load_collection(&**self.backend, state)
    }

    pub fn load_pending(&self) -> StorageResult<TaskMap> {
        self.load(TaskState::Pending)
    }

    pub fn load_completed(&self) -> StorageResult<TaskMap> {
        self.load(TaskState::Completed)
    }

    pub fn save(&mut self, state: TaskState, tasks: &TaskMap) -> StorageResult<()> {
        save_collection(&mut **self.backend, state, tasks)
    }

    pub fn save_pending(&mut self, tasks: &TaskMap) -> StorageResult<()> {
        self.save(TaskState::Pending, tasks)
    }

    pub fn save_completed(&mut self, tasks: &TaskMap) -> StorageResult<()> {
        self.save(TaskState::Completed, tasks)
    }

    /// Removes one pending entry; absent entries are not an error
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The entry existed and was removed
    /// * `Ok(false)` - Nothing to remove, nothing written
    pub fn delete_pending(&mut self, id: TaskId) -> StorageResult<bool> {
        let mut pending = self.load_pending()?;
        if pending.remove(&id).is_none() {
            return Ok(false);
        }
        self.save_pending(&pending)?;
        Ok(true)
    }

    /// Issues a fresh task identifier
    pub fn allocate_id(&mut self) -> StorageResult<TaskId> {
        allocate_id(&mut **self.backend)
    }
}

fn load_collection(backend: &dyn Backend, state: TaskState) -> StorageResult<TaskMap> {
    let name = state.document_name();
    let Some(body) = backend.read_document(name)? else {
        return Ok(TaskMap::new());
    };

    let document: CollectionDocument =
        serde_json::from_str(&body).map_err(|e| StorageError::Corrupt {
            document: name.to_string(),
            message: e.to_string(),
        })?;
    Ok(document.tasks)
}

fn save_collection(
    backend: &mut dyn Backend,
    state: TaskState,
    tasks: &TaskMap,
) -> StorageResult<()> {
    #[derive(Serialize)]
    struct CollectionRef<'a> {
        tasks: &'a TaskMap,
    }

    let body = serde_json::to_string_pretty(&CollectionRef { tasks })
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    backend.write_document(state.document_name(), &body)?;
    tracing::debug!(
        "Saved {} {} task(s) to {} backend",
        tasks.len(),
        state,
        backend.kind()
    );
    Ok(())
}

fn collect_stats(backend: &dyn Backend) -> StorageResult<StoreStats> {
    Ok(StoreStats {
        pending: load_collection(backend, TaskState::Pending)?.len(),
        completed: load_collection(backend, TaskState::Completed)?.len(),
        next_id: peek_next_id(backend)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileBackend;
    use tempfile::TempDir;

    fn links(urls: &[&str]) -> Vec<LinkRecord> {
        LinkRecord::from_urls(urls.iter().copied()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_collections_are_empty() {
        let store = TaskStore::in_memory();
        let reader = store.read().await;
        assert!(reader.load_pending().unwrap().is_empty());
        assert!(reader.load_completed().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let store = TaskStore::in_memory();
        let mut writer = store.write().await;

        let mut first = TaskMap::new();
        first.insert(TaskId::new(1), links(&["a.test"]));
        first.insert(TaskId::new(2), links(&["b.test"]));
        writer.save_pending(&first).unwrap();

        let mut second = TaskMap::new();
        second.insert(TaskId::new(3), links(&["c.test"]));
        writer.save_pending(&second).unwrap();

        assert_eq!(writer.load_pending().unwrap(), second);
    }

    #[tokio::test]
    async fn test_delete_pending_absent_is_noop() {
        let store = TaskStore::in_memory();
        let mut writer = store.write().await;

        let mut pending = TaskMap::new();
        pending.insert(TaskId::new(1), links(&["a.test"]));
        writer.save_pending(&pending).unwrap();

        assert!(!writer.delete_pending(TaskId::new(9)).unwrap());
        assert!(writer.delete_pending(TaskId::new(1)).unwrap());
        assert!(!writer.delete_pending(TaskId::new(1)).unwrap());
        assert!(writer.load_pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_error() {
        let backend = MemoryBackend::new().with_document("completed", "{ not json");
        let store = TaskStore::new(backend);
        let reader = store.read().await;

        assert!(matches!(
            reader.load_completed(),
            Err(StorageError::Corrupt { ref document, .. }) if document == "completed"
        ));
        // The other collection is unaffected
        assert!(reader.load_pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_document_shape() {
        let backend = MemoryBackend::new().with_document(
            "pending",
            r#"{"tasks": {"4": [{"url": "a.test", "available": false}]}}"#,
        );
        let store = TaskStore::new(backend);
        let pending = store.read().await.load_pending().unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[&TaskId::new(4)][0].url, "a.test");
    }

    #[tokio::test]
    async fn test_round_trip_across_reopen() {
        let dir = TempDir::new().unwrap();
        let mut completed = TaskMap::new();
        let mut records = links(&["a.test", "b.test"]);
        records[1].available = true;
        completed.insert(TaskId::new(7), records);

        {
            let store = TaskStore::new(JsonFileBackend::new(dir.path()).unwrap());
            let mut writer = store.write().await;
            writer.save_completed(&completed).unwrap();
            writer.allocate_id().unwrap();
        }

        let store = TaskStore::new(JsonFileBackend::new(dir.path()).unwrap());
        let reader = store.read().await;
        assert_eq!(reader.load_completed().unwrap(), completed);
        assert_eq!(
            reader.stats().unwrap(),
            StoreStats {
                pending: 0,
                completed: 1,
                next_id: TaskId::new(2),
            }
        );
    }
}
