//! Identifier allocator
//!
//! The counter document holds the next identifier to issue as a bare JSON
//! integer. The incremented value is persisted before the allocated
//! identifier is returned, so an identifier can never be issued twice, not
//! even across restarts. A failed save later in the caller's sequence leaves
//! a gap, never a duplicate.

use crate::state::TaskId;
use crate::storage::traits::{Backend, StorageError, StorageResult};

/// Name of the document holding the counter
pub const COUNTER_DOCUMENT: &str = "next_id";

/// Reads the next identifier without consuming it
///
/// A counter that has never been written starts at [`TaskId::FIRST`].
pub fn peek_next_id(backend: &dyn Backend) -> StorageResult<TaskId> {
    let Some(body) = backend.read_document(COUNTER_DOCUMENT)? else {
        return Ok(TaskId::FIRST);
    };

    let value: u64 = serde_json::from_str(body.trim()).map_err(|e| StorageError::Corrupt {
        document: COUNTER_DOCUMENT.to_string(),
        message: e.to_string(),
    })?;

    if value == 0 {
        return Err(StorageError::Corrupt {
            document: COUNTER_DOCUMENT.to_string(),
            message: "identifier counter must be positive".to_string(),
        });
    }

    Ok(TaskId::new(value))
}

/// Consumes and returns the next identifier
///
/// Callers must hold the store's exclusive lock; [`crate::storage::StoreWriter`]
/// is the only public path here.
pub(crate) fn allocate_id(backend: &mut dyn Backend) -> StorageResult<TaskId> {
    let current = peek_next_id(backend)?;
    let next = current.next().ok_or(StorageError::CounterOverflow)?;

    let body =
        serde_json::to_string(&next).map_err(|e| StorageError::Serialization(e.to_string()))?;
    backend.write_document(COUNTER_DOCUMENT, &body)?;

    tracing::trace!("Allocated task id {}", current);
    Ok(current)
}
