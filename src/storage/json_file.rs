//! JSON file storage backend
//!
//! Each document lives in its own `<name>.json` file inside one directory.

use crate::storage::traits::{Backend, StorageResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Document backend writing one JSON file per document
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Opens (creating if needed) the data directory
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory that holds the document files
    ///
    /// # Returns
    ///
    /// * `Ok(JsonFileBackend)` - Directory exists and is usable
    /// * `Err(StorageError)` - Directory could not be created
    pub fn new(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the file backing a document
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl Backend for JsonFileBackend {
    fn read_document(&self, name: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.document_path(name)) {
            Ok(body) if body.trim().is_empty() => Ok(None),
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces a document atomically and durably
    ///
    /// The body is staged in a temporary file in the same directory, flushed
    /// to disk and renamed over the target. The directory entry is synced
    /// afterwards so the rename itself survives a power loss.
    fn write_document(&mut self, name: &str, body: &str) -> StorageResult<()> {
        let target = self.document_path(name);

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(body.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| e.error)?;

        sync_dir(&self.dir)?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "json"
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

// Directories cannot be opened as files here; the rename is as durable as the OS makes it
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path()).unwrap();
        assert_eq!(backend.read_document("completed").unwrap(), None);
    }

    #[test]
    fn test_whitespace_file_is_none() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path()).unwrap();
        fs::write(backend.document_path("pending"), "  \n").unwrap();
        assert_eq!(backend.read_document("pending").unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let mut backend = JsonFileBackend::new(dir.path()).unwrap();
        backend.write_document("next_id", "3").unwrap();

        assert_eq!(
            backend.read_document("next_id").unwrap().as_deref(),
            Some("3")
        );
        assert!(!dir.path().join("next_id.json.tmp").exists());
    }

    #[test]
    fn test_write_leaves_only_the_document() {
        let dir = TempDir::new().unwrap();
        let mut backend = JsonFileBackend::new(dir.path()).unwrap();
        backend.write_document("next_id", "2").unwrap();
        backend.write_document("next_id", "3").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["next_id.json".to_string()]);
        assert_eq!(
            fs::read_to_string(backend.document_path("next_id")).unwrap(),
            "3"
        );
    }

    #[test]
    fn test_write_into_removed_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let mut backend = JsonFileBackend::new(&data).unwrap();
        fs::remove_dir_all(&data).unwrap();

        assert!(backend.write_document("pending", "{}").is_err());
        assert!(!data.exists());
    }

    #[test]
    fn test_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut backend = JsonFileBackend::new(&nested).unwrap();
        backend.write_document("pending", "{}").unwrap();
        assert!(nested.join("pending.json").exists());
    }
}
