//! In-process file store. Records every write so callers can observe
//! persistence, and can be told to fail writes.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::kernel::services::ports::file::{FileError, FileStore, Result};

#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<FxHashMap<PathBuf, Vec<u8>>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
    fail_writes: AtomicBool,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Changes a file without recording a write, like another process would.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), content.into());
        }
    }

    pub fn remove(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|mut files| files.remove(path).is_some())
            .unwrap_or(false)
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        let files = self.files.lock().ok()?;
        files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn writes_to(&self, path: &Path) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter(|(p, _)| p == path)
            .map(|(_, content)| content)
            .collect()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock_error() -> FileError {
        FileError::Unavailable("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn read_file(&self, path: &Path) -> Result<String> {
        let bytes = self.read_file_bytes(path).await?;
        String::from_utf8(bytes).map_err(|_| FileError::InvalidUtf8(path.to_path_buf()))
    }

    async fn read_file_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let files = self.files.lock().map_err(|_| Self::lock_error())?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.to_path_buf()))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FileError::Unavailable("writes disabled".to_string()));
        }
        self.files
            .lock()
            .map_err(|_| Self::lock_error())?
            .insert(path.to_path_buf(), content.as_bytes().to_vec());
        self.writes
            .lock()
            .map_err(|_| Self::lock_error())?
            .push((path.to_path_buf(), content.to_string()));
        Ok(())
    }
}
