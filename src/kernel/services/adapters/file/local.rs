//! Local file system store on top of `tokio::fs`.

use async_trait::async_trait;
use std::path::Path;

use crate::kernel::services::ports::file::{FileError, FileStore, Result};

pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn ensure_file(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(FileError::NotAFile(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FileError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read_file(&self, path: &Path) -> Result<String> {
        let bytes = self.read_file_bytes(path).await?;
        String::from_utf8(bytes).map_err(|_| FileError::InvalidUtf8(path.to_path_buf()))
    }

    async fn read_file_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        ensure_file(path).await?;
        Ok(tokio::fs::read(path).await?)
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(tokio::fs::write(path, content).await?)
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/local.rs"]
mod tests;
