//! File storage contract used by persistence and session restore.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("file is not valid UTF-8: {}", .0.display())]
    InvalidUtf8(PathBuf),
    #[error("file store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FileError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<String>;

    async fn read_file_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/file.rs"]
mod tests;
