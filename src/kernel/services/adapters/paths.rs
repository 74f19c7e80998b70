//! App data locations.
//!
//! - macOS: ~/Library/Application Support/ztabs
//! - Linux: $XDG_DATA_HOME/ztabs or ~/.local/share/ztabs
//! - Windows: %APPDATA%\ztabs
//!
//! Sessions are stored per workspace as `sessions/<hash>.json`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

pub(crate) const APP_NAME: &str = "ztabs";
const SESSION_DIR: &str = "sessions";
const LOG_DIR: &str = "logs";

pub fn get_app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_NAME)
        })
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            Some(PathBuf::from(xdg).join(APP_NAME))
        } else {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share").join(APP_NAME))
        }
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

pub(crate) fn hash_path(path: &Path) -> String {
    let mut hasher = DefaultHasher::new();
    path.to_string_lossy().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

pub fn get_session_dir() -> Option<PathBuf> {
    get_app_data_dir().map(|p| p.join(SESSION_DIR))
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_app_data_dir().map(|p| p.join(LOG_DIR))
}

/// Session file for a workspace root. Relative roots are resolved against the
/// current directory first so the same workspace always maps to one file.
pub fn get_session_file_path(workspace: &Path) -> Option<PathBuf> {
    let abs = if workspace.is_absolute() {
        workspace.to_path_buf()
    } else {
        let joined = std::env::current_dir().ok()?.join(workspace);
        joined.canonicalize().unwrap_or(joined)
    };
    get_session_dir().map(|dir| dir.join(format!("{}.json", hash_path(&abs))))
}

fn ensure_dir(dir: Option<PathBuf>, what: &str) -> std::io::Result<PathBuf> {
    let dir = dir.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Cannot determine {what} directory"),
        )
    })?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

pub fn ensure_session_dir() -> std::io::Result<PathBuf> {
    ensure_dir(get_session_dir(), "session")
}

pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    ensure_dir(get_log_dir(), "log")
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/paths.rs"]
mod tests;
