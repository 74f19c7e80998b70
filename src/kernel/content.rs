//! Content synchronization: one authoritative record per file path, shared by
//! every tab that synchronizes on that path.
//!
//! The store is a publish/subscribe hub. Tabs subscribe to a path; an edit is
//! recorded once and returned as a [`ContentBroadcast`] naming every subscriber,
//! which the workbench applies through each tab kind's `update_content`.
//! Writes are debounced per path: each edit replaces the pending timer, so a
//! burst of edits produces one write carrying the last content.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::kernel::services::ports::{
    FileStore, SaveTimer, SaveTimerRequest, StatusRefresher, TimerHandle,
};
use crate::kernel::tabs::TabKey;

struct PendingSave {
    generation: u64,
    handle: Box<dyn TimerHandle>,
}

impl PendingSave {
    fn cancel(mut self) {
        self.handle.cancel();
    }
}

pub struct ContentRecord {
    path: PathBuf,
    content: String,
    dirty: bool,
    last_persisted: Option<String>,
    generation: u64,
    pending: Option<PendingSave>,
}

impl ContentRecord {
    fn new(path: PathBuf, content: String) -> Self {
        Self {
            path,
            last_persisted: Some(content.clone()),
            content,
            dirty: false,
            generation: 0,
            pending: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.generation)
    }

    pub fn last_persisted(&self) -> Option<&str> {
        self.last_persisted.as_deref()
    }
}

impl std::fmt::Debug for ContentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRecord")
            .field("path", &self.path)
            .field("len", &self.content.len())
            .field("dirty", &self.dirty)
            .field("generation", &self.generation)
            .field("pending", &self.pending_generation())
            .finish()
    }
}

/// Content to push into subscribed tabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBroadcast {
    pub path: PathBuf,
    pub content: String,
    pub dirty: bool,
    /// Tab the edit came from; it already shows `content`.
    pub origin: Option<TabKey>,
    pub targets: Vec<TabKey>,
}

/// Result of a change that happened outside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalUpdate {
    pub path: PathBuf,
    pub content: String,
    /// Subscribers whose reference text should follow the disk.
    pub reference_targets: Vec<TabKey>,
    /// Set when the record was clean and its live content moved to the disk text.
    pub live: Option<ContentBroadcast>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Disk already holds the content; only the dirty flag was cleared.
    Unchanged,
    Failed(String),
    Untracked,
}

impl SaveOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Saved | Self::Unchanged)
    }
}

pub struct ContentStore {
    records: FxHashMap<PathBuf, ContentRecord>,
    subscribers: FxHashMap<PathBuf, Vec<TabKey>>,
    delay: Duration,
    files: Arc<dyn FileStore>,
    timer: Arc<dyn SaveTimer>,
    status: Arc<dyn StatusRefresher>,
}

impl ContentStore {
    pub fn new(
        files: Arc<dyn FileStore>,
        timer: Arc<dyn SaveTimer>,
        status: Arc<dyn StatusRefresher>,
        delay: Duration,
    ) -> Self {
        Self {
            records: FxHashMap::default(),
            subscribers: FxHashMap::default(),
            delay,
            files,
            timer,
            status,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn record(&self, path: &Path) -> Option<&ContentRecord> {
        self.records.get(path)
    }

    pub fn content(&self, path: &Path) -> Option<&str> {
        self.records.get(path).map(|r| r.content.as_str())
    }

    pub fn is_dirty(&self, path: &Path) -> bool {
        self.records.get(path).is_some_and(|r| r.dirty)
    }

    pub fn dirty_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self
            .records
            .values()
            .filter(|r| r.dirty)
            .map(|r| r.path.clone())
            .collect();
        paths.sort();
        paths
    }

    pub fn tracked_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.records.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn subscribers(&self, path: &Path) -> &[TabKey] {
        self.subscribers.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Subscribes `key` to `path`, creating the record from `initial` on first
    /// use. An existing record keeps its content. Returns the current content.
    pub fn subscribe(&mut self, path: &Path, initial: Option<&str>, key: TabKey) -> Option<&str> {
        if !self.records.contains_key(path) {
            let Some(initial) = initial else {
                tracing::debug!(path = %path.display(), "no initial content; record not created");
                return None;
            };
            self.records.insert(
                path.to_path_buf(),
                ContentRecord::new(path.to_path_buf(), initial.to_string()),
            );
        }

        let subs = self.subscribers.entry(path.to_path_buf()).or_default();
        if !subs.contains(&key) {
            subs.push(key);
        }
        self.content(path)
    }

    /// Drops one subscriber and returns how many remain for the path.
    pub fn unsubscribe(&mut self, path: &Path, key: TabKey) -> usize {
        let Some(subs) = self.subscribers.get_mut(path) else {
            return 0;
        };
        subs.retain(|k| *k != key);
        let remaining = subs.len();
        if remaining == 0 {
            self.subscribers.remove(path);
        }
        remaining
    }

    /// Forgets the record. Any pending timer is cancelled without writing;
    /// callers flush first when the content matters.
    pub fn release(&mut self, path: &Path) -> Option<ContentRecord> {
        let mut record = self.records.remove(path)?;
        if let Some(pending) = record.pending.take() {
            pending.cancel();
        }
        self.subscribers.remove(path);
        Some(record)
    }

    /// Records an edit, marks the path dirty and restarts its debounce window.
    ///
    /// Returns `None` when the path is untracked or already holds `content`.
    pub fn set_content(
        &mut self,
        path: &Path,
        content: &str,
        origin: Option<TabKey>,
    ) -> Option<ContentBroadcast> {
        let Some(record) = self.records.get_mut(path) else {
            tracing::warn!(path = %path.display(), "edit for untracked path ignored");
            return None;
        };
        if record.content == content {
            return None;
        }

        record.content = content.to_string();
        record.dirty = true;
        record.generation = record.generation.saturating_add(1);
        if let Some(pending) = record.pending.take() {
            pending.cancel();
        }
        let handle = self.timer.start(SaveTimerRequest {
            path: record.path.clone(),
            generation: record.generation,
            delay: self.delay,
        });
        record.pending = Some(PendingSave {
            generation: record.generation,
            handle,
        });
        tracing::debug!(
            path = %path.display(),
            generation = record.generation,
            delay_ms = self.delay.as_millis() as u64,
            "autosave scheduled"
        );

        Some(ContentBroadcast {
            path: record.path.clone(),
            content: record.content.clone(),
            dirty: true,
            origin,
            targets: self.subscribers(path).to_vec(),
        })
    }

    /// Accepts a timer firing. Returns `true` when `generation` is still the
    /// pending one and the path should be written now.
    pub fn accept_timer(&mut self, path: &Path, generation: u64) -> bool {
        let Some(record) = self.records.get_mut(path) else {
            return false;
        };
        match &record.pending {
            Some(pending) if pending.generation == generation => {
                record.pending = None;
                true
            }
            _ => {
                tracing::debug!(path = %path.display(), generation, "stale autosave timer ignored");
                false
            }
        }
    }

    /// Cancels any pending timer and writes the record now.
    ///
    /// Writing content the disk already holds is skipped but still clears the
    /// dirty flag. A failed write keeps the record dirty and is not retried.
    pub async fn save_immediately(&mut self, path: &Path) -> SaveOutcome {
        let Some(record) = self.records.get_mut(path) else {
            return SaveOutcome::Untracked;
        };
        if let Some(pending) = record.pending.take() {
            pending.cancel();
        }

        let snapshot = record.content.clone();
        let generation = record.generation;
        if record.last_persisted.as_deref() == Some(snapshot.as_str()) {
            record.dirty = false;
            return SaveOutcome::Unchanged;
        }

        let files = Arc::clone(&self.files);
        match files.write_file(path, &snapshot).await {
            Ok(()) => {
                if let Some(record) = self.records.get_mut(path) {
                    record.last_persisted = Some(snapshot);
                    if record.generation == generation {
                        record.dirty = false;
                    }
                }
                tracing::debug!(path = %path.display(), generation, "content persisted");
                self.status.refresh(path);
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to persist content");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Broadcast of the record's current state, used after a save to clear
    /// dirty markers on every subscriber.
    pub fn snapshot(&self, path: &Path) -> Option<ContentBroadcast> {
        let record = self.records.get(path)?;
        Some(ContentBroadcast {
            path: record.path.clone(),
            content: record.content.clone(),
            dirty: record.dirty,
            origin: None,
            targets: self.subscribers(path).to_vec(),
        })
    }

    /// Applies a change made on disk by someone else.
    ///
    /// Unsaved edits win: a dirty record keeps its content and only reference
    /// text moves. A clean record adopts the disk text.
    pub fn update_from_external(&mut self, path: &Path, content: &str) -> Option<ExternalUpdate> {
        let targets = self.subscribers(path).to_vec();
        let record = self.records.get_mut(path)?;
        record.last_persisted = Some(content.to_string());

        let live = if record.dirty {
            tracing::info!(
                path = %path.display(),
                "external change kept out of unsaved edits"
            );
            None
        } else if record.content != content {
            record.content = content.to_string();
            Some(ContentBroadcast {
                path: record.path.clone(),
                content: record.content.clone(),
                dirty: false,
                origin: None,
                targets: targets.clone(),
            })
        } else {
            None
        };

        Some(ExternalUpdate {
            path: record.path.clone(),
            content: content.to_string(),
            reference_targets: targets,
            live,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/content.rs"]
mod tests;
