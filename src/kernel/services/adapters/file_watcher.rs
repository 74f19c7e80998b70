//! Watches the workspace for changes to files with open content records.
//!
//! Raw notify events are folded into per-path fingerprints (length + mtime) so
//! metadata noise and the engine's own writes do not surface as external
//! changes.

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, SystemTime};

use crate::kernel::services::EngineMessage;

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
enum FsDelta {
    Deleted { path: PathBuf },
    Renamed { from: PathBuf, to: PathBuf },
    Modified { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

#[derive(Default)]
struct DrainBuckets {
    removed: FxHashSet<PathBuf>,
    modified: FxHashSet<PathBuf>,
}

pub struct FileWatcherService {
    watcher: RecommendedWatcher,
    raw_event_rx: mpsc::Receiver<notify::Event>,
    workspace_root: PathBuf,
    watched: FxHashSet<PathBuf>,
    watched_keys: FxHashMap<PathBuf, FxHashSet<PathBuf>>,
    fingerprints: FxHashMap<PathBuf, FileFingerprint>,
}

impl FileWatcherService {
    pub fn new(workspace_root: &Path) -> Result<Self, notify::Error> {
        let workspace_root = workspace_root
            .canonicalize()
            .unwrap_or_else(|_| workspace_root.to_path_buf());
        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                let _ = tx.send(event);
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        watcher.watch(&workspace_root, RecursiveMode::Recursive)?;
        Ok(Self {
            watcher,
            raw_event_rx: rx,
            workspace_root,
            watched: FxHashSet::default(),
            watched_keys: FxHashMap::default(),
            fingerprints: FxHashMap::default(),
        })
    }

    /// Replaces the watched set. Paths that stay watched keep their
    /// fingerprint; new ones are fingerprinted now.
    pub fn sync_paths<'a, I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut watched = FxHashSet::default();
        let mut watched_keys: FxHashMap<PathBuf, FxHashSet<PathBuf>> = FxHashMap::default();
        let mut fingerprints = FxHashMap::default();

        for path in paths {
            let path = path.to_path_buf();
            if !watched.insert(path.clone()) {
                continue;
            }
            for key in path_identity_keys(&path, &self.workspace_root) {
                watched_keys.entry(key).or_default().insert(path.clone());
            }
            if let Some(existing) = self.fingerprints.get(&path).cloned() {
                fingerprints.insert(path, existing);
            } else if let Some(fingerprint) = file_fingerprint(&path) {
                fingerprints.insert(path, fingerprint);
            }
        }

        self.watched = watched;
        self.watched_keys = watched_keys;
        self.fingerprints = fingerprints;
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn watched(&self) -> &FxHashSet<PathBuf> {
        &self.watched
    }

    /// Records the engine's own write so the followup event is not reported.
    pub fn acknowledge_write(&mut self, path: &Path) {
        for watched in self.match_watched(path) {
            match file_fingerprint(&watched) {
                Some(fingerprint) => {
                    self.fingerprints.insert(watched, fingerprint);
                }
                None => {
                    self.fingerprints.remove(&watched);
                }
            }
        }
    }

    /// Folds pending raw events into engine messages. Removals come first,
    /// each group sorted by path.
    pub fn drain_events(&mut self) -> Vec<EngineMessage> {
        let _watcher_guard = &self.watcher;
        let mut buckets = DrainBuckets::default();

        while let Ok(event) = self.raw_event_rx.try_recv() {
            for delta in normalize_notify_event(event) {
                self.route_delta(delta, &mut buckets);
            }
        }

        let DrainBuckets { removed, modified } = buckets;
        let mut removed: Vec<_> = removed.into_iter().collect();
        removed.sort_unstable();
        let mut modified: Vec<_> = modified
            .into_iter()
            .filter(|p| !removed.contains(p))
            .collect();
        modified.sort_unstable();

        removed
            .into_iter()
            .map(|path| EngineMessage::ExternalRemoval { path })
            .chain(
                modified
                    .into_iter()
                    .map(|path| EngineMessage::ExternalChange { path }),
            )
            .collect()
    }

    fn route_delta(&mut self, delta: FsDelta, buckets: &mut DrainBuckets) {
        match delta {
            FsDelta::Modified { path } => {
                for watched in self.match_watched(&path) {
                    if self.refresh_fingerprint(&watched) {
                        buckets.modified.insert(watched);
                    }
                }
            }
            FsDelta::Deleted { path } => {
                for watched in self.match_watched(&path) {
                    if watched.exists() {
                        continue;
                    }
                    self.fingerprints.remove(&watched);
                    buckets.removed.insert(watched);
                }
            }
            FsDelta::Renamed { from, to } => {
                for watched in self.match_watched(&from) {
                    if watched.exists() {
                        continue;
                    }
                    self.fingerprints.remove(&watched);
                    buckets.removed.insert(watched);
                }
                // Atomic saves land as a rename onto the watched path.
                for watched in self.match_watched(&to) {
                    let _ = self.refresh_fingerprint(&watched);
                    buckets.removed.remove(&watched);
                    buckets.modified.insert(watched);
                }
            }
        }
    }

    fn refresh_fingerprint(&mut self, path: &Path) -> bool {
        match file_fingerprint(path) {
            Some(fingerprint) => match self
                .fingerprints
                .insert(path.to_path_buf(), fingerprint.clone())
            {
                Some(previous) => previous != fingerprint,
                None => true,
            },
            None => self.fingerprints.remove(path).is_some(),
        }
    }

    fn match_watched(&self, path: &Path) -> FxHashSet<PathBuf> {
        let mut matched = FxHashSet::default();
        for key in path_identity_keys(path, &self.workspace_root) {
            if let Some(paths) = self.watched_keys.get(&key) {
                matched.extend(paths.iter().cloned());
            }
        }
        matched
    }
}

fn raw_absolute_path(path: &Path, workspace_root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace_root.join(path)
    }
}

fn path_identity_keys(path: &Path, workspace_root: &Path) -> Vec<PathBuf> {
    let raw = raw_absolute_path(path, workspace_root);
    let mut keys = vec![raw.clone()];
    if let Ok(canonical) = raw.canonicalize() {
        if canonical != raw {
            keys.push(canonical);
        }
    }
    keys
}

fn file_fingerprint(path: &Path) -> Option<FileFingerprint> {
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    Some(FileFingerprint {
        len: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

fn normalize_notify_event(event: notify::Event) -> Vec<FsDelta> {
    match event.kind {
        EventKind::Create(_) => event
            .paths
            .into_iter()
            .map(|path| FsDelta::Modified { path })
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .into_iter()
            .map(|path| FsDelta::Deleted { path })
            .collect(),
        EventKind::Modify(kind) => normalize_modify_event(kind, event.paths),
        _ => Vec::new(),
    }
}

fn normalize_modify_event(kind: ModifyKind, paths: Vec<PathBuf>) -> Vec<FsDelta> {
    match kind {
        ModifyKind::Name(RenameMode::Both) if paths.len() >= 2 => vec![FsDelta::Renamed {
            from: paths[0].clone(),
            to: paths[1].clone(),
        }],
        ModifyKind::Name(RenameMode::From) => paths
            .into_iter()
            .map(|path| FsDelta::Deleted { path })
            .collect(),
        _ => paths
            .into_iter()
            .map(|path| FsDelta::Modified { path })
            .collect(),
    }
}
