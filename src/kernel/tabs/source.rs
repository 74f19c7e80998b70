use std::path::{Path, PathBuf};

use super::tab::{ConflictEntry, PreviewMode};
use super::{PaneId, TabKind};

/// What the caller wants to open.
#[derive(Debug, Clone, PartialEq)]
pub enum TabSource {
    File {
        path: PathBuf,
        content: String,
    },
    Bytes {
        path: PathBuf,
        bytes: Vec<u8>,
    },
    Diff {
        path: PathBuf,
        original: String,
        modified: String,
        original_label: Option<String>,
    },
    SuggestedEdit {
        path: PathBuf,
        original: String,
        suggested: String,
        description: Option<String>,
    },
    Preview {
        path: PathBuf,
        source: String,
        mode: PreviewMode,
    },
    Conflict {
        path: PathBuf,
        entries: Vec<ConflictEntry>,
    },
    Settings {
        section: Option<String>,
    },
    Custom {
        kind: TabKind,
        path: Option<PathBuf>,
        data: serde_json::Value,
    },
}

impl TabSource {
    pub fn file(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::File {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. }
            | Self::Bytes { path, .. }
            | Self::Diff { path, .. }
            | Self::SuggestedEdit { path, .. }
            | Self::Preview { path, .. }
            | Self::Conflict { path, .. } => Some(path.as_path()),
            Self::Settings { .. } => None,
            Self::Custom { path, .. } => path.as_deref(),
        }
    }

    /// Kind used when [`OpenOptions::kind`] is not given.
    pub fn inferred_kind(&self) -> TabKind {
        match self {
            Self::File { .. } => TabKind::EDITOR,
            Self::Bytes { .. } => TabKind::BINARY,
            Self::Diff { .. } => TabKind::DIFF,
            Self::SuggestedEdit { .. } => TabKind::REVIEW,
            Self::Preview { .. } => TabKind::PREVIEW,
            Self::Conflict { .. } => TabKind::CONFLICT,
            Self::Settings { .. } => TabKind::SETTINGS,
            Self::Custom { kind, .. } => kind.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    pub kind: Option<TabKind>,
    /// Target pane; the active pane when `None`.
    pub pane: Option<PaneId>,
    /// Scan every pane for a reusable tab instead of only the target.
    pub reuse_across_panes: Option<bool>,
    /// Leave the active tab untouched after opening.
    pub background: bool,
    pub title: Option<String>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self {
            kind: None,
            pane: None,
            reuse_across_panes: None,
            background: false,
            title: None,
        }
    }

    pub fn kind(mut self, kind: TabKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn in_pane(mut self, pane: PaneId) -> Self {
        self.pane = Some(pane);
        self
    }

    pub fn across_panes(mut self, across: bool) -> Self {
        self.reuse_across_panes = Some(across);
        self
    }

    pub fn background(mut self) -> Self {
        self.background = true;
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}
