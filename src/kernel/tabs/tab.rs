use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{PaneId, TabId, TabKind};
use crate::kernel::language::LanguageId;

/// One open tab.
///
/// `kind` and `path` are fixed at construction; everything a kind needs beyond
/// the common fields lives in [`TabPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    kind: TabKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    pub pane: PaneId,
    #[serde(default)]
    pub dirty: bool,
    pub payload: TabPayload,
}

impl Tab {
    pub fn new(
        id: TabId,
        pane: PaneId,
        kind: TabKind,
        path: Option<PathBuf>,
        payload: TabPayload,
    ) -> Self {
        let title = path
            .as_deref()
            .map(title_for_path)
            .unwrap_or_else(|| kind.to_string());
        Self {
            id,
            title,
            kind,
            path,
            pane,
            dirty: false,
            payload,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn kind(&self) -> &TabKind {
        &self.kind
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn display_title(&self) -> String {
        if self.dirty {
            format!("\u{25cf} {}", self.title)
        } else {
            self.title.clone()
        }
    }
}

pub fn title_for_path(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TabPayload {
    Editor(EditorPayload),
    Diff(DiffPayload),
    Review(ReviewPayload),
    Preview(PreviewPayload),
    Conflict(ConflictPayload),
    Settings(SettingsPayload),
    Binary(BinaryPayload),
    Custom(serde_json::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorPayload {
    /// `None` while stripped for the session file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub language: LanguageId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default)]
    pub original_label: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewPayload {
    /// Content the suggestion applies to; tracks the file on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    pub suggested: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    #[default]
    Markdown,
    Web,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub mode: PreviewMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    Ours,
    Theirs,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictEntry {
    pub start_line: u32,
    pub ours: String,
    pub theirs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ConflictResolution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictPayload {
    pub entries: Vec<ConflictEntry>,
}

impl ConflictPayload {
    pub fn unresolved(&self) -> usize {
        self.entries.iter().filter(|e| e.resolution.is_none()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<Vec<u8>>,
    #[serde(default)]
    pub size: u64,
}
