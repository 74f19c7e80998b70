use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Tag naming a tab behavior in the registry.
///
/// The set is open: built-in kinds are exposed as constants, extensions mint
/// their own tags with [`TabKind::custom`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabKind(CompactString);

impl TabKind {
    pub const EDITOR: TabKind = TabKind(CompactString::const_new("editor"));
    pub const DIFF: TabKind = TabKind(CompactString::const_new("diff"));
    pub const REVIEW: TabKind = TabKind(CompactString::const_new("review"));
    pub const PREVIEW: TabKind = TabKind(CompactString::const_new("preview"));
    pub const CONFLICT: TabKind = TabKind(CompactString::const_new("conflict"));
    pub const SETTINGS: TabKind = TabKind(CompactString::const_new("settings"));
    pub const BINARY: TabKind = TabKind(CompactString::const_new("binary"));

    pub fn custom(tag: &str) -> Self {
        Self(CompactString::from(tag))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_builtin(&self) -> bool {
        [
            Self::EDITOR,
            Self::DIFF,
            Self::REVIEW,
            Self::PREVIEW,
            Self::CONFLICT,
            Self::SETTINGS,
            Self::BINARY,
        ]
        .iter()
        .any(|k| k == self)
    }
}

impl std::fmt::Display for TabKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TabCapabilities {
    pub editable: bool,
    pub previewable: bool,
}

impl TabCapabilities {
    pub const NONE: TabCapabilities = TabCapabilities {
        editable: false,
        previewable: false,
    };

    pub const fn editable() -> Self {
        Self {
            editable: true,
            previewable: false,
        }
    }

    pub const fn previewable() -> Self {
        Self {
            editable: false,
            previewable: true,
        }
    }
}
