use std::path::PathBuf;

use super::{PaneId, TabId, TabKind};
use crate::kernel::services::ports::FileError;

#[derive(Debug, thiserror::Error)]
pub enum TabError {
    #[error("tab kind not registered: {0}")]
    UnknownKind(TabKind),
    #[error("tab kind {kind} cannot be built from a {source_kind} source")]
    UnsupportedSource { kind: TabKind, source_kind: TabKind },
    #[error("pane not found: {0}")]
    MissingPane(PaneId),
    #[error("pane {0} is split and cannot hold tabs")]
    NotALeaf(PaneId),
    #[error("{0} is the last pane and cannot be merged away")]
    LastPane(PaneId),
    #[error("tab {tab} not found in {pane}")]
    MissingTab { pane: PaneId, tab: TabId },
    #[error("reuse predicate failed: {0}")]
    Predicate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("tab has no path to restore from")]
    MissingPath,
    #[error("failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: FileError,
    },
    #[error("broken payload for kind {0}")]
    Payload(TabKind),
}
