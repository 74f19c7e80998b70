//! Session persistence: the pane tree with every tab reduced by its kind's
//! `serialize_for_session`, and the async way back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::kernel::pane::{Pane, PaneTree, SplitDirection};
use crate::kernel::services::ports::{FileError, FileStore};
use crate::kernel::tabs::{PaneId, RestoreContext, Tab, TabId, TabKind, TabTypeRegistry};

pub const SESSION_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file is not valid: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("session version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("session pane tree is inconsistent: {0}")]
    Structure(String),
    #[error("unsaved content for {} could not be written", .0.display())]
    Unsaved(PathBuf),
    #[error(transparent)]
    Io(#[from] FileError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub active_pane: PaneId,
    pub root: PaneSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSnapshot {
    pub id: PaneId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<Tab>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<TabId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSnapshot {
    pub direction: SplitDirection,
    pub children: Vec<PaneSnapshot>,
}

impl SessionSnapshot {
    pub fn tab_count(&self) -> usize {
        fn count(pane: &PaneSnapshot) -> usize {
            pane.tabs.len()
                + pane
                    .split
                    .as_ref()
                    .map_or(0, |s| s.children.iter().map(count).sum())
        }
        count(&self.root)
    }
}

/// Per-tab restore failure; the tab itself is kept with its stripped payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreFailure {
    pub tab: TabId,
    pub kind: TabKind,
    pub error: String,
}

#[derive(Debug)]
pub struct RestoredSession {
    pub tree: PaneTree,
    pub restored: usize,
    pub skipped: usize,
    pub failures: Vec<RestoreFailure>,
}

pub fn serialize(tree: &PaneTree, registry: &TabTypeRegistry) -> SessionSnapshot {
    SessionSnapshot {
        version: SESSION_VERSION,
        active_pane: tree.active_pane(),
        root: serialize_pane(tree, registry, tree.root()),
    }
}

fn serialize_pane(tree: &PaneTree, registry: &TabTypeRegistry, id: PaneId) -> PaneSnapshot {
    let Some(pane) = tree.pane(id) else {
        return PaneSnapshot {
            id,
            tabs: Vec::new(),
            active_tab: None,
            split: None,
        };
    };

    if let Some(direction) = pane.direction() {
        return PaneSnapshot {
            id,
            tabs: Vec::new(),
            active_tab: None,
            split: Some(SplitSnapshot {
                direction,
                children: pane
                    .children()
                    .iter()
                    .map(|child| serialize_pane(tree, registry, *child))
                    .collect(),
            }),
        };
    }

    let mut tabs = Vec::with_capacity(pane.tabs().len());
    let mut kept_before_active: Option<TabId> = None;
    let mut passed_active = false;
    for tab in pane.tabs() {
        let is_active = pane.active_tab_id() == Some(tab.id);
        let included = match registry.get(tab.kind()) {
            Some(def) if def.include_in_session(tab) => {
                tabs.push(def.serialize_for_session(tab));
                true
            }
            Some(_) => false,
            None => {
                tabs.push(tab.clone());
                true
            }
        };
        if is_active {
            passed_active = true;
            if included {
                kept_before_active = Some(tab.id);
            }
        } else if included && !passed_active {
            kept_before_active = Some(tab.id);
        }
    }

    let active_tab = pane
        .active_tab_id()
        .and_then(|_| kept_before_active.or_else(|| tabs.first().map(|t| t.id)));

    PaneSnapshot {
        id,
        tabs,
        active_tab,
        split: None,
    }
}

/// Rebuilds the pane tree, rehydrating each tab through its kind.
///
/// A tab whose restoration fails keeps its stripped payload and is reported in
/// [`RestoredSession::failures`]; the rest of the session is unaffected.
pub async fn restore(
    snapshot: SessionSnapshot,
    registry: &TabTypeRegistry,
    ctx: &RestoreContext,
) -> Result<RestoredSession, SessionError> {
    check_version(snapshot.version)?;

    let root_id = snapshot.root.id;
    let mut panes = Vec::new();
    let mut pending = vec![(snapshot.root, None::<PaneId>)];
    let mut restored = 0;
    let mut skipped = 0;
    let mut failures = Vec::new();

    while let Some((node, parent)) = pending.pop() {
        if let Some(split) = node.split {
            let children = split.children.iter().map(|c| c.id).collect();
            panes.push(Pane::container(node.id, parent, split.direction, children));
            pending.extend(split.children.into_iter().map(|c| (c, Some(node.id))));
            continue;
        }

        let mut pane = Pane::leaf(node.id, parent);
        for mut tab in node.tabs {
            tab.pane = node.id;
            let Some(def) = registry.get(tab.kind()) else {
                tracing::warn!(tab = %tab.id, kind = %tab.kind(), "unknown tab kind in session");
                failures.push(RestoreFailure {
                    tab: tab.id,
                    kind: tab.kind().clone(),
                    error: format!("tab kind not registered: {}", tab.kind()),
                });
                pane.push_tab(tab);
                continue;
            };
            if !def.needs_restore() {
                skipped += 1;
                pane.push_tab(tab);
                continue;
            }

            let fallback = tab.clone();
            match def.restore_content(tab, ctx).await {
                Ok(tab) => {
                    restored += 1;
                    pane.push_tab(tab);
                }
                Err(e) => {
                    tracing::warn!(
                        tab = %fallback.id,
                        kind = %fallback.kind(),
                        error = %e,
                        "tab restore failed; keeping stripped tab"
                    );
                    failures.push(RestoreFailure {
                        tab: fallback.id,
                        kind: fallback.kind().clone(),
                        error: e.to_string(),
                    });
                    pane.push_tab(fallback);
                }
            }
        }
        pane.set_active_unchecked(node.active_tab);
        panes.push(pane);
    }

    let tree = PaneTree::from_panes(root_id, snapshot.active_pane, panes)
        .map_err(SessionError::Structure)?;
    tracing::info!(
        panes = tree.len(),
        tabs = tree.tab_count(),
        restored,
        skipped,
        failed = failures.len(),
        "session restored"
    );
    Ok(RestoredSession {
        tree,
        restored,
        skipped,
        failures,
    })
}

fn check_version(found: u32) -> Result<(), SessionError> {
    if found != SESSION_VERSION {
        return Err(SessionError::UnsupportedVersion {
            found,
            expected: SESSION_VERSION,
        });
    }
    Ok(())
}

pub fn to_json(snapshot: &SessionSnapshot) -> Result<String, SessionError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn from_json(data: &str) -> Result<SessionSnapshot, SessionError> {
    let snapshot: SessionSnapshot = serde_json::from_str(data)?;
    check_version(snapshot.version)?;
    Ok(snapshot)
}

pub async fn write_session(
    files: &dyn FileStore,
    path: &Path,
    snapshot: &SessionSnapshot,
) -> Result<(), SessionError> {
    let data = to_json(snapshot)?;
    files.write_file(path, &data).await?;
    tracing::info!(
        path = %path.display(),
        tabs = snapshot.tab_count(),
        "session saved"
    );
    Ok(())
}

/// Reads a stored session. A missing file is `Ok(None)`.
pub async fn read_session(
    files: &dyn FileStore,
    path: &Path,
) -> Result<Option<SessionSnapshot>, SessionError> {
    match files.read_file(path).await {
        Ok(data) => from_json(&data).map(Some),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/session.rs"]
mod tests;
