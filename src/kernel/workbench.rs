//! Pane/tab lifecycle and the glue between tabs and the shared stores.
//!
//! The workbench owns the pane tree, the content store, the model cache and
//! the breakpoint store. All mutation goes through `&mut self`; the only
//! suspension points are file reads and writes.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kernel::breakpoints::{BreakpointKey, BreakpointStore};
use crate::kernel::content::{ContentBroadcast, ContentStore, SaveOutcome};
use crate::kernel::language::LanguageId;
use crate::kernel::models::{Acquired, ModelCache, ModelKey};
use crate::kernel::pane::{PaneTree, SplitDirection};
use crate::kernel::services::ports::{
    EngineConfig, FileError, FileStore, ModelFactory, SaveTimer, StatusRefresher,
};
use crate::kernel::services::EngineMessage;
use crate::kernel::session::{self, RestoreFailure, SessionError, SessionSnapshot};
use crate::kernel::tabs::{
    IdAllocator, OpenOptions, PaneId, RestoreContext, SharedDefinition, Tab, TabError, TabKey,
    TabPayload, TabSeed, TabSource, TabTypeRegistry,
};

/// Collaborators the engine talks to.
#[derive(Clone)]
pub struct EngineServices {
    pub files: Arc<dyn FileStore>,
    pub timer: Arc<dyn SaveTimer>,
    pub status: Arc<dyn StatusRefresher>,
    pub models: Arc<dyn ModelFactory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opened {
    pub key: TabKey,
    /// An existing tab matched and was focused instead of building a new one.
    pub reused: bool,
}

#[derive(Debug)]
pub struct CloseOutcome {
    pub tab: Tab,
    /// Set when the tab was the last one on a dirty path and a flush ran.
    pub flushed: Option<SaveOutcome>,
    /// The path's content record was dropped.
    pub released: bool,
}

/// What [`Workbench::handle_message`] did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Saved { path: PathBuf, outcome: SaveOutcome },
    Reloaded { path: PathBuf, tabs: usize },
    Removed { path: PathBuf },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub skipped: usize,
    pub failures: Vec<RestoreFailure>,
}

pub struct Workbench {
    config: EngineConfig,
    registry: TabTypeRegistry,
    ids: IdAllocator,
    panes: PaneTree,
    content: ContentStore,
    models: ModelCache,
    breakpoints: BreakpointStore,
    files: Arc<dyn FileStore>,
}

impl Workbench {
    pub fn new(config: EngineConfig, registry: TabTypeRegistry, services: EngineServices) -> Self {
        let mut ids = IdAllocator::new();
        let root = ids.pane();
        let content = ContentStore::new(
            Arc::clone(&services.files),
            services.timer,
            services.status,
            config.autosave_delay(),
        );
        let models = ModelCache::new(services.models, config.cache_capacity());
        Self {
            config,
            registry,
            ids,
            panes: PaneTree::new(root),
            content,
            models,
            breakpoints: BreakpointStore::new(),
            files: services.files,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TabTypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TabTypeRegistry {
        &mut self.registry
    }

    pub fn panes(&self) -> &PaneTree {
        &self.panes
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    pub fn breakpoints(&self) -> &BreakpointStore {
        &self.breakpoints
    }

    pub fn tab(&self, key: TabKey) -> Option<&Tab> {
        self.panes.tab(key)
    }

    pub fn active_pane(&self) -> PaneId {
        self.panes.active_pane()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.panes.pane(self.panes.active_pane())?.active_tab()
    }

    // ==================== open / close ====================

    /// Opens `source`, reusing a matching tab when the kind's predicate says so.
    pub fn open_tab(&mut self, source: TabSource, options: OpenOptions) -> Result<Opened, TabError> {
        let kind = options
            .kind
            .clone()
            .unwrap_or_else(|| source.inferred_kind());
        let def = self
            .registry
            .get(&kind)
            .ok_or_else(|| TabError::UnknownKind(kind.clone()))?;
        let target = options.pane.unwrap_or_else(|| self.panes.active_pane());
        self.panes.leaf(target)?;

        let across = options
            .reuse_across_panes
            .unwrap_or(self.config.reuse_across_panes);
        if let Some(existing) = self.find_reusable(&def, &source, &options, target, across) {
            tracing::debug!(tab = %existing.tab, pane = %existing.pane, kind = %kind, "reusing open tab");
            if let Some(pane) = self.panes.pane_mut(existing.pane) {
                pane.set_active(existing.tab);
            }
            if !options.background {
                self.panes.set_active_pane(existing.pane)?;
            }
            return Ok(Opened {
                key: existing,
                reused: true,
            });
        }

        let seed = TabSeed {
            id: self.ids.tab(),
            pane: target,
        };
        let mut tab = def.create_tab(seed, &source, &options)?;
        if let Some(title) = &options.title {
            tab.title = title.clone();
        }
        let key = self.panes.insert_tab(target, tab)?;
        self.subscribe_tab(key);

        if !options.background && self.config.activate_on_open {
            self.panes.activate(key)?;
        } else if let Some(pane) = self.panes.pane_mut(target) {
            if pane.active_tab_id().is_none() {
                pane.set_active(key.tab);
            }
        }
        tracing::debug!(tab = %key.tab, pane = %key.pane, kind = %kind, "tab opened");
        Ok(Opened { key, reused: false })
    }

    fn find_reusable(
        &self,
        def: &SharedDefinition,
        source: &TabSource,
        options: &OpenOptions,
        target: PaneId,
        across: bool,
    ) -> Option<TabKey> {
        let mut scan = vec![target];
        if across {
            scan.extend(self.panes.leaves().into_iter().filter(|p| *p != target));
        }
        for pane_id in scan {
            let Some(pane) = self.panes.pane(pane_id) else {
                continue;
            };
            for tab in pane.tabs() {
                let verdict =
                    catch_unwind(AssertUnwindSafe(|| def.should_reuse_tab(tab, source, options)));
                match verdict {
                    Ok(Ok(true)) => return Some(TabKey::new(pane_id, tab.id)),
                    Ok(Ok(false)) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(tab = %tab.id, kind = %def.kind(), error = %e, "reuse predicate failed; treating as no match");
                    }
                    Err(_) => {
                        tracing::warn!(tab = %tab.id, kind = %def.kind(), "reuse predicate panicked; treating as no match");
                    }
                }
            }
        }
        None
    }

    /// Closes a tab. The last tab on a dirty path flushes it first; when that
    /// write fails the record stays so the content is not lost.
    pub async fn close_tab(&mut self, key: TabKey) -> Result<CloseOutcome, TabError> {
        let tab = self.panes.remove_tab(key)?;
        let path = self.content_path_of(&tab);

        let mut flushed = None;
        let mut released = false;
        if let Some(path) = &path {
            if self.content.unsubscribe(path, key) == 0 {
                if self.content.is_dirty(path) {
                    let outcome = self.content.save_immediately(path).await;
                    released = outcome.is_ok();
                    if !released {
                        tracing::warn!(path = %path.display(), "flush on close failed; keeping unsaved content");
                    }
                    flushed = Some(outcome);
                } else {
                    released = true;
                }
                if released {
                    self.content.release(path);
                }
            }
        }

        if let Some(model) = self.models.key_for(tab.id) {
            self.breakpoints.forget_model(model);
        }
        self.models.dispose_model(tab.id);
        let bp_key = BreakpointKey::for_tab(&tab);
        let shared = match &bp_key {
            BreakpointKey::Path(p) => self
                .panes
                .tabs()
                .iter()
                .any(|(_, other)| other.path() == Some(p.as_path())),
            BreakpointKey::Tab(_) => false,
        };
        if !shared {
            self.breakpoints.release(&bp_key);
        }

        tracing::debug!(tab = %tab.id, pane = %key.pane, released, "tab closed");
        Ok(CloseOutcome {
            tab,
            flushed,
            released,
        })
    }

    pub async fn close_pane_tabs(&mut self, pane: PaneId) -> Result<Vec<CloseOutcome>, TabError> {
        let ids: Vec<_> = self.panes.leaf(pane)?.tabs().iter().map(|t| t.id).collect();
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            outcomes.push(self.close_tab(TabKey::new(pane, id)).await?);
        }
        Ok(outcomes)
    }

    // ==================== panes / navigation ====================

    pub fn split_pane(&mut self, pane: PaneId, direction: SplitDirection) -> Result<PaneId, TabError> {
        self.panes.split(pane, direction, &mut self.ids)
    }

    /// Merges `pane` into its neighbor; moved tabs keep their subscriptions
    /// under their new key.
    pub fn merge_pane(&mut self, pane: PaneId) -> Result<PaneId, TabError> {
        let moved: Vec<_> = self.panes.leaf(pane)?.tabs().iter().map(|t| t.id).collect();
        let target = self.panes.merge(pane)?;
        for id in moved {
            let old = TabKey::new(pane, id);
            let new = TabKey::new(target, id);
            let Some(path) = self.panes.tab(new).and_then(|t| self.content_path_of(t)) else {
                continue;
            };
            self.content.unsubscribe(&path, old);
            self.content.subscribe(&path, None, new);
        }
        Ok(target)
    }

    pub fn set_active_pane(&mut self, pane: PaneId) -> Result<bool, TabError> {
        self.panes.set_active_pane(pane)
    }

    pub fn activate_tab(&mut self, key: TabKey) -> Result<bool, TabError> {
        self.panes.activate(key)
    }

    pub fn next_tab(&mut self, pane: PaneId) -> Result<bool, TabError> {
        Ok(self.panes.leaf_mut(pane)?.next_tab())
    }

    pub fn prev_tab(&mut self, pane: PaneId) -> Result<bool, TabError> {
        Ok(self.panes.leaf_mut(pane)?.prev_tab())
    }

    // ==================== content ====================

    /// Records an edit for `path` and pushes it to every tab on that path.
    /// Returns how many tabs changed.
    pub fn set_content(&mut self, path: &Path, content: &str, origin: Option<TabKey>) -> usize {
        match self.content.set_content(path, content, origin) {
            Some(broadcast) => self.apply_broadcast(&broadcast),
            None => 0,
        }
    }

    /// Edit coming from one tab. Tabs without a content path are updated in place.
    pub fn edit_tab(&mut self, key: TabKey, content: &str) -> Result<usize, TabError> {
        let tab = self.panes.tab(key).ok_or(TabError::MissingTab {
            pane: key.pane,
            tab: key.tab,
        })?;
        if let Some(path) = self.content_path_of(tab) {
            return Ok(self.set_content(&path, content, Some(key)));
        }
        let Some(def) = self.registry.get(tab.kind()) else {
            return Ok(0);
        };
        Ok(match self.panes.tab_mut(key) {
            Some(tab) => usize::from(def.update_content(tab, content, true)),
            None => 0,
        })
    }

    pub async fn save_immediately(&mut self, path: &Path) -> SaveOutcome {
        let outcome = self.content.save_immediately(path).await;
        if outcome.is_ok() {
            if let Some(snapshot) = self.content.snapshot(path) {
                self.apply_broadcast(&snapshot);
            }
        }
        outcome
    }

    /// Saves the path shown by a tab.
    pub async fn save_tab(&mut self, key: TabKey) -> Result<SaveOutcome, TabError> {
        let tab = self.panes.tab(key).ok_or(TabError::MissingTab {
            pane: key.pane,
            tab: key.tab,
        })?;
        match self.content_path_of(tab) {
            Some(path) => Ok(self.save_immediately(&path).await),
            None => Ok(SaveOutcome::Untracked),
        }
    }

    pub async fn save_all(&mut self) -> Vec<(PathBuf, SaveOutcome)> {
        let mut outcomes = Vec::new();
        for path in self.content.dirty_paths() {
            let outcome = self.save_immediately(&path).await;
            outcomes.push((path, outcome));
        }
        outcomes
    }

    /// Applies a change made on disk. Reference text always follows; live
    /// content only when the path has no unsaved edits. Returns how many tab
    /// updates were applied.
    pub fn update_from_external(&mut self, path: &Path, content: &str) -> usize {
        let Some(update) = self.content.update_from_external(path, content) else {
            return 0;
        };
        let mut changed = 0;
        for key in &update.reference_targets {
            let Some(tab) = self.panes.tab_mut(*key) else {
                continue;
            };
            let Some(def) = self.registry.get(tab.kind()) else {
                continue;
            };
            if def.update_reference(tab, &update.content) {
                changed += 1;
            }
        }
        if let Some(live) = &update.live {
            changed += self.apply_broadcast(live);
        }
        changed
    }

    /// Reads `path` and applies it as an external change.
    pub async fn reload_from_disk(&mut self, path: &Path) -> Result<usize, FileError> {
        if self.content.record(path).is_none() {
            return Ok(0);
        }
        let text = self.files.read_file(path).await?;
        Ok(self.update_from_external(path, &text))
    }

    pub async fn handle_message(&mut self, msg: EngineMessage) -> Handled {
        match msg {
            EngineMessage::SaveTimerFired { path, generation } => {
                if !self.content.accept_timer(&path, generation) {
                    return Handled::Ignored;
                }
                let outcome = self.save_immediately(&path).await;
                Handled::Saved { path, outcome }
            }
            EngineMessage::ExternalChange { path } => match self.reload_from_disk(&path).await {
                Ok(tabs) => Handled::Reloaded { path, tabs },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read externally changed file");
                    Handled::Ignored
                }
            },
            EngineMessage::ExternalRemoval { path } => {
                if self.content.record(&path).is_none() {
                    return Handled::Ignored;
                }
                tracing::info!(path = %path.display(), "file removed on disk; keeping open content");
                Handled::Removed { path }
            }
            EngineMessage::StatusRefresh { path } => {
                tracing::debug!(path = %path.display(), "status refresh requested");
                Handled::Ignored
            }
        }
    }

    fn apply_broadcast(&mut self, broadcast: &ContentBroadcast) -> usize {
        let mut changed = 0;
        for key in &broadcast.targets {
            let Some(tab) = self.panes.tab_mut(*key) else {
                continue;
            };
            // The origin usually shows the content already; its kind then
            // only flips the dirty flag.
            if let Some(def) = self.registry.get(tab.kind()) {
                if def.update_content(tab, &broadcast.content, broadcast.dirty) {
                    changed += 1;
                }
            }

            let bp_key = BreakpointKey::for_tab(tab);
            let Some(model) = self.models.key_for(key.tab) else {
                continue;
            };
            let resized = match self.models.model_mut(model) {
                Some(handle) => {
                    let stale = handle.text() != broadcast.content;
                    if stale {
                        handle.set_text(&broadcast.content);
                    }
                    stale
                }
                None => false,
            };
            // Line range may have moved under the decorations.
            if resized {
                self.breakpoints
                    .apply_decorations(&bp_key, &mut self.models, model);
            }
        }
        changed
    }

    fn content_path_of(&self, tab: &Tab) -> Option<PathBuf> {
        match self.registry.get(tab.kind()) {
            Some(def) => def.content_path(tab).map(Path::to_path_buf),
            None => tab.path().map(Path::to_path_buf),
        }
    }

    /// Subscribes a tab to its content path. The record's current content
    /// wins over what the tab was built with. Returns `false` when the tab
    /// has a path but no text to seed a new record.
    fn subscribe_tab(&mut self, key: TabKey) -> bool {
        let Some(tab) = self.panes.tab(key) else {
            return true;
        };
        let Some(def) = self.registry.get(tab.kind()) else {
            return true;
        };
        let Some(path) = def.content_path(tab).map(Path::to_path_buf) else {
            return true;
        };
        let initial = def.current_content(tab).map(str::to_string);
        let Some(current) = self
            .content
            .subscribe(&path, initial.as_deref(), key)
            .map(str::to_string)
        else {
            tracing::debug!(tab = %key.tab, path = %path.display(), "no content to seed record");
            return false;
        };
        let dirty = self.content.is_dirty(&path);
        if let Some(tab) = self.panes.tab_mut(key) {
            def.update_content(tab, &current, dirty);
        }
        true
    }

    // ==================== models / breakpoints ====================

    /// Render pass for one tab: makes sure its editing widget exists, brings
    /// breakpoint decorations up to date and disposes retired handles.
    pub fn render_tab(&mut self, key: TabKey) -> Option<ModelKey> {
        let tab = self.panes.tab(key)?;
        let def = self.registry.get(tab.kind())?;
        let seed = def.model_seed(tab)?;
        let language = seed.language;
        let content = def
            .content_path(tab)
            .and_then(|path| self.content.content(path))
            .unwrap_or(seed.content)
            .to_string();
        let bp_key = BreakpointKey::for_tab(tab);

        let acquired = self.models.get_or_create_model(key.tab, &content, language);
        if let Acquired::Recreated { retired, .. } = acquired {
            self.breakpoints.forget_model(retired);
        }
        let model = acquired.key();
        self.breakpoints
            .apply_decorations(&bp_key, &mut self.models, model);
        self.models.collect_retired();
        self.breakpoints.prune(&self.models);
        Some(model)
    }

    /// Changes the language of an editor tab; the next render recreates its
    /// widget.
    pub fn set_language(&mut self, key: TabKey, language: LanguageId) -> bool {
        let Some(tab) = self.panes.tab_mut(key) else {
            return false;
        };
        match &mut tab.payload {
            TabPayload::Editor(payload) if payload.language != language => {
                payload.language = language;
                true
            }
            _ => false,
        }
    }

    /// Toggles a breakpoint and redraws it on every tab sharing the set.
    pub fn toggle_breakpoint(&mut self, key: TabKey, line: u32) -> Result<bool, TabError> {
        let tab = self.panes.tab(key).ok_or(TabError::MissingTab {
            pane: key.pane,
            tab: key.tab,
        })?;
        let bp_key = BreakpointKey::for_tab(tab);
        let now_set = self.breakpoints.toggle(bp_key.clone(), line);

        let sharing: Vec<_> = self
            .panes
            .tabs()
            .into_iter()
            .filter(|(_, t)| BreakpointKey::for_tab(t) == bp_key)
            .map(|(k, _)| k.tab)
            .collect();
        for tab in sharing {
            if let Some(model) = self.models.key_for(tab) {
                self.breakpoints
                    .apply_decorations(&bp_key, &mut self.models, model);
            }
        }
        Ok(now_set)
    }

    // ==================== session ====================

    pub fn serialize_session(&self) -> SessionSnapshot {
        session::serialize(&self.panes, &self.registry)
    }

    /// Replaces the pane tree with a restored session. Unsaved records are
    /// flushed first; if one cannot be written nothing is replaced. Existing
    /// records and widgets are then dropped and restored tabs subscribe to
    /// their paths again.
    pub async fn restore_session(
        &mut self,
        snapshot: SessionSnapshot,
    ) -> Result<RestoreReport, SessionError> {
        for (path, outcome) in self.save_all().await {
            if !outcome.is_ok() {
                tracing::warn!(path = %path.display(), "unsaved content blocks session restore");
                return Err(SessionError::Unsaved(path));
            }
        }

        let ctx = RestoreContext::new(Arc::clone(&self.files));
        let restored = session::restore(snapshot, &self.registry, &ctx).await?;

        self.models.dispose_all();
        for path in self.content.tracked_paths() {
            self.content.release(&path);
        }
        self.panes = restored.tree;

        for pane in self.panes.pane_ids() {
            self.ids.observe_pane(pane);
        }
        let keys: Vec<_> = self.panes.tabs().into_iter().map(|(k, _)| k).collect();
        let mut unseeded = Vec::new();
        for key in keys {
            self.ids.observe_tab(key.tab);
            if !self.subscribe_tab(key) {
                unseeded.push(key);
            }
        }
        for key in unseeded {
            self.subscribe_tab(key);
        }

        Ok(RestoreReport {
            restored: restored.restored,
            skipped: restored.skipped,
            failures: restored.failures,
        })
    }

    pub async fn write_session(&self, path: &Path) -> Result<(), SessionError> {
        session::write_session(self.files.as_ref(), path, &self.serialize_session()).await
    }

    /// Restores the session stored at `path`. `Ok(None)` when there is none.
    pub async fn load_session(&mut self, path: &Path) -> Result<Option<RestoreReport>, SessionError> {
        match session::read_session(self.files.as_ref(), path).await? {
            Some(snapshot) => Ok(Some(self.restore_session(snapshot).await?)),
            None => Ok(None),
        }
    }

    /// Disposes every widget handle.
    pub fn teardown(&mut self) -> usize {
        self.models.dispose_all()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/workbench.rs"]
mod tests;
