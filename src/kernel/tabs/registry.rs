//! Tab-type registry: maps a [`TabKind`] to the behavior record for that kind.
//!
//! The registry is an ordinary value owned by the workbench, so tests build
//! isolated registries instead of sharing a global one.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use super::error::{RestoreError, TabError};
use super::{OpenOptions, PaneId, Tab, TabCapabilities, TabId, TabKind, TabSource};
use crate::kernel::language::LanguageId;
use crate::kernel::services::ports::FileStore;

/// Ids the workbench hands to a constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSeed {
    pub id: TabId,
    pub pane: PaneId,
}

/// Text and language a tab wants its editing widget seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSeed<'a> {
    pub content: &'a str,
    pub language: LanguageId,
}

/// File lookups available to [`TabTypeDefinition::restore_content`].
#[derive(Clone)]
pub struct RestoreContext {
    files: Arc<dyn FileStore>,
}

impl RestoreContext {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }

    pub async fn read_text(&self, path: &Path) -> Result<String, RestoreError> {
        self.files
            .read_file(path)
            .await
            .map_err(|source| RestoreError::File {
                path: path.to_path_buf(),
                source,
            })
    }

    pub async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, RestoreError> {
        self.files
            .read_file_bytes(path)
            .await
            .map_err(|source| RestoreError::File {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Behavior record for one tab kind.
///
/// Only `kind` and `create_tab` are required. The defaults describe a kind that
/// never reuses tabs, does not take part in path synchronization and is
/// persisted verbatim.
#[async_trait]
pub trait TabTypeDefinition: Send + Sync {
    fn kind(&self) -> TabKind;

    fn capabilities(&self) -> TabCapabilities {
        TabCapabilities::NONE
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        source: &TabSource,
        options: &OpenOptions,
    ) -> Result<Tab, TabError>;

    /// Whether `existing` already shows `source`. An error counts as no match.
    fn should_reuse_tab(
        &self,
        _existing: &Tab,
        _source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<bool, TabError> {
        Ok(false)
    }

    /// Applies content broadcast for the tab's path. Returns `false` when the
    /// tab already reflects `content` and `dirty`.
    fn update_content(&self, _tab: &mut Tab, _content: &str, _dirty: bool) -> bool {
        false
    }

    /// Applies content that changed on disk to fields holding reference
    /// ("original") text. Must never touch a live edit buffer.
    fn update_reference(&self, _tab: &mut Tab, _content: &str) -> bool {
        false
    }

    /// Path this tab synchronizes on, if the kind takes part in sharing.
    fn content_path<'a>(&self, _tab: &'a Tab) -> Option<&'a Path> {
        None
    }

    fn model_seed<'a>(&self, _tab: &'a Tab) -> Option<ModelSeed<'a>> {
        None
    }

    /// Text the tab currently shows for its content path. Seeds the shared
    /// record when the tab is the first subscriber.
    fn current_content<'a>(&self, tab: &'a Tab) -> Option<&'a str> {
        self.model_seed(tab).map(|seed| seed.content)
    }

    fn include_in_session(&self, _tab: &Tab) -> bool {
        true
    }

    fn serialize_for_session(&self, tab: &Tab) -> Tab {
        tab.clone()
    }

    /// `false` lets session restore skip `restore_content` entirely.
    fn needs_restore(&self) -> bool {
        false
    }

    async fn restore_content(&self, tab: Tab, _ctx: &RestoreContext) -> Result<Tab, RestoreError> {
        Ok(tab)
    }
}

pub type SharedDefinition = Arc<dyn TabTypeDefinition>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    pub overwrite: bool,
}

impl RegisterOptions {
    pub const OVERWRITE: RegisterOptions = RegisterOptions { overwrite: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    Replaced,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Registered(TabKind),
    Replaced(TabKind),
    Unregistered(TabKind),
}

pub type RegistryListener = Box<dyn Fn(&RegistryEvent) -> Result<(), String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct TabTypeRegistry {
    definitions: FxHashMap<TabKind, SharedDefinition>,
    listeners: Vec<(ListenerId, RegistryListener)>,
    next_listener: u64,
}

impl TabTypeRegistry {
    pub fn new() -> Self {
        Self {
            definitions: FxHashMap::default(),
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    pub fn register<D>(&mut self, definition: D, options: RegisterOptions) -> RegisterOutcome
    where
        D: TabTypeDefinition + 'static,
    {
        self.register_shared(Arc::new(definition), options)
    }

    pub fn register_shared(
        &mut self,
        definition: SharedDefinition,
        options: RegisterOptions,
    ) -> RegisterOutcome {
        let kind = definition.kind();
        if self.definitions.contains_key(&kind) && !options.overwrite {
            tracing::warn!(kind = %kind, "tab kind already registered; skipping");
            return RegisterOutcome::Skipped;
        }

        let replaced = self.definitions.insert(kind.clone(), definition).is_some();
        if replaced {
            tracing::debug!(kind = %kind, "tab kind replaced");
            self.notify(&RegistryEvent::Replaced(kind));
            RegisterOutcome::Replaced
        } else {
            tracing::debug!(kind = %kind, "tab kind registered");
            self.notify(&RegistryEvent::Registered(kind));
            RegisterOutcome::Registered
        }
    }

    pub fn unregister(&mut self, kind: &TabKind) -> Option<SharedDefinition> {
        let removed = self.definitions.remove(kind)?;
        self.notify(&RegistryEvent::Unregistered(kind.clone()));
        Some(removed)
    }

    pub fn get(&self, kind: &TabKind) -> Option<SharedDefinition> {
        self.definitions.get(kind).cloned()
    }

    pub fn has(&self, kind: &TabKind) -> bool {
        self.definitions.contains_key(kind)
    }

    /// All definitions, ordered by kind tag.
    pub fn all(&self) -> Vec<SharedDefinition> {
        let mut all: Vec<_> = self.definitions.values().cloned().collect();
        all.sort_by_key(|d| d.kind());
        all
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn subscribe(&mut self, listener: RegistryListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.saturating_add(1);
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&self, event: &RegistryEvent) {
        for (id, listener) in &self.listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(listener = id.0, ?event, %error, "registry listener failed");
                }
                Err(_) => {
                    tracing::warn!(listener = id.0, ?event, "registry listener panicked");
                }
            }
        }
    }
}

impl Default for TabTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/tabs/registry.rs"]
mod tests;
