//! Editing-widget handle cache.
//!
//! Handles live in a slotmap arena; a tab maps to at most one *current* key.
//! When the wanted language changes the old handle is retired rather than
//! disposed, since a renderer may still be attached to it, and is disposed on
//! the next [`ModelCache::collect_retired`]. Every access goes through the
//! arena and checks liveness, so a stale key yields `None` instead of a
//! disposed handle.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

use crate::kernel::language::LanguageId;
use crate::kernel::services::ports::{ModelFactory, TextModel};
use crate::kernel::tabs::TabId;

new_key_type! { pub struct ModelKey; }

struct ModelEntry {
    tab: TabId,
    language: LanguageId,
    handle: Box<dyn TextModel>,
    rank: u64,
}

impl ModelEntry {
    fn is_live(&self) -> bool {
        !self.handle.is_disposed()
    }

    fn dispose(&mut self) -> bool {
        if self.handle.is_disposed() {
            return false;
        }
        self.handle.dispose();
        true
    }
}

/// How [`ModelCache::get_or_create_model`] satisfied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    Reused(ModelKey),
    Created(ModelKey),
    /// Language changed; `retired` stays readable until the next collection.
    Recreated { key: ModelKey, retired: ModelKey },
}

impl Acquired {
    pub fn key(self) -> ModelKey {
        match self {
            Self::Reused(key) | Self::Created(key) | Self::Recreated { key, .. } => key,
        }
    }

    /// The handle is new and carries no decorations yet.
    pub fn is_fresh(self) -> bool {
        !matches!(self, Self::Reused(_))
    }
}

pub struct ModelCache {
    factory: Arc<dyn ModelFactory>,
    capacity: usize,
    arena: SlotMap<ModelKey, ModelEntry>,
    current: FxHashMap<TabId, ModelKey>,
    retired: Vec<ModelKey>,
    versions: FxHashMap<TabId, u32>,
    clock: u64,
}

impl ModelCache {
    pub fn new(factory: Arc<dyn ModelFactory>, capacity: usize) -> Self {
        Self {
            factory,
            capacity: capacity.max(1),
            arena: SlotMap::with_key(),
            current: FxHashMap::default(),
            retired: Vec::new(),
            versions: FxHashMap::default(),
            clock: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current entries, retired handles excluded.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    pub fn contains(&self, tab: TabId) -> bool {
        self.key_for(tab).is_some()
    }

    /// Live current key for `tab`, if any.
    pub fn key_for(&self, tab: TabId) -> Option<ModelKey> {
        let key = *self.current.get(&tab)?;
        self.arena.get(key).filter(|e| e.is_live()).map(|_| key)
    }

    pub fn language_of(&self, tab: TabId) -> Option<LanguageId> {
        let key = self.key_for(tab)?;
        self.arena.get(key).map(|e| e.language)
    }

    pub fn model(&self, key: ModelKey) -> Option<&dyn TextModel> {
        self.arena
            .get(key)
            .filter(|e| e.is_live())
            .map(|e| e.handle.as_ref())
    }

    pub fn model_mut(&mut self, key: ModelKey) -> Option<&mut (dyn TextModel + 'static)> {
        self.arena
            .get_mut(key)
            .filter(|e| e.is_live())
            .map(|e| e.handle.as_mut())
    }

    /// Returns the handle for `tab`, creating, recreating or reusing it.
    pub fn get_or_create_model(
        &mut self,
        tab: TabId,
        content: &str,
        language: LanguageId,
    ) -> Acquired {
        if let Some(&key) = self.current.get(&tab) {
            match self.arena.get(key) {
                Some(entry) if entry.is_live() && entry.language == language => {
                    self.touch(key);
                    return Acquired::Reused(key);
                }
                Some(entry) if entry.is_live() => {
                    tracing::debug!(
                        tab = %tab,
                        from = entry.language.language_id(),
                        to = language.language_id(),
                        "language changed; retiring model"
                    );
                    self.current.remove(&tab);
                    self.retired.push(key);
                    let new_key = self.insert(tab, content, language);
                    return Acquired::Recreated {
                        key: new_key,
                        retired: key,
                    };
                }
                _ => {
                    // Disposed behind our back: drop the stale entry.
                    self.current.remove(&tab);
                    self.arena.remove(key);
                }
            }
        }

        while self.current.len() >= self.capacity {
            if !self.evict_lru() {
                break;
            }
        }
        Acquired::Created(self.insert(tab, content, language))
    }

    /// Disposes and forgets the current handle of `tab`.
    pub fn dispose_model(&mut self, tab: TabId) -> bool {
        self.versions.remove(&tab);
        let Some(key) = self.current.remove(&tab) else {
            return false;
        };
        match self.arena.remove(key) {
            Some(mut entry) => entry.dispose(),
            None => false,
        }
    }

    /// Disposes retired handles. Returns how many were disposed.
    pub fn collect_retired(&mut self) -> usize {
        let mut disposed = 0;
        for key in std::mem::take(&mut self.retired) {
            if let Some(mut entry) = self.arena.remove(key) {
                if entry.dispose() {
                    disposed += 1;
                }
            }
        }
        disposed
    }

    pub fn dispose_all(&mut self) -> usize {
        let mut disposed = 0;
        for (_, mut entry) in self.arena.drain() {
            if entry.dispose() {
                disposed += 1;
            }
        }
        self.current.clear();
        self.retired.clear();
        self.versions.clear();
        disposed
    }

    fn insert(&mut self, tab: TabId, content: &str, language: LanguageId) -> ModelKey {
        let version = self.versions.entry(tab).or_insert(0);
        *version += 1;
        let uri = format!("{tab}#{version}");
        let handle = self.factory.create(&uri, content, language);
        self.clock += 1;
        let key = self.arena.insert(ModelEntry {
            tab,
            language,
            handle,
            rank: self.clock,
        });
        self.current.insert(tab, key);
        key
    }

    fn touch(&mut self, key: ModelKey) {
        self.clock += 1;
        if let Some(entry) = self.arena.get_mut(key) {
            entry.rank = self.clock;
        }
    }

    fn evict_lru(&mut self) -> bool {
        let Some((&tab, &key)) = self
            .current
            .iter()
            .min_by_key(|(_, key)| self.arena.get(**key).map_or(0, |e| e.rank))
        else {
            return false;
        };
        self.current.remove(&tab);
        if let Some(mut entry) = self.arena.remove(key) {
            tracing::debug!(tab = %entry.tab, "model evicted");
            entry.dispose();
        }
        true
    }
}

impl Drop for ModelCache {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/models.rs"]
mod tests;
