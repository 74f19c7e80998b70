//! Breakpoint line sets, kept apart from editing-widget handles so a handle
//! swap never loses them.

use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::kernel::models::{ModelCache, ModelKey};
use crate::kernel::services::ports::DecorationId;
use crate::kernel::tabs::{Tab, TabId};

/// A file path when the tab has one, so every tab on that file shares the set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BreakpointKey {
    Path(PathBuf),
    Tab(TabId),
}

impl BreakpointKey {
    pub fn for_tab(tab: &Tab) -> Self {
        match tab.path() {
            Some(path) => Self::Path(path.to_path_buf()),
            None => Self::Tab(tab.id),
        }
    }
}

#[derive(Default)]
pub struct BreakpointStore {
    sets: FxHashMap<BreakpointKey, BTreeSet<u32>>,
    /// Decorations currently on each handle, line -> id.
    applied: FxHashMap<ModelKey, BTreeMap<u32, DecorationId>>,
}

impl BreakpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips `line` (1-based). Returns whether the line is now set.
    pub fn toggle(&mut self, key: BreakpointKey, line: u32) -> bool {
        if line == 0 {
            return false;
        }
        let set = self.sets.entry(key.clone()).or_default();
        let now_set = if set.remove(&line) {
            false
        } else {
            set.insert(line);
            true
        };
        if set.is_empty() {
            self.sets.remove(&key);
        }
        now_set
    }

    pub fn lines(&self, key: &BreakpointKey) -> Vec<u32> {
        self.sets
            .get(key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &BreakpointKey> {
        self.sets.keys()
    }

    /// Brings the decorations on `model` in line with the set for `key`.
    ///
    /// Lines past the end of the document are skipped but stay in the set.
    /// Only the difference against what was applied last time is sent to the
    /// handle. Returns `false` when the handle is gone or nothing changed.
    pub fn apply_decorations(
        &mut self,
        key: &BreakpointKey,
        models: &mut ModelCache,
        model: ModelKey,
    ) -> bool {
        let Some(handle) = models.model_mut(model) else {
            self.applied.remove(&model);
            return false;
        };
        let line_count = u32::try_from(handle.line_count()).unwrap_or(u32::MAX);
        let wanted: BTreeSet<u32> = self
            .sets
            .get(key)
            .map(|set| set.range(1..=line_count).copied().collect())
            .unwrap_or_default();

        let applied = self.applied.entry(model).or_default();
        let remove: Vec<(u32, DecorationId)> = applied
            .iter()
            .filter(|(line, _)| !wanted.contains(line))
            .map(|(line, id)| (*line, *id))
            .collect();
        let add: Vec<u32> = wanted
            .iter()
            .filter(|line| !applied.contains_key(line))
            .copied()
            .collect();
        if remove.is_empty() && add.is_empty() {
            return false;
        }

        let remove_ids: Vec<DecorationId> = remove.iter().map(|(_, id)| *id).collect();
        let added = handle.delta_decorations(&remove_ids, &add);
        for (line, _) in &remove {
            applied.remove(line);
        }
        for (line, id) in add.into_iter().zip(added) {
            applied.insert(line, id);
        }
        if applied.is_empty() {
            self.applied.remove(&model);
        }
        true
    }

    /// Forgets decoration bookkeeping for a handle that went away.
    pub fn forget_model(&mut self, model: ModelKey) {
        self.applied.remove(&model);
    }

    /// Drops bookkeeping for handles the cache evicted or disposed.
    pub fn prune(&mut self, models: &ModelCache) -> usize {
        let before = self.applied.len();
        self.applied.retain(|model, _| models.model(*model).is_some());
        before - self.applied.len()
    }

    pub fn release(&mut self, key: &BreakpointKey) -> Option<BTreeSet<u32>> {
        self.sets.remove(key)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/breakpoints.rs"]
mod tests;
