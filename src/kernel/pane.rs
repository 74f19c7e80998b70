//! Pane tree: leaf panes hold tabs, container panes hold an ordered list of
//! child panes laid out in one direction.
//!
//! Panes live in a flat map keyed by id. `parent` is a back-reference only;
//! ownership always runs root to leaves through `children`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::kernel::tabs::{IdAllocator, PaneId, Tab, TabError, TabId, TabKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitDirection {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    id: PaneId,
    parent: Option<PaneId>,
    tabs: Vec<Tab>,
    active: Option<TabId>,
    children: Vec<PaneId>,
    direction: Option<SplitDirection>,
}

impl Pane {
    pub(crate) fn leaf(id: PaneId, parent: Option<PaneId>) -> Self {
        Self {
            id,
            parent,
            tabs: Vec::new(),
            active: None,
            children: Vec::new(),
            direction: None,
        }
    }

    pub(crate) fn container(
        id: PaneId,
        parent: Option<PaneId>,
        direction: SplitDirection,
        children: Vec<PaneId>,
    ) -> Self {
        Self {
            id,
            parent,
            tabs: Vec::new(),
            active: None,
            children,
            direction: Some(direction),
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn parent(&self) -> Option<PaneId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.direction.is_none()
    }

    pub fn direction(&self) -> Option<SplitDirection> {
        self.direction
    }

    pub fn children(&self) -> &[PaneId] {
        &self.children
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.tab(id))
    }

    /// Appends `tab`, owned by this pane from now on.
    pub(crate) fn push_tab(&mut self, mut tab: Tab) -> TabKey {
        tab.pane = self.id;
        let key = TabKey::new(self.id, tab.id);
        self.tabs.push(tab);
        key
    }

    pub fn set_active(&mut self, id: TabId) -> bool {
        if self.position(id).is_none() || self.active == Some(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub(crate) fn set_active_unchecked(&mut self, id: Option<TabId>) {
        self.active = id.filter(|id| self.position(*id).is_some());
    }

    /// Removes a tab. When it was active, the left neighbor becomes active,
    /// else the right one, else none.
    pub(crate) fn remove_tab(&mut self, id: TabId) -> Option<Tab> {
        let index = self.position(id)?;
        let tab = self.tabs.remove(index);
        if self.active == Some(id) {
            self.active = if index > 0 {
                self.tabs.get(index - 1).map(|t| t.id)
            } else {
                self.tabs.first().map(|t| t.id)
            };
        }
        Some(tab)
    }

    pub fn next_tab(&mut self) -> bool {
        self.step(1)
    }

    pub fn prev_tab(&mut self) -> bool {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> bool {
        let len = self.tabs.len();
        if len <= 1 {
            return false;
        }
        let current = self.active.and_then(|id| self.position(id)).unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        let prev = self.active;
        self.active = Some(self.tabs[next].id);
        self.active != prev
    }
}

#[derive(Debug, Clone)]
pub struct PaneTree {
    panes: FxHashMap<PaneId, Pane>,
    root: PaneId,
    active: PaneId,
}

impl PaneTree {
    pub fn new(root: PaneId) -> Self {
        let mut panes = FxHashMap::default();
        panes.insert(root, Pane::leaf(root, None));
        Self {
            panes,
            root,
            active: root,
        }
    }

    /// Builds a tree from panes that already link to each other. `active`
    /// falls back to the first leaf when it does not name one.
    pub(crate) fn from_panes(
        root: PaneId,
        active: PaneId,
        panes: Vec<Pane>,
    ) -> Result<Self, String> {
        let mut map = FxHashMap::default();
        for pane in panes {
            let id = pane.id;
            if map.insert(id, pane).is_some() {
                return Err(format!("duplicate {id}"));
            }
        }
        if !map.contains_key(&root) {
            return Err(format!("root {root} missing"));
        }
        let mut tree = Self {
            panes: map,
            root,
            active,
        };
        for pane in tree.panes.values() {
            for child in &pane.children {
                if tree.panes.get(child).and_then(|c| c.parent) != Some(pane.id) {
                    return Err(format!("{child} is not linked to parent {}", pane.id));
                }
            }
        }
        if !tree.pane(active).is_some_and(Pane::is_leaf) {
            tree.active = tree.leaves().first().copied().unwrap_or(root);
        }
        Ok(tree)
    }

    pub fn root(&self) -> PaneId {
        self.root
    }

    pub fn active_pane(&self) -> PaneId {
        self.active
    }

    pub fn set_active_pane(&mut self, id: PaneId) -> Result<bool, TabError> {
        self.leaf(id)?;
        let changed = self.active != id;
        self.active = id;
        Ok(changed)
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.get(&id)
    }

    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.get_mut(&id)
    }

    pub fn pane_ids(&self) -> Vec<PaneId> {
        let mut ids: Vec<_> = self.panes.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    pub fn leaf(&self, id: PaneId) -> Result<&Pane, TabError> {
        let pane = self.panes.get(&id).ok_or(TabError::MissingPane(id))?;
        if !pane.is_leaf() {
            return Err(TabError::NotALeaf(id));
        }
        Ok(pane)
    }

    pub fn leaf_mut(&mut self, id: PaneId) -> Result<&mut Pane, TabError> {
        let pane = self.panes.get_mut(&id).ok_or(TabError::MissingPane(id))?;
        if !pane.is_leaf() {
            return Err(TabError::NotALeaf(id));
        }
        Ok(pane)
    }

    /// Leaf panes in layout order (depth first, children in order).
    pub fn leaves(&self) -> Vec<PaneId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(pane) = self.panes.get(&id) else {
                continue;
            };
            if pane.is_leaf() {
                out.push(id);
            } else {
                stack.extend(pane.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn tab(&self, key: TabKey) -> Option<&Tab> {
        self.panes.get(&key.pane)?.tab(key.tab)
    }

    pub fn tab_mut(&mut self, key: TabKey) -> Option<&mut Tab> {
        self.panes.get_mut(&key.pane)?.tab_mut(key.tab)
    }

    pub fn find_tab(&self, id: TabId) -> Option<TabKey> {
        self.leaves().into_iter().find_map(|pane| {
            self.panes
                .get(&pane)
                .and_then(|p| p.tab(id))
                .map(|_| TabKey::new(pane, id))
        })
    }

    /// Every tab with its key, in layout order.
    pub fn tabs(&self) -> Vec<(TabKey, &Tab)> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.panes.get(&id))
            .flat_map(|pane| {
                pane.tabs
                    .iter()
                    .map(move |tab| (TabKey::new(pane.id, tab.id), tab))
            })
            .collect()
    }

    pub fn tab_count(&self) -> usize {
        self.panes.values().map(|p| p.tabs.len()).sum()
    }

    pub fn insert_tab(&mut self, pane: PaneId, tab: Tab) -> Result<TabKey, TabError> {
        Ok(self.leaf_mut(pane)?.push_tab(tab))
    }

    pub fn remove_tab(&mut self, key: TabKey) -> Result<Tab, TabError> {
        self.leaf_mut(key.pane)?
            .remove_tab(key.tab)
            .ok_or(TabError::MissingTab {
                pane: key.pane,
                tab: key.tab,
            })
    }

    pub fn activate(&mut self, key: TabKey) -> Result<bool, TabError> {
        let pane = self.leaf_mut(key.pane)?;
        if pane.position(key.tab).is_none() {
            return Err(TabError::MissingTab {
                pane: key.pane,
                tab: key.tab,
            });
        }
        let changed = pane.set_active(key.tab);
        Ok(self.set_active_pane(key.pane)? || changed)
    }

    /// Splits leaf `pane`, adding an empty leaf after it. Returns the new leaf.
    ///
    /// A parent already laid out in `direction` just gains a sibling; otherwise
    /// a container takes the pane's place and holds it plus the new leaf.
    pub fn split(
        &mut self,
        pane: PaneId,
        direction: SplitDirection,
        ids: &mut IdAllocator,
    ) -> Result<PaneId, TabError> {
        let parent = self.leaf(pane)?.parent;
        let new_leaf = ids.pane();

        if let Some(parent_id) = parent {
            if let Some(parent_pane) = self.panes.get_mut(&parent_id) {
                if parent_pane.direction == Some(direction) {
                    let at = parent_pane
                        .children
                        .iter()
                        .position(|c| *c == pane)
                        .map_or(parent_pane.children.len(), |i| i + 1);
                    parent_pane.children.insert(at, new_leaf);
                    self.panes.insert(new_leaf, Pane::leaf(new_leaf, Some(parent_id)));
                    return Ok(new_leaf);
                }
            }
        }

        let container = ids.pane();
        self.replace_child(parent, pane, container);
        self.panes.insert(
            container,
            Pane::container(container, parent, direction, vec![pane, new_leaf]),
        );
        self.panes.insert(new_leaf, Pane::leaf(new_leaf, Some(container)));
        if let Some(p) = self.panes.get_mut(&pane) {
            p.parent = Some(container);
        }
        Ok(new_leaf)
    }

    /// Removes leaf `pane`, moving its tabs to the end of the neighboring
    /// leaf (previous sibling first). Containers left with one child collapse
    /// into it. Returns the leaf that received the tabs.
    pub fn merge(&mut self, pane: PaneId) -> Result<PaneId, TabError> {
        let parent_id = self.leaf(pane)?.parent.ok_or(TabError::LastPane(pane))?;
        let siblings = self
            .panes
            .get(&parent_id)
            .map(|p| p.children.clone())
            .unwrap_or_default();
        let index = siblings.iter().position(|c| *c == pane).unwrap_or(0);
        let neighbor = if index > 0 {
            siblings[index - 1]
        } else {
            siblings
                .get(index + 1)
                .copied()
                .ok_or(TabError::LastPane(pane))?
        };
        let target = if index > 0 {
            self.last_leaf(neighbor)
        } else {
            self.first_leaf(neighbor)
        };

        let Some(removed) = self.panes.remove(&pane) else {
            return Err(TabError::MissingPane(pane));
        };
        let target_pane = self.leaf_mut(target)?;
        let had_tabs = !target_pane.tabs.is_empty();
        for tab in removed.tabs {
            target_pane.push_tab(tab);
        }
        if !had_tabs {
            target_pane.set_active_unchecked(removed.active);
        }

        if let Some(parent) = self.panes.get_mut(&parent_id) {
            parent.children.retain(|c| *c != pane);
        }
        self.collapse(parent_id);
        if self.active == pane || !self.panes.contains_key(&self.active) {
            self.active = target;
        }
        Ok(target)
    }

    fn collapse(&mut self, container: PaneId) {
        let Some(pane) = self.panes.get(&container) else {
            return;
        };
        if pane.children.len() != 1 {
            return;
        }
        let only = pane.children[0];
        let grandparent = pane.parent;
        self.panes.remove(&container);
        self.replace_child(grandparent, container, only);
        if let Some(child) = self.panes.get_mut(&only) {
            child.parent = grandparent;
        }
    }

    fn replace_child(&mut self, parent: Option<PaneId>, old: PaneId, new: PaneId) {
        match parent {
            Some(parent) => {
                if let Some(p) = self.panes.get_mut(&parent) {
                    for child in p.children.iter_mut().filter(|c| **c == old) {
                        *child = new;
                    }
                }
            }
            None => self.root = new,
        }
    }

    fn first_leaf(&self, mut id: PaneId) -> PaneId {
        while let Some(first) = self.panes.get(&id).and_then(|p| p.children.first()) {
            id = *first;
        }
        id
    }

    fn last_leaf(&self, mut id: PaneId) -> PaneId {
        while let Some(last) = self.panes.get(&id).and_then(|p| p.children.last()) {
            id = *last;
        }
        id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/pane.rs"]
mod tests;
