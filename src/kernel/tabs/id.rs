use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u64);

impl TabId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(u64);

impl PaneId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pane-{}", self.0)
    }
}

/// Address of a tab inside the pane tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabKey {
    pub pane: PaneId,
    pub tab: TabId,
}

impl TabKey {
    pub const fn new(pane: PaneId, tab: TabId) -> Self {
        Self { pane, tab }
    }
}

/// Monotonic id source shared by panes and tabs.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_tab: u64,
    next_pane: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_tab: 1,
            next_pane: 1,
        }
    }

    pub fn tab(&mut self) -> TabId {
        let id = TabId::new(self.next_tab);
        self.next_tab = self.next_tab.saturating_add(1);
        id
    }

    pub fn pane(&mut self) -> PaneId {
        let id = PaneId::new(self.next_pane);
        self.next_pane = self.next_pane.saturating_add(1);
        id
    }

    /// Moves the counters past ids that came from a restored session.
    pub fn observe_tab(&mut self, id: TabId) {
        self.next_tab = self.next_tab.max(id.raw().saturating_add(1));
    }

    pub fn observe_pane(&mut self, id: PaneId) {
        self.next_pane = self.next_pane.max(id.raw().saturating_add(1));
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
