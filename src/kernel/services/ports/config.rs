use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period after the last edit before a path is written.
    #[serde(alias = "autosaveDelayMs")]
    pub autosave_delay_ms: u64,
    /// Live editing-widget handles kept before the least recently used one is evicted.
    #[serde(alias = "modelCacheCapacity")]
    pub model_cache_capacity: usize,
    /// Reuse a matching tab from any pane, not only the target pane.
    #[serde(alias = "reuseAcrossPanes")]
    pub reuse_across_panes: bool,
    #[serde(alias = "activateOnOpen")]
    pub activate_on_open: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 5_000,
            model_cache_capacity: 16,
            reuse_across_panes: false,
            activate_on_open: true,
        }
    }
}

impl EngineConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn cache_capacity(&self) -> usize {
        self.model_cache_capacity.max(1)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/config.rs"]
mod tests;
