use serde::{Deserialize, Serialize};

use super::config::EngineConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Restore the previous pane tree on startup.
    pub restore: bool,
    /// Write every dirty record before the session file is stored.
    pub save_dirty_on_exit: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            restore: true,
            save_dirty_on_exit: true,
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
