use super::unsupported;
use crate::kernel::tabs::{
    OpenOptions, SettingsPayload, Tab, TabError, TabKind, TabPayload, TabSeed, TabSource,
    TabTypeDefinition,
};

/// Settings page. At most one per scan scope: any settings tab is reused.
pub struct SettingsTabType;

impl TabTypeDefinition for SettingsTabType {
    fn kind(&self) -> TabKind {
        TabKind::SETTINGS
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        let TabSource::Settings { section } = source else {
            return Err(unsupported(self.kind(), source));
        };
        let payload = SettingsPayload {
            section: section.clone(),
        };
        Ok(Tab::new(seed.id, seed.pane, self.kind(), None, TabPayload::Settings(payload))
            .with_title("Settings"))
    }

    fn should_reuse_tab(
        &self,
        existing: &Tab,
        _source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<bool, TabError> {
        Ok(*existing.kind() == TabKind::SETTINGS)
    }
}
