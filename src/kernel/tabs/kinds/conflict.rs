use super::{same_path, unsupported};
use crate::kernel::tabs::{
    ConflictPayload, OpenOptions, Tab, TabCapabilities, TabError, TabKind, TabPayload, TabSeed,
    TabSource, TabTypeDefinition,
};

/// Merge-conflict resolver over precomputed conflict entries.
///
/// Entries are small and not derivable from the working file, so the tab is
/// persisted as is and skips restoration.
pub struct ConflictTabType;

impl TabTypeDefinition for ConflictTabType {
    fn kind(&self) -> TabKind {
        TabKind::CONFLICT
    }

    fn capabilities(&self) -> TabCapabilities {
        TabCapabilities::editable()
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        let TabSource::Conflict { path, entries } = source else {
            return Err(unsupported(self.kind(), source));
        };
        let payload = ConflictPayload {
            entries: entries.clone(),
        };
        let tab = Tab::new(
            seed.id,
            seed.pane,
            self.kind(),
            Some(path.clone()),
            TabPayload::Conflict(payload),
        );
        let title = format!("Merge {}", tab.title);
        Ok(tab.with_title(title))
    }

    fn should_reuse_tab(
        &self,
        existing: &Tab,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<bool, TabError> {
        Ok(*existing.kind() == TabKind::CONFLICT && same_path(existing, source))
    }
}
