//! Built-in tab kinds.

mod binary;
mod conflict;
mod diff;
mod editor;
mod preview;
mod review;
mod settings;

pub use binary::BinaryTabType;
pub use conflict::ConflictTabType;
pub use diff::DiffTabType;
pub use editor::EditorTabType;
pub use preview::PreviewTabType;
pub use review::ReviewTabType;
pub use settings::SettingsTabType;

use super::{RegisterOptions, Tab, TabError, TabKind, TabSource, TabTypeRegistry};

pub fn register_builtin_kinds(registry: &mut TabTypeRegistry) {
    let options = RegisterOptions::default();
    registry.register(EditorTabType, options);
    registry.register(DiffTabType, options);
    registry.register(ReviewTabType, options);
    registry.register(PreviewTabType, options);
    registry.register(ConflictTabType, options);
    registry.register(SettingsTabType, options);
    registry.register(BinaryTabType, options);
}

fn unsupported(kind: TabKind, source: &TabSource) -> TabError {
    TabError::UnsupportedSource {
        kind,
        source_kind: source.inferred_kind(),
    }
}

fn same_path(existing: &Tab, source: &TabSource) -> bool {
    existing.path().is_some() && existing.path() == source.path()
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/tabs/kinds.rs"]
mod tests;
