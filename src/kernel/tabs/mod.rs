//! Tab domain: ids, the tab entity, open descriptors and the kind registry.

mod error;
mod id;
mod kind;
pub mod kinds;
mod registry;
mod source;
mod tab;

pub use error::{RestoreError, TabError};
pub use id::{IdAllocator, PaneId, TabId, TabKey};
pub use kind::{TabCapabilities, TabKind};
pub use registry::{
    ListenerId, ModelSeed, RegisterOptions, RegisterOutcome, RegistryEvent, RegistryListener,
    RestoreContext, SharedDefinition, TabSeed, TabTypeDefinition, TabTypeRegistry,
};
pub use source::{OpenOptions, TabSource};
pub use tab::{
    title_for_path, BinaryPayload, ConflictEntry, ConflictPayload, ConflictResolution,
    DiffPayload, EditorPayload, PreviewMode, PreviewPayload, ReviewPayload, ReviewStatus,
    SettingsPayload, Tab, TabPayload,
};
