//! Headless tab/session engine.

pub mod breakpoints;
pub mod content;
pub mod language;
pub mod models;
pub mod pane;
pub mod services;
pub mod session;
pub mod tabs;
pub mod workbench;

pub use breakpoints::{BreakpointKey, BreakpointStore};
pub use content::{ContentBroadcast, ContentRecord, ContentStore, ExternalUpdate, SaveOutcome};
pub use language::LanguageId;
pub use models::{Acquired, ModelCache, ModelKey};
pub use pane::{Pane, PaneTree, SplitDirection};
pub use session::{
    PaneSnapshot, RestoreFailure, RestoredSession, SessionError, SessionSnapshot, SplitSnapshot,
    SESSION_VERSION,
};
pub use workbench::{CloseOutcome, EngineServices, Handled, Opened, RestoreReport, Workbench};
