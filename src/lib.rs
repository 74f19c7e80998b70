//! ztabs - tab and session engine for a code editor workbench
//!
//! Module layout:
//! - kernel::tabs: tab entity, open descriptors, kind registry, built-in kinds
//! - kernel::content: per-path content records with debounced saves
//! - kernel::models: editing-widget handle cache
//! - kernel::breakpoints: breakpoint line sets and their decorations
//! - kernel::pane / kernel::session: pane tree and its persisted form
//! - kernel::workbench: lifecycle glue over all of the above
//! - kernel::services: ports (traits) and adapters (tokio / OS)

pub mod kernel;
