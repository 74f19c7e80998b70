use super::*;
use crate::kernel::tabs::kinds::{register_builtin_kinds, EditorTabType, SettingsTabType};
use crate::kernel::tabs::TabPayload;
use std::sync::Mutex;

struct Stub(&'static str);

impl TabTypeDefinition for Stub {
    fn kind(&self) -> TabKind {
        TabKind::custom(self.0)
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        _source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        Ok(Tab::new(
            seed.id,
            seed.pane,
            self.kind(),
            None,
            TabPayload::Custom(serde_json::Value::Null),
        )
        .with_title(self.0))
    }
}

struct Notebook;

impl TabTypeDefinition for Notebook {
    fn kind(&self) -> TabKind {
        TabKind::custom("notebook")
    }

    fn capabilities(&self) -> TabCapabilities {
        TabCapabilities::editable()
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        _source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        Ok(Tab::new(
            seed.id,
            seed.pane,
            self.kind(),
            None,
            TabPayload::Custom(serde_json::json!({ "cells": [] })),
        ))
    }
}

fn seed() -> TabSeed {
    TabSeed {
        id: TabId::new(1),
        pane: PaneId::new(1),
    }
}

fn recorder(registry: &mut TabTypeRegistry) -> std::sync::Arc<Mutex<Vec<RegistryEvent>>> {
    let events = std::sync::Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    registry.subscribe(Box::new(move |event| {
        sink.lock().unwrap().push(event.clone());
        Ok(())
    }));
    events
}

#[test]
fn duplicate_registration_is_skipped_without_overwrite() {
    let mut registry = TabTypeRegistry::new();
    assert_eq!(
        registry.register(Stub("notebook"), RegisterOptions::default()),
        RegisterOutcome::Registered
    );
    assert_eq!(
        registry.register(Notebook, RegisterOptions::default()),
        RegisterOutcome::Skipped
    );
    let kind = TabKind::custom("notebook");
    let def = registry.get(&kind).unwrap();
    assert_eq!(def.capabilities(), TabCapabilities::NONE);

    assert_eq!(
        registry.register(Notebook, RegisterOptions::OVERWRITE),
        RegisterOutcome::Replaced
    );
    let def = registry.get(&kind).unwrap();
    assert!(def.capabilities().editable);
    assert_eq!(registry.len(), 1);
}

#[test]
fn lookups_and_unregister() {
    let mut registry = TabTypeRegistry::new();
    assert!(registry.is_empty());
    register_builtin_kinds(&mut registry);
    assert_eq!(registry.len(), 7);
    assert!(registry.has(&TabKind::EDITOR));
    assert!(registry.get(&TabKind::custom("missing")).is_none());

    let kinds: Vec<_> = registry.all().iter().map(|d| d.kind()).collect();
    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(kinds, sorted);

    assert!(registry.unregister(&TabKind::SETTINGS).is_some());
    assert!(registry.unregister(&TabKind::SETTINGS).is_none());
    assert!(!registry.has(&TabKind::SETTINGS));
}

#[test]
fn listeners_see_late_registration() {
    let mut registry = TabTypeRegistry::new();
    registry.register(EditorTabType, RegisterOptions::default());
    let events = recorder(&mut registry);

    registry.register(Stub("notebook"), RegisterOptions::default());
    registry.register(Notebook, RegisterOptions::OVERWRITE);
    registry.register(EditorTabType, RegisterOptions::default());
    registry.unregister(&TabKind::custom("notebook"));

    let notebook = TabKind::custom("notebook");
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            RegistryEvent::Registered(notebook.clone()),
            RegistryEvent::Replaced(notebook.clone()),
            RegistryEvent::Unregistered(notebook),
        ]
    );
}

#[test]
fn failing_listeners_do_not_reach_the_registrar() {
    let mut registry = TabTypeRegistry::new();
    registry.subscribe(Box::new(|_| Err("listener broke".to_string())));
    registry.subscribe(Box::new(|_| panic!("listener panicked")));
    let events = recorder(&mut registry);

    assert_eq!(
        registry.register(SettingsTabType, RegisterOptions::default()),
        RegisterOutcome::Registered
    );
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[test]
fn unsubscribed_listener_stops_receiving() {
    let mut registry = TabTypeRegistry::new();
    let events = std::sync::Arc::new(Mutex::new(0usize));
    let sink = events.clone();
    let id = registry.subscribe(Box::new(move |_| {
        *sink.lock().unwrap() += 1;
        Ok(())
    }));

    registry.register(Stub("a"), RegisterOptions::default());
    assert!(registry.unsubscribe(id));
    assert!(!registry.unsubscribe(id));
    registry.register(Stub("b"), RegisterOptions::default());
    assert_eq!(*events.lock().unwrap(), 1);
}

#[test]
fn default_behaviors_opt_out_of_everything() {
    let def = Stub("plain");
    let mut tab = def
        .create_tab(seed(), &TabSource::Settings { section: None }, &OpenOptions::new())
        .unwrap();
    let source = TabSource::Settings { section: None };

    assert!(!def.should_reuse_tab(&tab, &source, &OpenOptions::new()).unwrap());
    assert!(!def.update_content(&mut tab, "x", true));
    assert!(!def.update_reference(&mut tab, "x"));
    assert!(def.content_path(&tab).is_none());
    assert!(def.model_seed(&tab).is_none());
    assert!(def.current_content(&tab).is_none());
    assert!(def.include_in_session(&tab));
    assert_eq!(def.serialize_for_session(&tab), tab);
    assert!(!def.needs_restore());
}
