use super::*;
use crate::kernel::language::LanguageId;
use crate::kernel::services::adapters::MemoryFileStore;
use crate::kernel::tabs::{
    ConflictEntry, ConflictResolution, OpenOptions, PaneId, PreviewMode, RestoreContext,
    RestoreError, ReviewStatus, TabId, TabPayload, TabSeed, TabTypeDefinition,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn seed(id: u64) -> TabSeed {
    TabSeed {
        id: TabId::new(id),
        pane: PaneId::new(1),
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn ctx(files: MemoryFileStore) -> RestoreContext {
    RestoreContext::new(Arc::new(files))
}

fn create(def: &dyn TabTypeDefinition, id: u64, source: &TabSource) -> Tab {
    def.create_tab(seed(id), source, &OpenOptions::new()).unwrap()
}

fn suggested(path: &str, suggested: &str) -> TabSource {
    TabSource::SuggestedEdit {
        path: PathBuf::from(path),
        original: "fn a() {}".to_string(),
        suggested: suggested.to_string(),
        description: None,
    }
}

#[test]
fn builtin_registration_covers_every_kind() {
    let mut registry = TabTypeRegistry::new();
    register_builtin_kinds(&mut registry);
    for kind in [
        TabKind::EDITOR,
        TabKind::DIFF,
        TabKind::REVIEW,
        TabKind::PREVIEW,
        TabKind::CONFLICT,
        TabKind::SETTINGS,
        TabKind::BINARY,
    ] {
        assert_eq!(registry.get(&kind).map(|d| d.kind()), Some(kind));
    }
}

#[test]
fn editor_builds_from_files_only() {
    let def = EditorTabType;
    let tab = create(&def, 1, &TabSource::file("/w/src/main.rs", "fn main() {}"));
    assert_eq!(tab.title, "main.rs");
    assert_eq!(tab.path(), Some(Path::new("/w/src/main.rs")));
    let model = def.model_seed(&tab).unwrap();
    assert_eq!(model.content, "fn main() {}");
    assert_eq!(model.language, LanguageId::Rust);

    let err = def
        .create_tab(seed(9), &TabSource::Settings { section: None }, &OpenOptions::new())
        .unwrap_err();
    assert!(matches!(
        err,
        TabError::UnsupportedSource { kind, .. } if kind == TabKind::EDITOR
    ));
}

#[test]
fn editor_reuses_only_the_same_path() {
    let def = EditorTabType;
    let tab = create(&def, 1, &TabSource::file("/w/a.rs", "a"));
    let options = OpenOptions::new();
    assert!(def
        .should_reuse_tab(&tab, &TabSource::file("/w/a.rs", "other"), &options)
        .unwrap());
    assert!(!def
        .should_reuse_tab(&tab, &TabSource::file("/w/b.rs", "a"), &options)
        .unwrap());
}

#[test]
fn editor_update_is_a_no_op_when_nothing_changes() {
    let def = EditorTabType;
    let mut tab = create(&def, 1, &TabSource::file("/w/a.rs", "a"));
    assert!(!def.update_content(&mut tab, "a", false));
    assert!(def.update_content(&mut tab, "a", true));
    assert!(tab.dirty);
    assert!(def.update_content(&mut tab, "b", true));
    assert_eq!(def.current_content(&tab), Some("b"));
}

#[test]
fn editor_session_form_drops_the_buffer_and_restores_from_disk() {
    let def = EditorTabType;
    let mut tab = create(&def, 1, &TabSource::file("/w/a.rs", "a"));
    tab.dirty = true;
    let stored = def.serialize_for_session(&tab);
    assert!(!stored.dirty);
    assert!(matches!(&stored.payload, TabPayload::Editor(p) if p.content.is_none()));

    let files = MemoryFileStore::new().with_file("/w/a.rs", "from disk");
    let restored = block_on(def.restore_content(stored.clone(), &ctx(files))).unwrap();
    assert_eq!(def.current_content(&restored), Some("from disk"));

    let err = block_on(def.restore_content(stored, &ctx(MemoryFileStore::new()))).unwrap_err();
    assert!(matches!(err, RestoreError::File { .. }));
}

#[test]
fn diff_reference_side_moves_only_through_update_reference() {
    let def = DiffTabType;
    let source = TabSource::Diff {
        path: PathBuf::from("/w/a.rs"),
        original: "old".to_string(),
        modified: "new".to_string(),
        original_label: None,
    };
    let mut tab = create(&def, 1, &source);
    assert_eq!(tab.title, "a.rs (diff)");

    assert!(def.update_content(&mut tab, "newer", true));
    assert!(def.update_reference(&mut tab, "disk"));
    assert!(!def.update_reference(&mut tab, "disk"));
    match &tab.payload {
        TabPayload::Diff(p) => {
            assert_eq!(p.original.as_deref(), Some("disk"));
            assert_eq!(p.modified.as_deref(), Some("newer"));
            assert_eq!(p.original_label, "HEAD");
        }
        other => panic!("unexpected payload {other:?}"),
    }

    let stored = def.serialize_for_session(&tab);
    let files = MemoryFileStore::new().with_file("/w/a.rs", "saved");
    let restored = block_on(def.restore_content(stored, &ctx(files))).unwrap();
    match &restored.payload {
        TabPayload::Diff(p) => {
            assert_eq!(p.original.as_deref(), Some("saved"));
            assert_eq!(p.modified.as_deref(), Some("saved"));
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn review_reuse_needs_the_same_suggestion() {
    let def = ReviewTabType;
    let tab = create(&def, 1, &suggested("/w/a.rs", "fn a() { 1 }"));
    assert_eq!(tab.title, "Review: a.rs");
    let options = OpenOptions::new();
    assert!(def
        .should_reuse_tab(&tab, &suggested("/w/a.rs", "fn a() { 1 }"), &options)
        .unwrap());
    assert!(!def
        .should_reuse_tab(&tab, &suggested("/w/a.rs", "fn a() { 2 }"), &options)
        .unwrap());
    assert!(!def
        .should_reuse_tab(&tab, &suggested("/w/b.rs", "fn a() { 1 }"), &options)
        .unwrap());
}

#[test]
fn review_original_only_follows_persisted_text() {
    let def = ReviewTabType;
    let mut tab = create(&def, 1, &suggested("/w/a.rs", "x"));

    assert!(def.update_content(&mut tab, "typing", true));
    assert!(tab.dirty);
    assert!(matches!(&tab.payload, TabPayload::Review(p) if p.original.as_deref() == Some("fn a() {}")));
    assert!(!def.update_content(&mut tab, "typing more", true));

    assert!(def.update_content(&mut tab, "saved", false));
    assert!(!tab.dirty);
    assert!(matches!(&tab.payload, TabPayload::Review(p) if p.original.as_deref() == Some("saved")));
}

#[test]
fn settled_reviews_are_left_out_of_the_session() {
    let def = ReviewTabType;
    let mut tab = create(&def, 1, &suggested("/w/a.rs", "x"));
    assert!(def.include_in_session(&tab));
    if let TabPayload::Review(p) = &mut tab.payload {
        p.status = ReviewStatus::Accepted;
    }
    assert!(!def.include_in_session(&tab));

    let stored = def.serialize_for_session(&tab);
    assert!(matches!(&stored.payload, TabPayload::Review(p) if p.original.is_none() && p.suggested == "x"));
}

#[test]
fn preview_picks_mode_from_the_file_type() {
    let def = PreviewTabType;
    let web = create(&def, 1, &TabSource::file("/w/index.html", "<p>"));
    let md = create(&def, 2, &TabSource::file("/w/README.md", "# hi"));
    assert!(matches!(&web.payload, TabPayload::Preview(p) if p.mode == PreviewMode::Web));
    assert!(matches!(&md.payload, TabPayload::Preview(p) if p.mode == PreviewMode::Markdown));
    assert_eq!(md.title, "Preview README.md");
    assert_eq!(def.current_content(&md), Some("# hi"));
    assert!(def.model_seed(&md).is_none());
}

#[test]
fn a_single_settings_tab_is_shared() {
    let def = SettingsTabType;
    let tab = create(&def, 1, &TabSource::Settings { section: None });
    assert_eq!(tab.title, "Settings");
    assert!(tab.path().is_none());
    let other = TabSource::Settings {
        section: Some("engine".to_string()),
    };
    assert!(def.should_reuse_tab(&tab, &other, &OpenOptions::new()).unwrap());
}

#[test]
fn conflict_tabs_persist_their_entries() {
    let def = ConflictTabType;
    let entries = vec![
        ConflictEntry {
            start_line: 3,
            ours: "a".to_string(),
            theirs: "b".to_string(),
            base: None,
            resolution: Some(ConflictResolution::Ours),
        },
        ConflictEntry {
            start_line: 9,
            ours: "c".to_string(),
            theirs: "d".to_string(),
            base: Some("e".to_string()),
            resolution: None,
        },
    ];
    let tab = create(
        &def,
        1,
        &TabSource::Conflict {
            path: PathBuf::from("/w/a.rs"),
            entries,
        },
    );
    assert_eq!(tab.title, "Merge a.rs");
    assert!(!def.needs_restore());
    assert_eq!(def.serialize_for_session(&tab), tab);
    assert!(matches!(&tab.payload, TabPayload::Conflict(p) if p.unresolved() == 1));
}

#[test]
fn binary_tabs_reload_their_bytes() {
    let def = BinaryTabType;
    let source = TabSource::Bytes {
        path: PathBuf::from("/w/logo.png"),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    };
    let tab = create(&def, 1, &source);
    let stored = def.serialize_for_session(&tab);
    assert!(matches!(&stored.payload, TabPayload::Binary(p) if p.bytes.is_none() && p.size == 4));

    let files = MemoryFileStore::new().with_file("/w/logo.png", vec![1u8, 2, 3]);
    let restored = block_on(def.restore_content(stored, &ctx(files))).unwrap();
    assert!(matches!(
        &restored.payload,
        TabPayload::Binary(p) if p.bytes.as_deref() == Some(&[1u8, 2, 3][..]) && p.size == 3
    ));
}
