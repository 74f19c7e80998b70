use super::*;
use crate::kernel::services::adapters::RopeModelFactory;

fn cache(capacity: usize) -> (ModelCache, Arc<RopeModelFactory>) {
    let factory = Arc::new(RopeModelFactory::new());
    (ModelCache::new(factory.clone(), capacity), factory)
}

fn tab(raw: u64) -> TabId {
    TabId::new(raw)
}

#[test]
fn same_language_reuses_the_handle() {
    let (mut cache, factory) = cache(4);
    let first = cache.get_or_create_model(tab(1), "fn a() {}", LanguageId::Rust);
    let second = cache.get_or_create_model(tab(1), "ignored", LanguageId::Rust);

    assert!(matches!(first, Acquired::Created(_)));
    assert_eq!(second, Acquired::Reused(first.key()));
    assert!(!second.is_fresh());
    assert_eq!(factory.created(), 1);
    assert_eq!(cache.model(first.key()).unwrap().text(), "fn a() {}");
    assert_eq!(cache.model(first.key()).unwrap().uri(), "tab-1#1");
}

#[test]
fn language_change_retires_instead_of_disposing() {
    let (mut cache, _factory) = cache(4);
    let old = cache
        .get_or_create_model(tab(1), "# notes", LanguageId::PlainText)
        .key();

    let acquired = cache.get_or_create_model(tab(1), "# notes", LanguageId::Markdown);
    let Acquired::Recreated { key, retired } = acquired else {
        panic!("expected recreation, got {acquired:?}");
    };
    assert_eq!(retired, old);
    assert_ne!(key, old);
    assert_eq!(cache.key_for(tab(1)), Some(key));
    assert_eq!(cache.language_of(tab(1)), Some(LanguageId::Markdown));
    assert_eq!(cache.model(key).unwrap().uri(), "tab-1#2");

    // Still attached elsewhere until collected.
    assert!(cache.model(old).is_some());
    assert_eq!(cache.retired_len(), 1);
    assert_eq!(cache.len(), 1);

    assert_eq!(cache.collect_retired(), 1);
    assert!(cache.model(old).is_none());
    assert_eq!(cache.collect_retired(), 0);
}

#[test]
fn capacity_evicts_least_recently_used() {
    let (mut cache, _factory) = cache(2);
    let a = cache.get_or_create_model(tab(1), "a", LanguageId::PlainText).key();
    let b = cache.get_or_create_model(tab(2), "b", LanguageId::PlainText).key();

    // Touch the oldest entry so the other one becomes the eviction candidate.
    cache.get_or_create_model(tab(1), "a", LanguageId::PlainText);
    let c = cache.get_or_create_model(tab(3), "c", LanguageId::PlainText).key();

    assert_eq!(cache.len(), 2);
    assert!(cache.contains(tab(1)));
    assert!(!cache.contains(tab(2)));
    assert!(cache.contains(tab(3)));
    assert!(cache.model(a).is_some());
    assert!(cache.model(b).is_none());
    assert!(cache.model(c).is_some());
}

#[test]
fn k_plus_one_creations_evict_exactly_one() {
    let (mut cache, factory) = cache(3);
    for raw in 1..=4 {
        cache.get_or_create_model(tab(raw), "x", LanguageId::PlainText);
    }
    assert_eq!(factory.created(), 4);
    assert_eq!(cache.len(), 3);
    assert!(!cache.contains(tab(1)));
}

#[test]
fn disposal_is_guarded_against_repeats() {
    let (mut cache, _factory) = cache(4);
    let key = cache.get_or_create_model(tab(1), "x", LanguageId::PlainText).key();

    assert!(cache.dispose_model(tab(1)));
    assert!(!cache.dispose_model(tab(1)));
    assert!(cache.model(key).is_none());
    assert!(cache.model_mut(key).is_none());
}

#[test]
fn externally_disposed_handle_is_replaced() {
    let (mut cache, factory) = cache(4);
    let key = cache.get_or_create_model(tab(1), "x", LanguageId::PlainText).key();
    cache.arena.get_mut(key).unwrap().handle.dispose();

    assert_eq!(cache.key_for(tab(1)), None);
    let acquired = cache.get_or_create_model(tab(1), "x", LanguageId::PlainText);
    assert!(matches!(acquired, Acquired::Created(_)));
    assert_ne!(acquired.key(), key);
    assert_eq!(factory.created(), 2);
}

#[test]
fn dispose_all_includes_retired_handles() {
    let (mut cache, _factory) = cache(4);
    cache.get_or_create_model(tab(1), "x", LanguageId::PlainText);
    cache.get_or_create_model(tab(1), "x", LanguageId::Rust);
    cache.get_or_create_model(tab(2), "y", LanguageId::PlainText);

    assert_eq!(cache.dispose_all(), 3);
    assert!(cache.is_empty());
    assert_eq!(cache.retired_len(), 0);
    assert_eq!(cache.dispose_all(), 0);
}
