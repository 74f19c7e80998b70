use super::*;

#[test]
fn empty_document_yields_defaults() {
    let settings: Settings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, Settings::default());
    assert!(settings.session.restore);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let data = r#"{
      "engine": { "model_cache_capacity": 4 },
      "session": { "restore": false }
    }"#;
    let settings: Settings = serde_json::from_str(data).unwrap();

    assert_eq!(settings.engine.model_cache_capacity, 4);
    assert_eq!(settings.engine.autosave_delay_ms, 5_000);
    assert!(!settings.session.restore);
    assert!(settings.session.save_dirty_on_exit);
}

#[test]
fn settings_serde_roundtrip() {
    let original = Settings::default();
    let json = serde_json::to_string_pretty(&original).expect("serialize Settings");
    let decoded: Settings = serde_json::from_str(&json).expect("deserialize Settings");
    assert_eq!(decoded, original);
}
