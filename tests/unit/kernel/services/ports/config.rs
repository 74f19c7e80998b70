use super::*;

#[test]
fn test_default_config() {
    let config = EngineConfig::default();
    assert_eq!(config.autosave_delay(), Duration::from_secs(5));
    assert_eq!(config.model_cache_capacity, 16);
    assert!(!config.reuse_across_panes);
    assert!(config.activate_on_open);
}

#[test]
fn test_cache_capacity_never_zero() {
    let config = EngineConfig {
        model_cache_capacity: 0,
        ..EngineConfig::default()
    };
    assert_eq!(config.cache_capacity(), 1);
}

#[test]
fn test_engine_config_serde_aliases() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        engine: EngineConfig,
    }

    let data = r#"{
      "engine": {
        "autosaveDelayMs": 750,
        "reuse_across_panes": true
      }
    }"#;

    let wrapper: Wrapper = serde_json::from_str(data).unwrap();
    assert_eq!(wrapper.engine.autosave_delay(), Duration::from_millis(750));
    assert!(wrapper.engine.reuse_across_panes);
    assert_eq!(wrapper.engine.model_cache_capacity, 16);
}
