//! Configuration defaults and API key precedence.

use sentinel_app::{AppConfig, default_data_dir, resolve_api_key};

fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn config_resolution_tests_explicit_key_wins() {
    let key = resolve_api_key(Some("flag-key".to_string()), env_of(&[("GEMINI_API_KEY", "env")]));
    assert_eq!(key.as_deref(), Some("flag-key"));
}

#[test]
fn config_resolution_tests_falls_back_in_order() {
    let both = env_of(&[("API_KEY", "generic"), ("GEMINI_API_KEY", "gemini")]);
    assert_eq!(resolve_api_key(None, both).as_deref(), Some("gemini"));

    let generic = env_of(&[("API_KEY", "generic")]);
    assert_eq!(resolve_api_key(None, generic).as_deref(), Some("generic"));
}

#[test]
fn config_resolution_tests_blank_values_are_ignored() {
    let blank = env_of(&[("GEMINI_API_KEY", "  "), ("API_KEY", "generic")]);
    assert_eq!(
        resolve_api_key(Some(String::new()), blank).as_deref(),
        Some("generic")
    );
    assert_eq!(resolve_api_key(None, env_of(&[])), None);
}

#[test]
fn config_resolution_tests_default_config_points_at_sentinel_data_dir() {
    let config = AppConfig::default();
    assert_eq!(config.data_dir, default_data_dir());
    assert!(
        config.data_dir.ends_with("sentinel-llm") || config.data_dir.ends_with(".sentinel")
    );
    assert_eq!(config.provider_model, "gemini-3-pro-preview");
    assert_eq!(config.timeout.as_secs(), 120);
}
