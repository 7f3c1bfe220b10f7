use std::fs;

use powersearch_core::config::{self, Config, ConfigError};

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.debounce_ms, 300);
    assert_eq!(cfg.shortcuts, vec!["Ctrl+K".to_string(), "Meta+K".to_string()]);
    assert!(cfg.preferences_db_path.to_string_lossy().contains("powersearch"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn default_shortcuts_parse_to_ctrl_and_meta_k() {
    use powersearch_core::shortcut::KeyEvent;

    let chords = Config::default().key_chords().unwrap();
    assert_eq!(chords.len(), 2);
    assert!(chords[0].matches(&KeyEvent::new("k").ctrl()));
    assert!(chords[1].matches(&KeyEvent::new("k").meta()));
    assert!(!chords[0].matches(&KeyEvent::new("k").meta()));
}

#[test]
fn rejects_non_http_site() {
    let cfg = Config {
        site_url: "contoso.sharepoint.com".to_string(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn rejects_debounce_out_of_range() {
    let cfg = Config {
        debounce_ms: 10,
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn rejects_unparseable_shortcut() {
    let cfg = Config {
        shortcuts: vec!["Hyper+K".to_string()],
        ..Default::default()
    };
    let error = config::validate(&cfg).unwrap_err();
    assert!(error.contains("Hyper+K"));
}

#[test]
fn missing_file_yields_defaults_at_that_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.site_url, Config::default().site_url);
}

#[test]
fn loads_toml_with_tuning_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
site_url = "https://fabrikam.sharepoint.com"
debounce_ms = 150

[tuning]
row_limit = 25
trim_duplicates = true
"#,
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.site_url, "https://fabrikam.sharepoint.com");
    assert_eq!(cfg.debounce_ms, 150);

    let tuning = cfg.search_tuning();
    assert_eq!(tuning.row_limit, 25);
    assert!(tuning.trim_duplicates);
    assert_eq!(tuning.summary_length, 300);
}

#[test]
fn loads_json5_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json5");
    fs::write(
        &path,
        "{ // comments are allowed\n  site_url: 'https://fabrikam.sharepoint.com', shortcuts: ['Ctrl+Shift+F'], }",
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.shortcuts, vec!["Ctrl+Shift+F".to_string()]);
}

#[test]
fn invalid_values_in_file_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "request_timeout_secs = 0\n").unwrap();

    assert!(matches!(config::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "site_url: x\n").unwrap();

    assert!(matches!(
        config::load(Some(&path)),
        Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
    ));
}

#[test]
fn save_then_load_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = Config {
        config_path: dir.path().join("nested").join("config.toml"),
        debounce_ms: 450,
        ..Default::default()
    };
    cfg.tuning.row_limit = Some(100);
    config::save(&cfg).unwrap();

    let loaded = config::load(Some(&cfg.config_path)).unwrap();
    assert_eq!(loaded, cfg);
}
