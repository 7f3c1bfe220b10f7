use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query_builder::SearchTuning;
use crate::shortcut::{parse_chord, ChordError, KeyChord};

const APP_DIR_NAME: &str = "powersearch";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("json5 parse error: {0}")]
    Json5Parse(#[from] json5::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim_duplicates: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site_url: String,
    pub access_token_env: String,
    pub preferences_db_path: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
    pub log_level: String,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub shortcuts: Vec<String>,
    pub tuning: TuningOverrides,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            site_url: "https://contoso.sharepoint.com".to_string(),
            access_token_env: "POWERSEARCH_TOKEN".to_string(),
            preferences_db_path: base.join("preferences.sqlite3"),
            config_path: base.join("config.toml"),
            log_level: "info".to_string(),
            debounce_ms: 300,
            request_timeout_secs: 30,
            shortcuts: vec!["Ctrl+K".to_string(), "Meta+K".to_string()],
            tuning: TuningOverrides::default(),
        }
    }
}

impl Config {
    pub fn search_tuning(&self) -> SearchTuning {
        let mut tuning = SearchTuning::default();
        let overrides = &self.tuning;
        if let Some(row_limit) = overrides.row_limit {
            tuning.row_limit = row_limit;
        }
        if let Some(summary_length) = overrides.summary_length {
            tuning.summary_length = summary_length;
        }
        if let Some(trim) = overrides.trim_duplicates {
            tuning.trim_duplicates = trim;
        }
        if let Some(source_id) = &overrides.source_id {
            tuning.source_id = source_id.clone();
        }
        if let Some(template) = &overrides.query_template {
            tuning.query_template = template.clone();
        }
        tuning
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }

    pub fn key_chords(&self) -> Result<Vec<KeyChord>, ChordError> {
        self.shortcuts.iter().map(|raw| parse_chord(raw)).collect()
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    let site = cfg.site_url.trim();
    if site.is_empty() {
        return Err("site_url is required".into());
    }
    if !(site.starts_with("https://") || site.starts_with("http://")) {
        return Err("site_url must be an http(s) url".into());
    }

    if !(50..=2000).contains(&cfg.debounce_ms) {
        return Err("debounce_ms out of range".into());
    }

    if cfg.request_timeout_secs == 0 {
        return Err("request_timeout_secs must be positive".into());
    }

    if let Some(row_limit) = cfg.tuning.row_limit {
        if !(1..=500).contains(&row_limit) {
            return Err("tuning.row_limit out of range".into());
        }
    }

    if let Some(summary_length) = cfg.tuning.summary_length {
        if summary_length > 10_000 {
            return Err("tuning.summary_length out of range".into());
        }
    }

    if cfg.preferences_db_path.as_os_str().is_empty() {
        return Err("preferences_db_path is required".into());
    }

    if cfg.shortcuts.is_empty() {
        return Err("at least one shortcut is required".into());
    }
    for shortcut in &cfg.shortcuts {
        parse_chord(shortcut).map_err(|error| format!("shortcut '{shortcut}': {error}"))?;
    }

    Ok(())
}

pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let mut cfg = if config_path.exists() {
        let raw = fs::read_to_string(&config_path)?;
        parse(&raw, &config_path)?
    } else {
        Config::default()
    };
    cfg.config_path = config_path;

    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = cfg.config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let encoded = toml::to_string_pretty(cfg)?;
    fs::write(&cfg.config_path, encoded)?;
    Ok(())
}

fn parse(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "toml" => Ok(toml::from_str(raw)?),
        "json" | "json5" => Ok(json5::from_str(raw)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}
