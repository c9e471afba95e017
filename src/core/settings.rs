use crate::shared::paths::ensure_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_SUGGESTION_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionSettings {
    /// Tag-suggestion service URL. Suggestions are off when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_SUGGESTION_TIMEOUT_SECS
}

impl SuggestionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_SUGGESTION_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub suggestion: SuggestionSettings,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            suggestion: SuggestionSettings::default(),
            log_filter: default_log_filter(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub fn get_settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE)
}

/// Settings from `dir`, falling back to defaults when the file is missing
/// or unreadable.
pub fn load_settings_from(dir: &Path) -> AppSettings {
    let path = get_settings_path(dir);

    if !path.exists() {
        return AppSettings::default();
    }

    match load_settings_from_file(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(target: "system", "Ignoring settings at {:?}: {}", path, e);
            AppSettings::default()
        }
    }
}

fn load_settings_from_file(path: &Path) -> Result<AppSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings_to(dir: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    ensure_dir(dir)?;

    let path = get_settings_path(dir);
    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load_settings_from(tmp.path());
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.suggestion.timeout(), Duration::from_secs(15));
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("cfg");
        let settings = AppSettings {
            suggestion: SuggestionSettings {
                endpoint: Some("http://127.0.0.1:3400/suggest-tags".into()),
                timeout_secs: 5,
            },
            log_filter: "debug".into(),
        };

        save_settings_to(&dir, &settings).unwrap();
        assert_eq!(load_settings_from(&dir), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            get_settings_path(tmp.path()),
            r#"{"suggestion":{"endpoint":"http://x"}}"#,
        )
        .unwrap();

        let settings = load_settings_from(tmp.path());
        assert_eq!(settings.suggestion.endpoint.as_deref(), Some("http://x"));
        assert_eq!(settings.suggestion.timeout_secs, 15);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(get_settings_path(tmp.path()), "][").unwrap();
        assert_eq!(load_settings_from(tmp.path()), AppSettings::default());
    }
}
