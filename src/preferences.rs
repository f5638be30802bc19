use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::{OllamaMode, Provider, RunConfig, Target};
use crate::error::ConfigError;

/// Settings remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama_mode: Option<OllamaMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Preferences {
    /// The full tuple to remember for `config`.
    pub fn from_run_config(config: &RunConfig) -> Self {
        Preferences {
            provider: Some(config.provider()),
            ollama_mode: config.ollama_mode(),
            model: Some(config.model.clone()),
            api_key: config.api_key.clone(),
        }
    }

    /// The saved provider and mode as a target.
    pub fn target(&self) -> Option<Target> {
        self.provider
            .map(|provider| Target::from_parts(provider, self.ollama_mode))
    }
}

/// Durable storage for [`Preferences`].
pub trait PreferenceStore {
    /// Best-effort read: a missing or unreadable file yields empty preferences.
    fn read(&self) -> Preferences;

    /// Replace the stored preferences.
    fn write(&self, prefs: &Preferences) -> Result<()>;

    /// Remove the stored preferences. Returns whether anything was removed.
    fn delete(&self) -> Result<bool>;

    /// Human-readable location, used in messages.
    fn location(&self) -> String;
}

/// Preferences stored as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    /// Store at the per-user default location.
    pub fn at_default_location() -> Result<Self, ConfigError> {
        config_path().map(FileStore::new).ok_or(ConfigError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn read(&self) -> Preferences {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    log::debug!("Ignoring unreadable settings {:?}: {e}", self.path);
                }
                return Preferences::default();
            }
        };

        match serde_json::from_str::<Preferences>(&data) {
            Ok(prefs) => prefs,
            Err(e) => {
                log::debug!("Ignoring malformed settings {:?}: {e}", self.path);
                Preferences::default()
            }
        }
    }

    fn write(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory {:?}", parent))?;
        }

        let mut body = serde_json::to_string_pretty(prefs).context("failed to encode settings")?;
        body.push('\n');

        fs::write(&self.path, body)
            .with_context(|| format!("failed to write settings to {:?}", self.path))?;
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("failed to delete settings at {:?}", self.path))
            }
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// `$XDG_CONFIG_HOME/commitcraft/config.json` (or `~/.config/...`) on Unix,
/// the roaming app-data directory on Windows.
pub fn config_path() -> Option<PathBuf> {
    config_root().map(|root| root.join("commitcraft").join("config.json"))
}

#[cfg(windows)]
fn config_root() -> Option<PathBuf> {
    dirs::config_dir()
}

#[cfg(not(windows))]
fn config_root() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("nested").join("config.json"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(store_in(&dir).read(), Preferences::default());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("config.json"));
        fs::write(store.path(), "{ not json").expect("write");
        assert_eq!(store.read(), Preferences::default());
    }

    #[test]
    fn write_creates_parents_and_uses_camel_case() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let prefs = Preferences {
            provider: Some(Provider::Ollama),
            ollama_mode: Some(OllamaMode::Cloud),
            model: Some("gpt-oss:120b".into()),
            api_key: Some("sk-test".into()),
        };

        store.write(&prefs).expect("write");

        let raw = fs::read_to_string(store.path()).expect("read back");
        assert!(raw.ends_with("}\n"));
        assert!(raw.contains("\"ollamaMode\": \"cloud\""));
        assert!(raw.contains("\"apiKey\": \"sk-test\""));
        assert_eq!(store.read(), prefs);
    }

    #[test]
    fn absent_fields_are_omitted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let config = RunConfig {
            target: Target::OpenAi,
            endpoint: "https://example.invalid".into(),
            model: "gpt-5-mini".into(),
            api_key: Some("sk".into()),
            debug: false,
        };

        store.write(&Preferences::from_run_config(&config)).expect("write");

        let raw = fs::read_to_string(store.path()).expect("read back");
        assert!(raw.contains("\"provider\": \"openai\""));
        assert!(!raw.contains("ollamaMode"));
    }

    #[test]
    fn delete_reports_whether_a_file_existed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        assert!(!store.delete().expect("delete missing"));

        store.write(&Preferences::default()).expect("write");
        assert!(store.delete().expect("delete existing"));
        assert!(!store.path().exists());
    }
}
