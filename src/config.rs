//! Shared config utilities for loading/saving JSON config files,
//! and the companion's own config.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ai::classifier::ReactionMode;
use crate::ai::persona::Persona;
use crate::ai::typing_sim::ThinkingDelay;
use crate::tts::SpeechConfig;

const APP_DIR: &str = "avatar-companion";
const CONFIG_FILE: &str = "companion_config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, #[source] std::io::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write config file {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),
}

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                tracing::info!("[{}] Loaded config from {}", label, path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "[{}] Failed to parse config {}: {}; using defaults",
                    label,
                    path.display(),
                    e
                );
                T::default()
            }
        },
        Err(_) => {
            tracing::info!("[{}] No config file at {}; using defaults", label, path.display());
            T::default()
        }
    }
}

/// Generic save for any Serde config type.
pub fn save_json_config<T: Serialize>(
    path: &Path,
    config: &T,
    label: &str,
) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::CreateDir(parent.to_path_buf(), e))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).map_err(|e| ConfigError::Write(path.to_path_buf(), e))?;
    tracing::info!("[{}] Saved config to {}", label, path.display());
    Ok(())
}

/// `<data_dir>/avatar-companion/companion_config.json`, or the working
/// directory when the platform has no data dir.
pub fn default_config_path() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

// ── Companion Config ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub mode: ReactionMode,
    #[serde(default)]
    pub thinking_delay: ThinkingDelay,
    /// How long an emote overlay stays up.
    #[serde(default = "default_emote_clear_ms")]
    pub emote_clear_ms: u64,
    #[serde(default)]
    pub speech: SpeechConfig,
}

fn default_emote_clear_ms() -> u64 {
    1500
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            persona: Persona::default(),
            mode: ReactionMode::default(),
            thinking_delay: ThinkingDelay::default(),
            emote_clear_ms: default_emote_clear_ms(),
            speech: SpeechConfig::default(),
        }
    }
}

impl CompanionConfig {
    pub fn load(path: &Path) -> Self {
        load_json_config(path, "Config")
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_json_config(path, self, "Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::EngineKind;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CompanionConfig::load(&dir.path().join("nope.json"));
        assert_eq!(config.persona, Persona::Chitti);
        assert_eq!(config.mode, ReactionMode::Emotion);
        assert_eq!(config.emote_clear_ms, 1500);
        assert_eq!(config.thinking_delay, ThinkingDelay::default());
    }

    #[test]
    fn unparsable_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let config = CompanionConfig::load(&path);
        assert_eq!(config.speech.engine, EngineKind::Simulated);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"persona": "Vikki", "mode": "action"}"#).unwrap();
        let config = CompanionConfig::load(&path);
        assert_eq!(config.persona, Persona::Vikki);
        assert_eq!(config.mode, ReactionMode::Action);
        assert_eq!(config.emote_clear_ms, 1500);
    }

    #[test]
    fn save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut config = CompanionConfig::default();
        config.persona = Persona::Nova;
        config.speech.engine = EngineKind::None;
        config.save(&path).unwrap();

        let reloaded = CompanionConfig::load(&path);
        assert_eq!(reloaded.persona, Persona::Nova);
        assert_eq!(reloaded.speech.engine, EngineKind::None);
    }

    #[test]
    fn default_path_ends_with_config_file() {
        let path = default_config_path();
        assert!(path.ends_with(Path::new(APP_DIR).join(CONFIG_FILE)));
    }
}
