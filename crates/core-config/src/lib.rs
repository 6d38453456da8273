//! Configuration loading and parsing for the editing core.
//!
//! Parses `quill.toml` (or an override path provided by the embedding
//! layer) extracting the history capacity, an optional dictionary word
//! list path, and the suggestion cap. Unknown fields are ignored (TOML
//! deserialization tolerance) and a missing or malformed file falls
//! back to defaults rather than failing session startup.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Bound on each undo/redo stack.
    #[serde(default = "HistoryConfig::default_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
        }
    }
}

impl HistoryConfig {
    const fn default_capacity() -> usize {
        100
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DictionaryConfig {
    /// Word list to load; absent means the built-in fallback set.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SuggestConfig {
    #[serde(default = "SuggestConfig::default_max_results")]
    pub max_results: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            max_results: Self::default_max_results(),
        }
    }
}

impl SuggestConfig {
    const fn default_max_results() -> usize {
        10
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions: prefer a
/// local `quill.toml` before the platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("quill.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("quill").join("quill.toml");
    }
    PathBuf::from("quill.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Config {
                raw: Some(content),
                file,
            }),
            Err(_e) => {
                // Parse errors fall back to defaults; an unreadable
                // config must not take the editor down.
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Effective history stack bound: the configured value clamped to a
    /// minimum of one entry.
    pub fn history_capacity(&self) -> usize {
        let raw = self.file.history.capacity;
        let clamped = raw.max(1);
        if clamped != raw {
            info!(target: "config", raw, clamped, "history_capacity_clamped");
        }
        clamped
    }

    /// Effective suggestion cap, clamped to at least one result.
    pub fn suggest_max(&self) -> usize {
        let raw = self.file.suggest.max_results;
        let clamped = raw.max(1);
        if clamped != raw {
            info!(target: "config", raw, clamped, "suggest_max_results_clamped");
        }
        clamped
    }

    /// Word list path, if configured.
    pub fn dictionary_path(&self) -> Option<&std::path::Path> {
        self.file.dictionary.path.as_deref()
    }
}
