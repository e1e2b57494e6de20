use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::categorizer::AbbreviationMap;
use crate::error::{Result, StmtError};
use crate::normalizer::FooterPolicy;
use crate::reports::GroupingMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Letterhead rows above the header row of tabular statements.
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    #[serde(default)]
    pub mode: GroupingMode,
    #[serde(default)]
    pub footer_policy: FooterPolicy,
    /// Abbreviation dictionary file; the built-in table is used when unset.
    #[serde(default)]
    pub abbreviations: Option<String>,
}

fn default_skip_rows() -> usize {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_rows: default_skip_rows(),
            mode: GroupingMode::default(),
            footer_policy: FooterPolicy::default(),
            abbreviations: None,
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("stmtgroup")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn default_abbreviations_path() -> PathBuf {
    config_dir().join("abbreviations.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| StmtError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> PathBuf {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return PathBuf::from(path.replacen('~', &home.to_string_lossy(), 1));
        }
    }
    PathBuf::from(path)
}

/// Load the dictionary named by `override_path`, else the configured one,
/// else the built-in table.
pub fn load_abbreviations(settings: &Settings, override_path: Option<&str>) -> Result<AbbreviationMap> {
    let Some(path) = override_path.or(settings.abbreviations.as_deref()) else {
        return Ok(AbbreviationMap::builtin());
    };
    let path = shellexpand_path(path);
    let map = AbbreviationMap::load(&path)?;
    if map.is_empty() {
        warn!(file = %path.display(), "abbreviation dictionary is empty; every narration is Other");
    } else {
        debug!(file = %path.display(), entries = map.len(), "abbreviation dictionary loaded");
    }
    Ok(map)
}
