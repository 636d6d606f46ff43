//! Persisted playback preferences

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const PREFERENCES_FILE: &str = ".cache/preferences.json";

pub const DEFAULT_VOLUME: f64 = 0.7;
pub const DEFAULT_SPEED: f64 = 1.0;

/// Client-local settings that outlive any single track
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub volume: f64,
    pub speed: f64,
    pub repeat: bool,
    pub shuffle: bool,
    pub muted: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            speed: DEFAULT_SPEED,
            repeat: false,
            shuffle: false,
            muted: false,
        }
    }
}

/// Reads and writes [`Preferences`] as JSON
#[derive(Clone, Debug)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl Default for PreferencesStore {
    fn default() -> Self {
        Self::new(PREFERENCES_FILE)
    }
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields the defaults; a corrupt one is an error.
    pub fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let prefs: Preferences = serde_json::from_str(&content)
            .with_context(|| format!("Malformed preferences in {}", self.path.display()))?;
        Ok(prefs)
    }

    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
