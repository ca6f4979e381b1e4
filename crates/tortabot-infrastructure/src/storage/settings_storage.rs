//! Business settings file storage (`settings.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use tortabot_core::settings::Settings;
use tortabot_core::{BotError, Result};

use crate::paths::TortabotPaths;

/// Loads [`Settings`] from a TOML file.
///
/// A missing file is not an error: the built-in defaults apply. Fields left
/// out of the file take their defaults too.
pub struct SettingsStorage {
    path: PathBuf,
}

impl SettingsStorage {
    /// Storage at `~/.config/tortabot/settings.toml`.
    pub fn new() -> Result<Self> {
        let path = TortabotPaths::settings_file().map_err(|e| BotError::config(e.to_string()))?;
        Ok(Self { path })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "No settings file, using defaults");
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let settings: Settings = toml::from_str(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            business = %settings.business_name,
            "Settings loaded"
        );
        Ok(settings)
    }
}
