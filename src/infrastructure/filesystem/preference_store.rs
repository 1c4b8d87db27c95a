use std::fs;
use std::path::{Path, PathBuf};

use crate::common::result::ResultExt;
use crate::common::{SwagError, SwagResult};
use crate::domain::entities::Preferences;

/// Environment variable overriding the preference store location
pub const CONFIG_PATH_ENV: &str = "SWAG_CONFIG_PATH";

/// JSON file remembering the install answers of the current user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$SWAG_CONFIG_PATH`, or `<user config dir>/swag/config.json`
    pub fn locate() -> SwagResult<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::new(path));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| SwagError::config_error("Could not determine the user config directory"))?;
        Ok(Self::new(config_dir.join("swag").join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored preferences; a missing store yields empty preferences
    pub fn load(&self) -> SwagResult<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_filesystem_error("Failed to read preferences", Some(self.path.clone()))?;
        if contents.trim().is_empty() {
            return Ok(Preferences::default());
        }

        serde_json::from_str(&contents).with_config_error(format!(
            "Invalid preference store {}",
            self.path.display()
        ))
    }

    /// Replace the stored preferences
    pub fn save(&self, preferences: &Preferences) -> SwagResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_filesystem_error(
                "Failed to create preference directory",
                Some(parent.to_path_buf()),
            )?;
        }

        let json = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, json)
            .with_filesystem_error("Failed to write preferences", Some(self.path.clone()))?;

        tracing::debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}
