use std::fs;
use std::path::Path;

use crate::common::result::ResultExt;
use crate::common::SwagResult;
use crate::domain::entities::{PackageSettings, Settings, SettingsOverrides};

/// Load `.env` files of the project root and its `shopware/` directory
///
/// Variables already present in the environment are kept.
pub fn load_env_files(root: &Path) {
    for env_file in [root.join(".env"), root.join("shopware").join(".env")] {
        if !env_file.is_file() {
            continue;
        }
        match dotenvy::from_path(&env_file) {
            Ok(()) => tracing::debug!(path = %env_file.display(), "loaded env file"),
            Err(e) => tracing::warn!(path = %env_file.display(), "ignoring env file: {}", e),
        }
    }
}

/// Read the `shopware` section of `<root>/package.json`
pub fn read_package_settings(root: &Path) -> SwagResult<PackageSettings> {
    let manifest = root.join("package.json");
    if !manifest.is_file() {
        return Ok(PackageSettings::default());
    }

    let contents = fs::read_to_string(&manifest)
        .with_filesystem_error("Failed to read package.json", Some(manifest.clone()))?;
    let package: serde_json::Value = serde_json::from_str(&contents)
        .with_config_error(format!("Invalid {}", manifest.display()))?;

    match package.get("shopware") {
        Some(section) => serde_json::from_value(section.clone())
            .with_config_error("Invalid \"shopware\" section in package.json"),
        None => Ok(PackageSettings::default()),
    }
}

/// Resolve settings for a project: env files first, then every source in precedence order
pub fn load_settings(root: &Path, overrides: &SettingsOverrides) -> SwagResult<Settings> {
    load_env_files(root);
    let package = read_package_settings(root)?;
    let settings = Settings::resolve(overrides, &package, |key| std::env::var(key).ok());

    tracing::debug!(?settings, "settings resolved");
    Ok(settings)
}
