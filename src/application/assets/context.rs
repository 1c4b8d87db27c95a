use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::application::assets::dirs::ThemeDirs;
use crate::application::services::shopware_console::ShopwareConsole;
use crate::common::result::ResultExt;
use crate::common::{SwagError, SwagResult};
use crate::domain::entities::{Settings, ThemeConfig};
use crate::domain::value_objects::ConsoleFlags;
use crate::infrastructure::process::{CommandExecutor, CommandSpec, ProcessRunner};

/// Shared state of one asset task run
pub struct AssetContext {
    pub settings: Settings,
    /// Shopware directory
    pub docroot: PathBuf,
    /// Directory holding the project's `package.json` and `node_modules`
    pub project_root: PathBuf,
    console: ShopwareConsole,
    theme_config: OnceCell<ThemeConfig>,
}

impl AssetContext {
    pub fn new(
        settings: Settings,
        docroot: PathBuf,
        project_root: PathBuf,
        console: ShopwareConsole,
    ) -> Self {
        Self {
            settings,
            docroot,
            project_root,
            console,
            theme_config: OnceCell::new(),
        }
    }

    /// Context with an already known theme configuration
    pub fn with_theme_config(self, config: ThemeConfig) -> Self {
        Self {
            theme_config: OnceCell::new_with(Some(config)),
            ..self
        }
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        self.console.runner()
    }

    /// Run a Shopware console command unless PHP is disabled
    ///
    /// Returns `None` when the call was skipped.
    pub async fn php(&self, input: &[&str], flags: ConsoleFlags) -> SwagResult<Option<String>> {
        if !self.settings.php {
            tracing::debug!(?input, "php disabled, skipping console call");
            return Ok(None);
        }

        let input: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        self.console.console(&input, &flags).await.map(Some)
    }

    /// The dumped theme configuration, dumping it first when missing
    pub async fn theme_config(&self) -> SwagResult<&ThemeConfig> {
        self.theme_config
            .get_or_try_init(|| async {
                let path = ThemeConfig::dump_path(&self.docroot, &self.settings.shop);
                if !path.is_file() {
                    tracing::info!(path = %path.display(), "dumping theme configuration");
                    self.php(&["sw:theme:dump:configuration"], ConsoleFlags::new())
                        .await?;
                }

                let raw = std::fs::read_to_string(&path).map_err(|e| {
                    SwagError::config_error_with_source(
                        format!(
                            "Missing theme configuration {}. Run `swag assets sw:config`",
                            path.display()
                        ),
                        e,
                    )
                })?;
                let config: ThemeConfig = serde_json::from_str(&raw)
                    .with_config_error(format!("Invalid theme configuration {}", path.display()))?;
                Ok(config.repair(&self.docroot))
            })
            .await
    }

    /// Directories of the active theme: `--theme` or the head of the inheritance path
    pub async fn dirs(&self) -> SwagResult<ThemeDirs> {
        if let Some(theme) = self.settings.theme.as_deref().filter(|t| !t.is_empty()) {
            return Ok(ThemeDirs::new(&self.docroot, theme));
        }

        let config = self.theme_config().await?;
        config
            .current_theme()
            .map(|theme| ThemeDirs::new(&self.docroot, theme))
            .ok_or_else(|| {
                SwagError::config_error(
                    "Your version of shopware is too old. You need at least v5.3.4",
                )
            })
    }

    /// Command for a node tool: local `node_modules/.bin`, then `PATH`, then `npx`
    pub fn node_tool(&self, name: &str) -> CommandSpec {
        let local = self.project_root.join("node_modules/.bin").join(name);
        let spec = if local.is_file() {
            CommandSpec::new(local.to_string_lossy())
        } else if CommandExecutor::command_exists(name) {
            CommandSpec::new(name)
        } else {
            CommandSpec::new("npx").arg(name)
        };
        spec.current_dir(&self.project_root)
    }

    /// Shop host used for urls, `localhost` when none is configured
    pub fn host(&self) -> &str {
        self.settings.host.as_deref().unwrap_or("localhost")
    }

    /// Path relative to the docroot
    pub fn docroot_relative(&self, path: &Path) -> PathBuf {
        pathdiff::diff_paths(path, &self.docroot).unwrap_or_else(|| path.to_path_buf())
    }
}
