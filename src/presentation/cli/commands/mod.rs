pub mod assets;
pub mod host;
pub mod install;
pub mod maintenance;
pub mod passthrough;
pub mod refresh;

pub use assets::*;
pub use host::*;
pub use install::*;
pub use maintenance::*;
pub use passthrough::*;
pub use refresh::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::shopware_console::ShopwareConsole;
use crate::common::SwagResult;
use crate::domain::entities::project::find_up;
use crate::domain::entities::{ProjectLayout, Settings, SettingsOverrides};
use crate::infrastructure::fastcgi::FastCgiClient;
use crate::infrastructure::filesystem::load_settings;
use crate::infrastructure::git::{Git2Vcs, Vcs};
use crate::infrastructure::process::{CommandExecutor, ProcessRunner};
use crate::presentation::ui::DisplayHelper;

/// Everything a command needs from the invocation
pub struct CommandEnv {
    pub cwd: PathBuf,
    pub overrides: SettingsOverrides,
    pub bin_dir: PathBuf,
    pub display: DisplayHelper,
    pub runner: Arc<dyn ProcessRunner>,
    pub vcs: Arc<dyn Vcs>,
}

impl CommandEnv {
    pub fn new(
        cwd: PathBuf,
        overrides: SettingsOverrides,
        bin_dir: PathBuf,
        display: DisplayHelper,
    ) -> Self {
        Self {
            cwd,
            overrides,
            bin_dir,
            display,
            runner: Arc::new(CommandExecutor::new()),
            vcs: Arc::new(Git2Vcs::new()),
        }
    }

    /// Project found from the working directory
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::discover(&self.cwd)
    }

    /// Directory of the host project's `package.json`, else the project base
    pub fn project_root(&self) -> PathBuf {
        find_up(&self.cwd, &["package.json"])
            .and_then(|file| file.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| self.layout().base)
    }

    pub fn settings(&self) -> SwagResult<Settings> {
        load_settings(&self.project_root(), &self.overrides)
    }

    /// Shopware directory: `--base`, then the git toplevel, then the usual markers
    pub fn docroot(&self, settings: &Settings) -> SwagResult<PathBuf> {
        ProjectLayout::locate_docroot(
            &self.cwd,
            settings.base.as_deref(),
            self.vcs.toplevel(&self.cwd),
        )
    }

    /// Console wrapper for `layout`, going through PHP-FPM when configured
    pub fn console(&self, layout: ProjectLayout, settings: &Settings) -> ShopwareConsole {
        let fastcgi = settings.fastcgi_address().map(|(host, port)| {
            tracing::debug!(host = %host, port, "console calls go through FastCGI");
            FastCgiClient::new(host, port)
        });
        ShopwareConsole::new(self.runner.clone(), layout, self.bin_dir.clone()).with_fastcgi(fastcgi)
    }
}
