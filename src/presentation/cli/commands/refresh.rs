use std::sync::Arc;

use anyhow::Result;

use crate::application::use_cases::refresh::{RefreshConfig, RefreshUseCase};
use crate::infrastructure::filesystem::PreferenceStore;
use crate::infrastructure::process::ParallelConfig;
use crate::presentation::cli::commands::CommandEnv;
use crate::presentation::ui::TaskListDisplay;

/// Update the submodule, dependencies, plugins and themes
pub struct RefreshCommand {
    pub jobs: Option<usize>,
}

impl RefreshCommand {
    pub fn new(jobs: Option<usize>) -> Self {
        Self { jobs }
    }

    pub async fn execute(&self, env: &CommandEnv) -> Result<()> {
        let preferences = PreferenceStore::locate()?.load()?;
        let parallel = match self.jobs {
            Some(jobs) => ParallelConfig::new().with_max_concurrency(jobs),
            None => ParallelConfig::new(),
        };
        let config = RefreshConfig {
            url: preferences.url().to_string(),
            parallel,
        };

        let settings = env.settings()?;
        let console = env.console(env.layout(), &settings);
        let observer = Arc::new(TaskListDisplay::new(env.display));
        RefreshUseCase::new(env.vcs.clone(), console, observer)
            .execute(&config)
            .await?;

        env.display.success("Shopware refreshed");
        Ok(())
    }
}
