use std::sync::Arc;

use anyhow::Result;

use crate::application::use_cases::install::InstallUseCase;
use crate::infrastructure::filesystem::PreferenceStore;
use crate::presentation::cli::commands::CommandEnv;
use crate::presentation::ui::{AnswerOverrides, InstallPrompts, TaskListDisplay};

/// Set up Shopware inside the current project
pub struct InstallCommand {
    pub answers: AnswerOverrides,
    pub assume_yes: bool,
}

impl InstallCommand {
    pub fn new(answers: AnswerOverrides, assume_yes: bool) -> Self {
        Self { answers, assume_yes }
    }

    pub async fn execute(&self, env: &CommandEnv) -> Result<()> {
        let layout = env.layout();
        let store = PreferenceStore::locate()?;
        InstallUseCase::write_marker(&layout, store.path())?;

        let answers = InstallPrompts::new(store, self.assume_yes).collect(&self.answers)?;

        let settings = env.settings()?;
        let console = env.console(layout, &settings);
        let observer = Arc::new(TaskListDisplay::new(env.display));
        let report = InstallUseCase::new(env.vcs.clone(), console, observer)
            .execute(&answers)
            .await?;

        let skipped = report.skipped().count();
        env.display.success(&format!(
            "Shopware installed ({} steps, {} skipped)",
            report.steps.len(),
            skipped
        ));
        Ok(())
    }
}
