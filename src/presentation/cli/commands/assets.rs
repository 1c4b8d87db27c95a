use std::sync::Arc;

use anyhow::Result;

use crate::application::assets::{standard_graph, AssetContext};
use crate::common::SwagError;
use crate::domain::entities::ProjectLayout;
use crate::presentation::cli::commands::CommandEnv;
use crate::presentation::ui::TaskListDisplay;

/// Run one task of the asset pipeline, or list them
pub struct AssetsCommand {
    pub task: Option<String>,
    pub list: bool,
}

impl AssetsCommand {
    pub fn new(task: Option<String>, list: bool) -> Self {
        Self { task, list }
    }

    pub async fn execute(&self, env: &CommandEnv) -> Result<()> {
        let graph = standard_graph();

        let task = match self.task.as_deref() {
            Some(task) if !self.list => task,
            _ => {
                env.display.info("Available asset tasks:");
                env.display.print_table(&graph.list());
                return Ok(());
            }
        };
        if !graph.contains(task) {
            return Err(SwagError::unknown_task(task).into());
        }

        let settings = env.settings()?;
        let docroot = env.docroot(&settings)?;
        let console = env.console(ProjectLayout::new(&docroot), &settings);
        let ctx = Arc::new(AssetContext::new(settings, docroot, env.project_root(), console));

        let observer = TaskListDisplay::new(env.display);
        graph.run(task, ctx, &observer).await?;

        env.display.success(&format!("Finished {}", task));
        Ok(())
    }
}
