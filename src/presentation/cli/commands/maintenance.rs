use anyhow::Result;

use crate::application::use_cases::maintenance::{clear_cache, fix_permissions};
use crate::presentation::cli::commands::CommandEnv;

/// Clear Shopware's caches for the configured environment
pub struct CacheClearCommand;

impl CacheClearCommand {
    pub async fn execute(&self, env: &CommandEnv) -> Result<()> {
        let settings = env.settings()?;
        let console = env.console(env.layout(), &settings);
        clear_cache(&console, &settings.env).await?;

        env.display
            .success(&format!("Cache cleared for environment {}", settings.env));
        Ok(())
    }
}

/// Make Shopware's writable directories group-writable
pub struct PermissionsCommand;

impl PermissionsCommand {
    pub async fn execute(&self, env: &CommandEnv) -> Result<()> {
        let shopware_dir = env.layout().shopware_dir()?;
        let touched = fix_permissions(&shopware_dir)?;

        env.display
            .success(&format!("Permissions fixed for {} entries", touched));
        Ok(())
    }
}
