use anyhow::Result;

use crate::application::use_cases::shop_host::{resolve_db_settings, ShopHostUseCase};
use crate::presentation::cli::commands::CommandEnv;

/// Show or change the host of the configured shop
pub struct HostCommand {
    pub value: Option<String>,
}

impl HostCommand {
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }

    pub async fn execute(&self, env: &CommandEnv) -> Result<()> {
        let settings = env.settings()?;
        let docroot = env.docroot(&settings)?;
        let db = resolve_db_settings(&settings, &docroot);
        let use_case = ShopHostUseCase::new(env.runner.clone(), db, settings.shop.clone());

        match &self.value {
            Some(host) => {
                use_case.set_host(host).await?;
                env.display
                    .success(&format!("Host of shop {} set to {}", settings.shop, host));
            }
            None => println!("{}", use_case.host().await?),
        }
        Ok(())
    }
}
