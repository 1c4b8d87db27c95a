use std::path::Path;
use std::sync::Arc;

use crate::common::{SwagError, SwagResult};
use crate::domain::entities::{DbSettings, Settings};
use crate::infrastructure::mysql::{sql_literal, MySqlClient};
use crate::infrastructure::process::ProcessRunner;

/// Database settings from the connection url, then explicit overrides, then `config.php`
pub fn resolve_db_settings(settings: &Settings, docroot: &Path) -> DbSettings {
    let from_url = settings
        .db
        .as_deref()
        .map(DbSettings::from_url)
        .unwrap_or_default();

    let explicit = DbSettings {
        username: settings.db_user.clone(),
        password: settings.db_pass.clone(),
        host: settings.db_host.clone(),
        port: settings.db_port.clone(),
        dbname: settings.db_name.clone(),
    };

    let config_php = std::fs::read_to_string(docroot.join("config.php"))
        .map(|source| DbSettings::from_config_php(&source))
        .unwrap_or_else(|e| {
            tracing::debug!(error = %e, "no readable config.php");
            DbSettings::default()
        });

    explicit.or(from_url).or(config_php)
}

/// Reads and updates the host of a shop in `s_core_shops`
pub struct ShopHostUseCase {
    client: MySqlClient,
    shop: String,
}

impl ShopHostUseCase {
    pub fn new(runner: Arc<dyn ProcessRunner>, db: DbSettings, shop: impl Into<String>) -> Self {
        Self {
            client: MySqlClient::new(runner, db),
            shop: shop.into(),
        }
    }

    pub async fn host(&self) -> SwagResult<String> {
        let sql = format!(
            "SELECT host FROM s_core_shops WHERE id = {}",
            sql_literal(&self.shop)
        );
        self.client
            .query(&sql)
            .await?
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .ok_or_else(|| SwagError::config_error(format!("Shop {} not found", self.shop)))
    }

    pub async fn set_host(&self, host: &str) -> SwagResult<()> {
        if host.trim().is_empty() {
            return Err(SwagError::validation_error(
                "host",
                "Host must not be empty",
                None,
            ));
        }

        let sql = format!(
            "UPDATE s_core_shops SET host = {} WHERE id = {}",
            sql_literal(host),
            sql_literal(&self.shop)
        );
        self.client.query(&sql).await?;
        tracing::info!(shop = %self.shop, host, "shop host updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SettingsOverrides;
    use crate::infrastructure::process::{CommandSpec, ExecutionResult};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct CannedRunner {
        stdout: String,
        calls: Mutex<Vec<CommandSpec>>,
    }

    #[async_trait]
    impl ProcessRunner for CannedRunner {
        async fn run(&self, spec: &CommandSpec) -> SwagResult<ExecutionResult> {
            self.calls.lock().unwrap().push(spec.clone());
            Ok(ExecutionResult::with_stdout(self.stdout.clone()))
        }
    }

    fn db() -> DbSettings {
        DbSettings {
            username: Some("root".to_string()),
            dbname: Some("shopware".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolution_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.php"),
            "<?php return ['db' => [\n  'username' => 'php_user',\n  'password' => 'php_pass',\n  'dbname' => 'php_db',\n]];",
        )
        .unwrap();

        let overrides = SettingsOverrides {
            db: Some("mysql://url_user@db-host/url_db".to_string()),
            db_name: Some("cli_db".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&overrides, &Default::default(), |_| None);

        assert_eq!(
            resolve_db_settings(&settings, temp.path()),
            DbSettings {
                username: Some("url_user".to_string()),
                password: Some("php_pass".to_string()),
                host: Some("db-host".to_string()),
                port: Some("3306".to_string()),
                dbname: Some("cli_db".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_host_query() {
        let runner = Arc::new(CannedRunner {
            stdout: "shop.localhost\n".to_string(),
            ..Default::default()
        });
        let use_case = ShopHostUseCase::new(runner.clone(), db(), "2");

        assert_eq!(use_case.host().await.unwrap(), "shop.localhost");
        let calls = runner.calls.lock().unwrap();
        assert_eq!(
            calls[0].args.last().map(String::as_str),
            Some("SELECT host FROM s_core_shops WHERE id = '2'")
        );
    }

    #[tokio::test]
    async fn test_unknown_shop() {
        let use_case = ShopHostUseCase::new(Arc::new(CannedRunner::default()), db(), "9");
        assert!(matches!(
            use_case.host().await,
            Err(SwagError::ConfigError { .. })
        ));
    }

    #[tokio::test]
    async fn test_set_host_escapes_value() {
        let runner = Arc::new(CannedRunner::default());
        let use_case = ShopHostUseCase::new(runner.clone(), db(), "1");
        use_case.set_host("evil'host").await.unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(
            calls[0].args.last().map(String::as_str),
            Some(r"UPDATE s_core_shops SET host = 'evil\'host' WHERE id = '1'")
        );
    }
}
