use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default FastCGI address used with `--docker` when no `--fpm` is given
pub const DEFAULT_FPM: &str = "php:9000";

/// Values explicitly passed on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub env: Option<String>,
    pub host: Option<String>,
    pub base: Option<PathBuf>,
    pub shop: Option<String>,
    pub theme: Option<String>,
    pub docker: bool,
    pub fpm: Option<String>,
    pub db: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<String>,
    pub db_user: Option<String>,
    pub db_pass: Option<String>,
    pub db_name: Option<String>,
    pub no_php: bool,
    pub production: bool,
}

/// The `shopware` section of the host project's `package.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageSettings {
    pub env: Option<String>,
    pub host: Option<String>,
    pub base: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub shop: Option<String>,
    pub theme: Option<String>,
    pub docker: Option<bool>,
    pub fpm: Option<String>,
    pub db_host: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub db_port: Option<String>,
    pub db_user: Option<String>,
    pub db_pass: Option<String>,
    pub db_name: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Runtime settings shared by the console wrappers and the asset tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub env: String,
    pub host: Option<String>,
    pub base: Option<PathBuf>,
    pub shop: String,
    pub theme: Option<String>,
    pub docker: bool,
    pub fpm: Option<String>,
    pub db: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<String>,
    pub db_user: Option<String>,
    pub db_pass: Option<String>,
    pub db_name: Option<String>,
    /// Console calls issued by asset tasks are skipped when false
    pub php: bool,
    pub production: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&SettingsOverrides::default(), &PackageSettings::default(), |_| None)
    }
}

impl Settings {
    /// Merge all sources: command line, then `package.json`, then the environment
    pub fn resolve<F>(cli: &SettingsOverrides, package: &PackageSettings, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_var = |keys: &[&str]| keys.iter().find_map(|k| non_empty(env(k)));

        let environment = first([
            cli.env.clone(),
            package.env.clone(),
            env_var(&["env", "NODE_ENV", "SHOPWARE_ENV", "DOCKER_ENV"]),
        ])
        .unwrap_or_else(|| "dev".to_string());

        let docker = cli.docker || package.docker.unwrap_or(false);
        let mut fpm = first([cli.fpm.clone(), package.fpm.clone()]);
        if docker && fpm.is_none() {
            fpm = Some(DEFAULT_FPM.to_string());
        }

        Self {
            env: environment,
            host: first([
                cli.host.clone(),
                package.host.clone(),
                env_var(&["host", "SHOPWARE_HOST"]),
            ]),
            base: first([
                cli.base.clone(),
                package.base.clone().map(PathBuf::from),
                env_var(&["base"]).map(PathBuf::from),
            ]),
            shop: first([
                cli.shop.clone(),
                package.shop.clone(),
                env_var(&["shop", "SHOPWARE_SHOP"]),
            ])
            .unwrap_or_else(|| "1".to_string()),
            theme: first([cli.theme.clone(), package.theme.clone(), env_var(&["theme"])]),
            docker,
            fpm,
            db: first([cli.db.clone(), env_var(&["DATABASE_URL"])]),
            db_host: first([cli.db_host.clone(), package.db_host.clone()]),
            db_port: first([cli.db_port.clone(), package.db_port.clone()]),
            db_user: first([cli.db_user.clone(), package.db_user.clone()]),
            db_pass: first([cli.db_pass.clone(), package.db_pass.clone()]),
            db_name: first([cli.db_name.clone(), package.db_name.clone()]),
            php: !cli.no_php,
            production: cli.production,
        }
    }

    /// Production builds: env `prod`/`production` or `--production`
    pub fn is_prod(&self) -> bool {
        self.production || matches!(self.env.to_lowercase().as_str(), "prod" | "production")
    }

    /// FastCGI address when console calls go through PHP-FPM
    ///
    /// Missing host or port parts default to `php` and `9000`.
    pub fn fastcgi_address(&self) -> Option<(String, u16)> {
        let fpm = self.fpm.as_deref()?;
        let (host, port) = fpm.split_once(':').unwrap_or((fpm, ""));
        let host = if host.is_empty() { "php" } else { host };
        let port = port.parse().unwrap_or(9000);
        Some((host.to_string(), port))
    }
}

fn first<T, const N: usize>(candidates: [Option<T>; N]) -> Option<T> {
    candidates.into_iter().flatten().next()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
