use std::sync::Arc;

use crate::common::{SwagError, SwagResult};
use crate::domain::entities::DbSettings;
use crate::infrastructure::process::{CommandSpec, ProcessRunner};

const QUERY_TIMEOUT_SECS: u64 = 30;

/// Runs queries through the `mysql` command line client
///
/// The password travels in `MYSQL_PWD` so it never shows up in the process list.
pub struct MySqlClient {
    runner: Arc<dyn ProcessRunner>,
    db: DbSettings,
}

impl MySqlClient {
    pub fn new(runner: Arc<dyn ProcessRunner>, db: DbSettings) -> Self {
        Self { runner, db }
    }

    fn command(&self, sql: &str) -> SwagResult<CommandSpec> {
        let dbname = self
            .db
            .dbname
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| SwagError::config_error("Missing database name"))?;

        let mut spec = CommandSpec::new("mysql")
            .args(["--batch", "--skip-column-names"])
            .with_timeout(QUERY_TIMEOUT_SECS);

        if let Some(host) = self.db.host.as_deref().filter(|h| !h.is_empty()) {
            spec = spec.arg(format!("--host={}", host));
        }
        if let Some(port) = self.db.port.as_deref().filter(|p| !p.is_empty()) {
            spec = spec.arg(format!("--port={}", port));
        }
        if let Some(user) = self.db.username.as_deref().filter(|u| !u.is_empty()) {
            spec = spec.arg(format!("--user={}", user));
        }
        if let Some(password) = self.db.password.as_deref() {
            spec = spec.env("MYSQL_PWD", password);
        }

        Ok(spec.arg(format!("--database={}", dbname)).args(["-e", sql]))
    }

    /// Execute `sql`, returning tab separated rows
    pub async fn query(&self, sql: &str) -> SwagResult<Vec<Vec<String>>> {
        if sql.trim().is_empty() {
            return Err(SwagError::validation_error("sql", "Empty db query", None));
        }

        let result = self.runner.run(&self.command(sql)?).await?;
        Ok(result
            .stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.split('\t').map(str::to_string).collect())
            .collect())
    }
}

/// Quote a value as a MySQL string literal
pub fn sql_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\0' => quoted.push_str("\\0"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\x1a' => quoted.push_str("\\Z"),
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
