use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::SwagResult;
use crate::domain::entities::ProjectLayout;
use crate::domain::value_objects::ConsoleFlags;
use crate::infrastructure::fastcgi::FastCgiClient;
use crate::infrastructure::process::{CommandExecutor, CommandSpec, ProcessRunner};

/// Environment variable overriding the directory holding `sw.phar` and `composer.phar`
pub const BIN_DIR_ENV: &str = "SWAG_BIN_DIR";

/// Default location of the bundled phar files
pub fn default_bin_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("swag").join("bin"))
        .unwrap_or_else(|| PathBuf::from("bin"))
}

/// Access to Shopware's `bin/console`, `sw.phar` and composer
///
/// Console calls go through PHP-FPM when a FastCGI client is configured.
#[derive(Clone)]
pub struct ShopwareConsole {
    runner: Arc<dyn ProcessRunner>,
    layout: ProjectLayout,
    bin_dir: PathBuf,
    fastcgi: Option<FastCgiClient>,
}

impl ShopwareConsole {
    pub fn new(runner: Arc<dyn ProcessRunner>, layout: ProjectLayout, bin_dir: PathBuf) -> Self {
        Self {
            runner,
            layout,
            bin_dir,
            fastcgi: None,
        }
    }

    pub fn with_fastcgi(mut self, client: Option<FastCgiClient>) -> Self {
        self.fastcgi = client;
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        self.runner.clone()
    }

    /// `php <console> <input…> --ansi <flags…>` in the Shopware directory
    pub async fn console(&self, input: &[String], flags: &ConsoleFlags) -> SwagResult<String> {
        if let Some(client) = &self.fastcgi {
            let args: Vec<String> = input.iter().cloned().chain(flags.to_args()).collect();
            return client.console(&args).await;
        }

        let console = self.layout.console_path()?;
        let shopware_dir = self.layout.shopware_dir()?;
        let spec = CommandSpec::new("php")
            .arg(console.to_string_lossy())
            .args(input.iter().cloned())
            .arg("--ansi")
            .args(flags.to_args())
            .current_dir(&shopware_dir);

        Ok(self.runner.run(&spec).await?.stdout)
    }

    /// Console command without positional arguments besides its name
    pub async fn command(&self, name: &str, flags: ConsoleFlags) -> SwagResult<String> {
        self.console(&[name.to_string()], &flags).await
    }

    /// `php <bin dir>/sw.phar <input…> --ansi <flags…>` in the Shopware directory
    pub async fn phar(&self, input: &[String], flags: &ConsoleFlags) -> SwagResult<String> {
        let shopware_dir = self.layout.shopware_dir()?;
        let spec = CommandSpec::new("php")
            .arg(self.bin_dir.join("sw.phar").to_string_lossy())
            .args(input.iter().cloned())
            .arg("--ansi")
            .args(flags.to_args())
            .current_dir(&shopware_dir);

        Ok(self.runner.run(&spec).await?.stdout)
    }

    /// Run composer: the bundled `composer.phar` when present, `composer` otherwise
    pub async fn composer<I, S>(&self, args: I, cwd: &Path) -> SwagResult<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phar = self.bin_dir.join("composer.phar");
        let spec = if phar.is_file() {
            CommandSpec::new("php").arg(phar.to_string_lossy())
        } else {
            if !CommandExecutor::command_exists("composer") {
                tracing::warn!("composer.phar not found in {}", self.bin_dir.display());
            }
            CommandSpec::new("composer")
        };

        let spec = spec.args(args).current_dir(cwd);
        Ok(self.runner.run(&spec).await?.stdout)
    }

    /// `composer install -o -d <dir>`
    pub async fn composer_install(&self, dir: &Path) -> SwagResult<String> {
        self.composer(
            ["install".to_string(), "-o".to_string(), "-d".to_string(), dir.to_string_lossy().into_owned()],
            &self.layout.base,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SwagError;
    use crate::infrastructure::process::ExecutionResult;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<CommandSpec>>,
    }

    #[async_trait]
    impl ProcessRunner for RecordingRunner {
        async fn run(&self, spec: &CommandSpec) -> SwagResult<ExecutionResult> {
            self.calls.lock().unwrap().push(spec.clone());
            Ok(ExecutionResult::with_stdout("ok"))
        }
    }

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src/bin")).unwrap();
        std::fs::write(temp.path().join("src/shopware.php"), "").unwrap();
        std::fs::write(temp.path().join("src/bin/console"), "").unwrap();
        temp
    }

    #[tokio::test]
    async fn test_console_arguments() {
        let temp = project();
        let runner = Arc::new(RecordingRunner::default());
        let console = ShopwareConsole::new(
            runner.clone(),
            ProjectLayout::new(temp.path()),
            temp.path().join("bin"),
        );

        let flags = ConsoleFlags::new().with("steps", "setupShop").with("host", "shop.localhost");
        console.command("sw:database:setup", flags).await.unwrap();

        let calls = runner.calls.lock().unwrap();
        let spec = &calls[0];
        assert_eq!(spec.program, "php");
        assert_eq!(
            spec.args,
            vec![
                temp.path().join("src/bin/console").to_string_lossy().into_owned(),
                "sw:database:setup".to_string(),
                "--ansi".to_string(),
                "--steps=setupShop".to_string(),
                "--host=shop.localhost".to_string(),
            ]
        );
        assert_eq!(spec.config.working_directory.as_deref(), Some(temp.path().join("src").as_path()));
    }

    #[tokio::test]
    async fn test_phar_uses_bin_dir() {
        let temp = project();
        let runner = Arc::new(RecordingRunner::default());
        let console = ShopwareConsole::new(
            runner.clone(),
            ProjectLayout::new(temp.path()),
            PathBuf::from("/opt/swag/bin"),
        );

        console
            .phar(&["plugin:zip".to_string()], &ConsoleFlags::new())
            .await
            .unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].args[0], "/opt/swag/bin/sw.phar");
        assert_eq!(calls[0].args[1..], ["plugin:zip", "--ansi"]);
    }

    #[tokio::test]
    async fn test_console_outside_project() {
        let temp = TempDir::new().unwrap();
        let console = ShopwareConsole::new(
            Arc::new(RecordingRunner::default()),
            ProjectLayout::new(temp.path()),
            temp.path().join("bin"),
        );

        let error = console
            .console(&["sw:cache:clear".to_string()], &ConsoleFlags::new())
            .await
            .unwrap_err();
        assert!(matches!(error, SwagError::ProjectError { .. }));
    }

    #[tokio::test]
    async fn test_composer_prefers_bundled_phar() {
        let temp = project();
        let bin = temp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("composer.phar"), "").unwrap();

        let runner = Arc::new(RecordingRunner::default());
        let console = ShopwareConsole::new(runner.clone(), ProjectLayout::new(temp.path()), bin.clone());
        console.composer_install(&temp.path().join("src")).await.unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].program, "php");
        assert_eq!(calls[0].args[0], bin.join("composer.phar").to_string_lossy());
        assert_eq!(calls[0].args[1..4], ["install", "-o", "-d"]);
    }
}
