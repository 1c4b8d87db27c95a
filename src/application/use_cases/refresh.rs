use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::progress::{run_step, StepObserver, StepOutcome, StepReport};
use crate::application::services::shopware_console::ShopwareConsole;
use crate::common::{SwagError, SwagResult};
use crate::domain::entities::ProjectLayout;
use crate::domain::value_objects::ConsoleFlags;
use crate::infrastructure::filesystem::fs_ops::{copy_tree, list_dirs, symlink_relative};
use crate::infrastructure::git::Vcs;
use crate::infrastructure::process::{run_bounded, CommandSpec, ParallelConfig};

/// A project directory linked or copied into the Shopware tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Options of a refresh run
#[derive(Debug, Clone, Default)]
pub struct RefreshConfig {
    /// Shop url remembered from the install prompts
    pub url: String,

    /// Upper bound for concurrently running plugin updates and theme builds
    pub parallel: ParallelConfig,
}

/// Brings an installed project up to date with the submodule and the project's plugins and themes
pub struct RefreshUseCase {
    layout: ProjectLayout,
    vcs: Arc<dyn Vcs>,
    console: ShopwareConsole,
    observer: Arc<dyn StepObserver>,
}

impl RefreshUseCase {
    pub fn new(vcs: Arc<dyn Vcs>, console: ShopwareConsole, observer: Arc<dyn StepObserver>) -> Self {
        Self {
            layout: console.layout().clone(),
            vcs,
            console,
            observer,
        }
    }

    pub async fn execute(&self, config: &RefreshConfig) -> SwagResult<StepReport> {
        let mut report = StepReport::default();
        let observer = self.observer.as_ref();
        let base = &self.layout.base;
        let source = self.layout.source_dir();

        let title = "Update submodules";
        let outcome = run_step(observer, title, async {
            self.vcs.init_submodules(base)?;
            self.vcs.update_submodules(base)?;
            Ok(StepOutcome::Done)
        })
        .await?;
        report.push(title, outcome);

        let title = "Composer install";
        let outcome = run_step(observer, title, async {
            self.console.composer_install(&source).await?;
            Ok(StepOutcome::Done)
        })
        .await?;
        report.push(title, outcome);

        let title = "Setup shop";
        let outcome = run_step(observer, title, async {
            let flags = ConsoleFlags::new()
                .with("steps", "setupShop")
                .with("host", config.url.as_str());
            self.console.command("sw:database:setup", flags).await?;
            Ok(StepOutcome::Done)
        })
        .await?;
        report.push(title, outcome);

        let title = "Link themes and plugins";
        let outcome = run_step(observer, title, async {
            let created = self.link_all()?;
            Ok(if created == 0 {
                StepOutcome::Skipped("Everything already linked".to_string())
            } else {
                StepOutcome::Done
            })
        })
        .await?;
        report.push(title, outcome);

        let title = "Copy community plugins";
        let outcome = run_step(observer, title, async {
            let targets = self.community_plugins()?;
            if targets.is_empty() {
                return Ok(StepOutcome::Skipped("No community plugins".to_string()));
            }
            for target in &targets {
                let copied = copy_tree(&target.source, &target.target)?;
                tracing::debug!(plugin = %target.source.display(), copied, "community plugin copied");
            }
            Ok(StepOutcome::Done)
        })
        .await?;
        report.push(title, outcome);

        let title = "Run migrations";
        let outcome = run_step(observer, title, async {
            let flags = ConsoleFlags::new().with("mode", "install");
            self.console.command("sw:migrations:migrate", flags).await?;
            Ok(StepOutcome::Done)
        })
        .await?;
        report.push(title, outcome);

        let title = "Update plugins";
        let outcome = run_step(observer, title, self.update_plugins(&config.parallel)).await?;
        report.push(title, outcome);

        let title = "Generate theme cache";
        let outcome = run_step(observer, title, async {
            self.console
                .command("sw:theme:dump:configuration", ConsoleFlags::new())
                .await?;
            self.console
                .command("sw:theme:cache:generate", ConsoleFlags::new())
                .await?;
            Ok(StepOutcome::Done)
        })
        .await?;
        report.push(title, outcome);

        let title = "Build themes";
        let outcome = run_step(observer, title, self.build_themes(&config.parallel)).await?;
        report.push(title, outcome);

        Ok(report)
    }

    /// Theme and plugin directories to symlink into the Shopware tree
    pub fn link_targets(&self) -> SwagResult<Vec<LinkTarget>> {
        let base = &self.layout.base;
        let source = self.layout.source_dir();

        let mappings: [(PathBuf, PathBuf, usize); 3] = [
            (base.join("themes"), source.join("themes"), 2),
            (base.join("plugins"), source.join("custom/plugins"), 1),
            (
                base.join("plugins-legacy/Local"),
                source.join("engine/Shopware/Plugins/Local"),
                2,
            ),
        ];

        collect_targets(&mappings)
    }

    /// Community plugins, copied instead of linked
    pub fn community_plugins(&self) -> SwagResult<Vec<LinkTarget>> {
        let mappings = [(
            self.layout.dir(["plugins-legacy", "Community"]),
            self.layout.source_dir().join("engine/Shopware/Plugins/Community"),
            2,
        )];
        collect_targets(&mappings)
    }

    /// Create missing links, returning how many were created
    ///
    /// A link that cannot be created is reported and skipped.
    pub fn link_all(&self) -> SwagResult<usize> {
        let mut created = 0;
        for link in self.link_targets()? {
            match symlink_relative(&link.source, &link.target) {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(link = %link.target.display(), error = %e, "symlink failed"),
            }
        }
        Ok(created)
    }

    /// Plugin directories of the project: new style, legacy local and legacy community
    fn plugin_dirs(&self) -> SwagResult<Vec<PathBuf>> {
        let roots = [
            (self.layout.dir(["plugins"]), 1),
            (self.layout.dir(["plugins-legacy", "Local"]), 2),
            (self.layout.dir(["plugins-legacy", "Community"]), 2),
        ];

        let mut dirs = Vec::new();
        for (root, depth) in roots {
            dirs.extend(list_dirs(&root, depth)?.into_iter().map(|dir| root.join(dir)));
        }
        Ok(dirs)
    }

    async fn update_plugins(&self, parallel: &ParallelConfig) -> SwagResult<StepOutcome> {
        self.console
            .command("sw:plugin:refresh", ConsoleFlags::new())
            .await?;

        let plugins = self.plugin_dirs()?;
        if plugins.is_empty() {
            return Ok(StepOutcome::Skipped("No plugins found".to_string()));
        }

        let results = run_bounded(plugins, parallel, |dir| async move {
            let outcome = self.update_plugin(&dir).await;
            (dir, outcome)
        })
        .await;

        for (dir, outcome) in results {
            if let Err(e) = outcome {
                tracing::warn!(plugin = %dir.display(), error = %e, "plugin update failed");
            }
        }
        Ok(StepOutcome::Done)
    }

    async fn update_plugin(&self, dir: &Path) -> SwagResult<()> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SwagError::internal_error("Plugin directory without name"))?;

        if dir.join("composer.json").is_file() {
            self.console.composer(["install"], dir).await?;
        }

        for command in ["sw:plugin:install", "sw:plugin:update"] {
            self.console
                .console(&[command.to_string(), name.clone()], &ConsoleFlags::new())
                .await?;
        }
        Ok(())
    }

    /// Theme directories with their own node build
    pub fn buildable_themes(&self) -> SwagResult<Vec<PathBuf>> {
        let themes = self.layout.dir(["themes"]);
        Ok(list_dirs(&themes, 2)?
            .into_iter()
            .map(|dir| themes.join(dir))
            .filter(|dir| dir.join("package.json").is_file())
            .collect())
    }

    async fn build_themes(&self, parallel: &ParallelConfig) -> SwagResult<StepOutcome> {
        let themes = self.buildable_themes()?;
        if themes.is_empty() {
            return Ok(StepOutcome::Skipped("No theme with a package.json".to_string()));
        }

        let runner = self.console.runner();
        let results = run_bounded(themes, parallel, |dir| {
            let runner = runner.clone();
            async move {
                for spec in theme_build_commands(&dir) {
                    runner.run(&spec).await?;
                }
                Ok::<(), SwagError>(())
            }
        })
        .await;

        results
            .into_iter()
            .collect::<SwagResult<Vec<()>>>()
            .map(|_| StepOutcome::Done)
    }
}

/// Dependency install and build commands of a theme: yarn when it has a `yarn.lock`, npm otherwise
pub fn theme_build_commands(dir: &Path) -> Vec<CommandSpec> {
    if dir.join("yarn.lock").is_file() {
        vec![
            CommandSpec::new("yarn").current_dir(dir),
            CommandSpec::new("yarn").arg("build").current_dir(dir),
        ]
    } else {
        vec![
            CommandSpec::new("npm").arg("install").current_dir(dir),
            CommandSpec::new("npm").args(["run", "build"]).current_dir(dir),
        ]
    }
}

fn collect_targets(mappings: &[(PathBuf, PathBuf, usize)]) -> SwagResult<Vec<LinkTarget>> {
    let mut targets = Vec::new();
    for (from, to, depth) in mappings {
        targets.extend(list_dirs(from, *depth)?.into_iter().map(|relative| LinkTarget {
            source: from.join(&relative),
            target: to.join(&relative),
        }));
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::progress::LoggingObserver;
    use crate::infrastructure::git::MockVcs;
    use crate::infrastructure::process::{ExecutionResult, ProcessRunner};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<CommandSpec>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl ProcessRunner for RecordingRunner {
        async fn run(&self, spec: &CommandSpec) -> SwagResult<ExecutionResult> {
            self.calls.lock().unwrap().push(spec.clone());
            if let Some(needle) = self.fail_on {
                if spec.args.iter().any(|a| a == needle) {
                    return Err(SwagError::command_error("failed", spec.display(), Some(1), ""));
                }
            }
            Ok(ExecutionResult::with_stdout(""))
        }
    }

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/bin")).unwrap();
        fs::write(root.join("src/shopware.php"), "").unwrap();
        fs::write(root.join("src/bin/console"), "").unwrap();
        fs::create_dir_all(root.join("themes/Frontend/Custom")).unwrap();
        fs::create_dir_all(root.join("plugins/SwagExample")).unwrap();
        fs::write(root.join("plugins/SwagExample/composer.json"), "{}").unwrap();
        fs::create_dir_all(root.join("plugins-legacy/Local/Frontend/LegacyLocal")).unwrap();
        fs::create_dir_all(root.join("plugins-legacy/Community/Core/Vendor/Resources")).unwrap();
        fs::write(root.join("plugins-legacy/Community/Core/Vendor/Bootstrap.php"), "<?php").unwrap();
        fs::write(root.join("plugins-legacy/Community/Core/Vendor/Resources/a.xml"), "<a/>").unwrap();
        temp
    }

    fn use_case(temp: &TempDir, runner: Arc<RecordingRunner>) -> RefreshUseCase {
        let mut vcs = MockVcs::new();
        vcs.expect_init_submodules().returning(|_| Ok(()));
        vcs.expect_update_submodules().returning(|_| Ok(()));
        let console = ShopwareConsole::new(runner, ProjectLayout::new(temp.path()), temp.path().join("bin"));
        RefreshUseCase::new(Arc::new(vcs), console, Arc::new(LoggingObserver))
    }

    #[test]
    fn test_link_targets() {
        let temp = project();
        let refresh = use_case(&temp, Arc::new(RecordingRunner::default()));
        let root = temp.path();

        assert_eq!(
            refresh.link_targets().unwrap(),
            vec![
                LinkTarget {
                    source: root.join("themes/Frontend/Custom"),
                    target: root.join("src/themes/Frontend/Custom"),
                },
                LinkTarget {
                    source: root.join("plugins/SwagExample"),
                    target: root.join("src/custom/plugins/SwagExample"),
                },
                LinkTarget {
                    source: root.join("plugins-legacy/Local/Frontend/LegacyLocal"),
                    target: root.join("src/engine/Shopware/Plugins/Local/Frontend/LegacyLocal"),
                },
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_link_all_is_idempotent() {
        let temp = project();
        let refresh = use_case(&temp, Arc::new(RecordingRunner::default()));

        assert_eq!(refresh.link_all().unwrap(), 3);
        assert_eq!(refresh.link_all().unwrap(), 0);

        let link = temp.path().join("src/custom/plugins/SwagExample");
        assert_eq!(
            fs::read_link(&link).unwrap(),
            PathBuf::from("../../../plugins/SwagExample")
        );
    }

    #[tokio::test]
    async fn test_plugin_failure_does_not_fail_refresh() {
        let temp = project();
        let runner = Arc::new(RecordingRunner {
            fail_on: Some("LegacyLocal"),
            ..Default::default()
        });

        let report = use_case(&temp, runner.clone())
            .execute(&RefreshConfig {
                url: "shop.localhost".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(report
            .steps
            .iter()
            .any(|(title, outcome)| title == "Update plugins" && *outcome == StepOutcome::Done));

        assert!(temp
            .path()
            .join("src/engine/Shopware/Plugins/Community/Core/Vendor/Resources/a.xml")
            .is_file());

        let calls = runner.calls.lock().unwrap();
        let updated: Vec<&str> = calls
            .iter()
            .filter(|c| c.args.get(1).map(String::as_str) == Some("sw:plugin:update"))
            .map(|c| c.args[2].as_str())
            .collect();
        assert!(updated.contains(&"SwagExample"));
        assert!(updated.contains(&"Vendor"));
        assert!(!updated.contains(&"LegacyLocal"));

        assert!(calls
            .iter()
            .any(|c| c.args.first().map(String::as_str) == Some("install")
                && c.config.working_directory.as_deref()
                    == Some(temp.path().join("plugins/SwagExample").as_path())));
    }

    #[test]
    fn test_theme_build_commands() {
        let temp = TempDir::new().unwrap();
        let npm = theme_build_commands(temp.path());
        assert_eq!(npm[0].display(), "npm install");
        assert_eq!(npm[1].display(), "npm run build");

        fs::write(temp.path().join("yarn.lock"), "").unwrap();
        let yarn = theme_build_commands(temp.path());
        assert_eq!(yarn[0].display(), "yarn");
        assert_eq!(yarn[1].display(), "yarn build");
    }

    #[tokio::test]
    async fn test_theme_build_failure_fails_step() {
        let temp = project();
        fs::write(temp.path().join("themes/Frontend/Custom/package.json"), "{}").unwrap();
        let runner = Arc::new(RecordingRunner {
            fail_on: Some("build"),
            ..Default::default()
        });

        let result = use_case(&temp, runner)
            .execute(&RefreshConfig::default())
            .await;
        assert!(matches!(result, Err(SwagError::CommandError { .. })));
    }
}
