use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use validator::Validate;

use crate::application::services::progress::{run_step, StepObserver, StepOutcome, StepReport};
use crate::application::services::shopware_console::ShopwareConsole;
use crate::common::templates::{gitmodules_template, marker_template, TemplateProcessor};
use crate::common::SwagResult;
use crate::domain::entities::project::{SUBMODULE_TARGET, SUBMODULE_URL};
use crate::domain::entities::{InstallAnswers, ProjectLayout};
use crate::domain::value_objects::ConsoleFlags;
use crate::infrastructure::filesystem::fs_ops::{ensure_dir, write_file};
use crate::infrastructure::git::Vcs;

/// Directories created for project specific plugins and themes
pub const PROJECT_DIRS: [&str; 5] = [
    "plugins",
    "plugins-legacy/Backend",
    "plugins-legacy/Core",
    "plugins-legacy/Frontend",
    "themes/Frontend",
];

/// Demo administrator created by `install`
const DEMO_ADMIN: [(&str, &str); 5] = [
    ("name", "Demo user"),
    ("email", "demo@example.com"),
    ("username", "demo"),
    ("password", "demo"),
    ("locale", "de_DE"),
];

/// Sets up a fresh Shopware installation inside the project
pub struct InstallUseCase {
    layout: ProjectLayout,
    vcs: Arc<dyn Vcs>,
    console: ShopwareConsole,
    observer: Arc<dyn StepObserver>,
}

impl InstallUseCase {
    pub fn new(
        vcs: Arc<dyn Vcs>,
        console: ShopwareConsole,
        observer: Arc<dyn StepObserver>,
    ) -> Self {
        Self {
            layout: console.layout().clone(),
            vcs,
            console,
            observer,
        }
    }

    /// Write the marker file pointing at the preference store
    pub fn write_marker(layout: &ProjectLayout, preferences_path: &Path) -> SwagResult<()> {
        let replacements = HashMap::from([(
            "preferences",
            preferences_path.to_string_lossy().into_owned(),
        )]);
        let contents = TemplateProcessor::new().process(marker_template(), &replacements);
        write_file(&layout.marker_path(), contents)
    }

    /// Run every install step in order
    ///
    /// The git steps are skipped when their work is already done; any later
    /// failure aborts the install.
    pub async fn execute(&self, answers: &InstallAnswers) -> SwagResult<StepReport> {
        answers.validate()?;

        let mut report = StepReport::default();
        let observer = self.observer.as_ref();
        let base = &self.layout.base;
        let source = self.layout.source_dir();

        let title = "Git init";
        let outcome = run_step(observer, title, async {
            Ok(match self.vcs.init(base) {
                Ok(true) => StepOutcome::Done,
                Ok(false) => StepOutcome::Skipped("Git repository already in place".to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "git init failed");
                    StepOutcome::Skipped(e.to_string())
                }
            })
        })
        .await?;
        report.push(title, outcome);

        let title = "Add shopware submodule";
        let outcome = run_step(observer, title, async {
            match self.vcs.add_submodule(base, SUBMODULE_URL, SUBMODULE_TARGET) {
                Ok(true) => {
                    self.write_gitmodules()?;
                    Ok(StepOutcome::Done)
                }
                Ok(false) => Ok(StepOutcome::Skipped(
                    "Submodule already exists in the index".to_string(),
                )),
                Err(e) => {
                    tracing::warn!(error = %e, "adding submodule failed");
                    Ok(StepOutcome::Skipped(e.to_string()))
                }
            }
        })
        .await?;
        report.push(title, outcome);

        let title = "Write config.php";
        let outcome = run_step(observer, title, async {
            write_file(&source.join("config.php"), answers.render_config_php())?;
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

        let title = "Setup database";
        let flags = ConsoleFlags::new()
            .with("steps", "drop,create,import,setupShop")
            .with("host", answers.url.as_str())
            .with("path", "");
        let outcome = self.console_step(title, "sw:database:setup", flags).await?;
        report.push(title, outcome);

        let title = "Initialize theme";
        let outcome = self
            .console_step(title, "sw:theme:initialize", ConsoleFlags::new())
            .await?;
        report.push(title, outcome);

        let title = "Disable first run wizard";
        let outcome = self
            .console_step(title, "sw:firstrunwizard:disable", ConsoleFlags::new())
            .await?;
        report.push(title, outcome);

        let title = "Create admin user";
        let flags = DEMO_ADMIN
            .iter()
            .fold(ConsoleFlags::new(), |flags, (key, value)| flags.with(*key, *value));
        let outcome = self.console_step(title, "sw:admin:create", flags).await?;
        report.push(title, outcome);

        let title = "Write install lock";
        let outcome = run_step(observer, title, async {
            let lock = source.join("recovery/install/data/install.lock");
            write_file(&lock, Local::now().format("%Y%m%d%H%M").to_string())?;
            Ok(StepOutcome::Done)
        })
        .await?;
        report.push(title, outcome);

        let title = "Create project directories";
        let outcome = run_step(observer, title, async {
            for dir in PROJECT_DIRS {
                let path = base.join(dir);
                ensure_dir(&path)?;
                write_file(&path.join(".gitkeep"), "")?;
            }
            Ok(StepOutcome::Done)
        })
        .await?;
        report.push(title, outcome);

        Ok(report)
    }

    fn write_gitmodules(&self) -> SwagResult<()> {
        let replacements = HashMap::from([
            ("target", SUBMODULE_TARGET.to_string()),
            ("url", SUBMODULE_URL.to_string()),
        ]);
        let contents = TemplateProcessor::new().process(gitmodules_template(), &replacements);
        write_file(&self.layout.base.join(".gitmodules"), contents)
    }

    async fn console_step(
        &self,
        title: &str,
        command: &str,
        flags: ConsoleFlags,
    ) -> SwagResult<StepOutcome> {
        run_step(self.observer.as_ref(), title, async {
            self.console.command(command, flags).await?;
            Ok(StepOutcome::Done)
        })
        .await
    }
}
