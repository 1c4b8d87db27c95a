//! Refresh use case: links, copies and fan-out against a recorded runner

mod common;

use std::sync::Arc;

use common::{FakeVcs, ProjectFixture, RecordingRunner};
use pretty_assertions::assert_eq;
use swag::application::services::{LoggingObserver, ShopwareConsole, StepOutcome};
use swag::application::use_cases::refresh::{RefreshConfig, RefreshUseCase};
use swag::domain::entities::ProjectLayout;
use swag::infrastructure::process::ParallelConfig;

fn refresh(fixture: &ProjectFixture, vcs: Arc<FakeVcs>, runner: Arc<RecordingRunner>) -> RefreshUseCase {
    let console = ShopwareConsole::new(runner, ProjectLayout::new(fixture.path()), fixture.join("bin"));
    RefreshUseCase::new(vcs, console, Arc::new(LoggingObserver))
}

fn config() -> RefreshConfig {
    RefreshConfig {
        url: "shop.localhost".to_string(),
        parallel: ParallelConfig::new().with_max_concurrency(2),
    }
}

fn project_with_extensions() -> ProjectFixture {
    let fixture = ProjectFixture::new();
    fixture.touch("themes/Frontend/Custom/Theme.php");
    fixture.touch("plugins/SwagExample/SwagExample.php");
    fixture.write("plugins/SwagComposer/composer.json", "{}");
    fixture.touch("plugins-legacy/Local/Frontend/LegacyLocal/Bootstrap.php");
    fixture.write("plugins-legacy/Community/Core/Vendor/Bootstrap.php", "<?php // community");
    fixture
}

#[cfg(unix)]
#[tokio::test]
async fn test_refresh_creates_relative_symlinks() {
    let fixture = project_with_extensions();

    refresh(&fixture, Arc::new(FakeVcs::default()), Arc::new(RecordingRunner::default()))
        .execute(&config())
        .await
        .unwrap();

    let theme_link = fixture.join("src/themes/Frontend/Custom");
    let metadata = std::fs::symlink_metadata(&theme_link).unwrap();
    assert!(metadata.file_type().is_symlink());
    let target = std::fs::read_link(&theme_link).unwrap();
    assert!(target.is_relative(), "{}", target.display());
    assert!(theme_link.join("Theme.php").is_file());

    assert!(fixture.join("src/custom/plugins/SwagExample/SwagExample.php").is_file());
    assert!(std::fs::symlink_metadata(fixture.join("src/custom/plugins/SwagExample"))
        .unwrap()
        .file_type()
        .is_symlink());
    assert!(fixture
        .join("src/engine/Shopware/Plugins/Local/Frontend/LegacyLocal/Bootstrap.php")
        .is_file());
}

#[tokio::test]
async fn test_refresh_copies_community_plugins() {
    let fixture = project_with_extensions();

    refresh(&fixture, Arc::new(FakeVcs::default()), Arc::new(RecordingRunner::default()))
        .execute(&config())
        .await
        .unwrap();

    let copied = fixture.join("src/engine/Shopware/Plugins/Community/Core/Vendor");
    assert!(!std::fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
    assert_eq!(
        fixture.read("src/engine/Shopware/Plugins/Community/Core/Vendor/Bootstrap.php"),
        "<?php // community"
    );
}

#[tokio::test]
async fn test_refresh_updates_every_plugin() {
    let fixture = project_with_extensions();
    let vcs = Arc::new(FakeVcs::default());
    let runner = Arc::new(RecordingRunner::default());

    let report = refresh(&fixture, vcs.clone(), runner.clone())
        .execute(&config())
        .await
        .unwrap();

    assert_eq!(vcs.calls(), vec!["init_submodules", "update_submodules"]);
    assert_eq!(report.steps.len(), 9);

    let commands = runner.console_commands();
    assert_eq!(commands[0], "sw:database:setup");
    assert_eq!(commands[1], "sw:migrations:migrate");
    assert_eq!(commands[2], "sw:plugin:refresh");
    for plugin in ["SwagExample", "SwagComposer", "LegacyLocal", "Vendor"] {
        let installs = runner
            .calls()
            .into_iter()
            .filter(|c| c.args.iter().any(|a| a == plugin))
            .count();
        assert_eq!(installs, 2, "install and update for {}", plugin);
    }

    let composer = runner
        .calls()
        .into_iter()
        .find(|c| c.program == "composer" && c.args == vec!["install".to_string()])
        .unwrap();
    assert_eq!(
        composer.config.working_directory,
        Some(fixture.join("plugins/SwagComposer"))
    );

    let setup = runner.find("sw:database:setup").unwrap();
    assert!(setup.args.contains(&"--steps=setupShop".to_string()));
    assert!(setup.args.contains(&"--host=shop.localhost".to_string()));
}

#[tokio::test]
async fn test_failing_plugin_does_not_fail_refresh() {
    let fixture = project_with_extensions();
    let runner = Arc::new(RecordingRunner::failing_on("SwagExample"));

    let report = refresh(&fixture, Arc::new(FakeVcs::default()), runner.clone())
        .execute(&config())
        .await
        .unwrap();

    let (_, outcome) = report
        .steps
        .iter()
        .find(|(title, _)| title == "Update plugins")
        .unwrap();
    assert_eq!(*outcome, StepOutcome::Done);
    assert!(runner.find("LegacyLocal").is_some());
}

#[tokio::test]
async fn test_theme_builds_follow_lock_file() {
    let fixture = ProjectFixture::new();
    fixture.write("themes/Frontend/Yarn/package.json", "{}");
    fixture.touch("themes/Frontend/Yarn/yarn.lock");
    fixture.write("themes/Frontend/Npm/package.json", "{}");

    // Themes build concurrently, so only membership is checked
    let runner = Arc::new(RecordingRunner::default());
    refresh(&fixture, Arc::new(FakeVcs::default()), runner.clone())
        .execute(&config())
        .await
        .unwrap();

    let calls = runner.calls();
    let yarn_build = calls
        .iter()
        .find(|c| c.program == "yarn" && c.args == vec!["build".to_string()])
        .unwrap();
    assert_eq!(
        yarn_build.config.working_directory,
        Some(fixture.join("themes/Frontend/Yarn"))
    );
    assert!(calls
        .iter()
        .any(|c| c.program == "npm" && c.args == vec!["run".to_string(), "build".to_string()]));
}
