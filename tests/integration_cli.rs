//! Command line behavior of the `swag` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn swag(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("swag").unwrap();
    cmd.current_dir(dir.path())
        .env("SWAG_CONFIG_PATH", dir.path().join("config.json"))
        .env("NO_COLOR", "1")
        .env_remove("SWAG_BIN_DIR")
        .env_remove("base");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    swag(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("refresh"))
        .stdout(predicate::str::contains("cache:clear"))
        .stdout(predicate::str::contains("assets"));
}

#[test]
fn test_console_outside_a_project_fails() {
    let temp = TempDir::new().unwrap();
    swag(&temp)
        .args(["console", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not find shopware base dir"));
}

#[test]
fn test_tools_outside_a_project_fails() {
    let temp = TempDir::new().unwrap();
    swag(&temp)
        .args(["tools", "plugin:zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find shopware base dir"));
}

#[test]
fn test_assets_lists_tasks() {
    let temp = TempDir::new().unwrap();
    swag(&temp)
        .args(["assets", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Available asset tasks"))
        .stdout(predicate::str::contains("build:compile:nophp"))
        .stdout(predicate::str::contains("regression:test"));

    swag(&temp)
        .arg("assets")
        .assert()
        .success()
        .stdout(predicate::str::contains("clean:dist"));
}

#[test]
fn test_unknown_asset_task_fails() {
    let temp = TempDir::new().unwrap();
    swag(&temp)
        .args(["assets", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#"Task "nope" is not defined"#));
}

#[test]
fn test_unknown_command_is_rejected() {
    let temp = TempDir::new().unwrap();
    swag(&temp).arg("frobnicate").assert().failure().code(2);
}

#[test]
fn test_long_version_carries_build_metadata() {
    let temp = TempDir::new().unwrap();
    swag(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("swag "))
        .stdout(predicate::str::contains("built"));
}
