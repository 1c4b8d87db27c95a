//! Mock services for testing

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use swag::infrastructure::process::{CommandSpec, ExecutionResult, ProcessRunner};
use swag::infrastructure::Vcs;
use swag::{SwagError, Result};

/// Process runner that records every command instead of spawning it
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    /// Commands containing this argument fail with exit code 1
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn failing_on(arg: impl Into<String>) -> Self {
        Self {
            fail_on: Some(arg.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Console commands (`php <console> <command> --ansi …`) in call order
    pub fn console_commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == "php" && c.args.get(2).map(String::as_str) == Some("--ansi"))
            .map(|c| c.args[1].clone())
            .collect()
    }

    pub fn find(&self, arg: &str) -> Option<CommandSpec> {
        self.calls().into_iter().find(|c| c.args.iter().any(|a| a == arg))
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(spec.clone());
        if let Some(needle) = &self.fail_on {
            if spec.args.iter().any(|a| a == needle) {
                return Err(SwagError::command_error(
                    format!("{} exited with code 1", spec.program),
                    spec.display(),
                    Some(1),
                    "simulated failure",
                ));
            }
        }
        Ok(ExecutionResult::with_stdout(""))
    }
}

/// VCS double: a fresh repository the first time, then everything is in place
#[derive(Default)]
pub struct FakeVcs {
    initialized: Mutex<bool>,
    submodules: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeVcs {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl Vcs for FakeVcs {
    fn init(&self, _dir: &Path) -> Result<bool> {
        self.record("init");
        let mut initialized = self.initialized.lock().unwrap();
        let created = !*initialized;
        *initialized = true;
        Ok(created)
    }

    fn add_submodule(&self, _dir: &Path, _url: &str, path: &str) -> Result<bool> {
        self.record("add_submodule");
        let mut submodules = self.submodules.lock().unwrap();
        if submodules.iter().any(|s| s == path) {
            return Ok(false);
        }
        submodules.push(path.to_string());
        Ok(true)
    }

    fn init_submodules(&self, _dir: &Path) -> Result<()> {
        self.record("init_submodules");
        Ok(())
    }

    fn update_submodules(&self, _dir: &Path) -> Result<()> {
        self.record("update_submodules");
        Ok(())
    }

    fn toplevel(&self, _dir: &Path) -> Option<PathBuf> {
        None
    }
}
