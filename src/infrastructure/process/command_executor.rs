use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command as TokioCommand;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::common::{SwagError, SwagResult};

/// Configuration for command execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Working directory for command execution
    pub working_directory: Option<PathBuf>,

    /// Environment variables added to the inherited environment
    pub environment_variables: HashMap<String, String>,

    /// Timeout for command execution in seconds
    pub timeout_seconds: Option<u64>,
}

/// A program with its arguments and execution settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub config: ExecutionConfig,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            config: ExecutionConfig::default(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set working directory
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .environment_variables
            .insert(key.into(), value.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Command line for messages and logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of command execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code of the process
    pub exit_code: i32,

    /// Standard output
    pub stdout: String,

    /// Standard error output
    pub stderr: String,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    pub fn new(exit_code: i32, stdout: String, stderr: String, execution_time_ms: u64) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            execution_time_ms,
        }
    }

    /// A successful run with the given output, for runners that do not spawn anything
    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout.into(), String::new(), 0)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Seam for spawning external programs
///
/// A non-zero exit status is reported as [`SwagError::CommandError`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> SwagResult<ExecutionResult>;
}

/// Command executor for running external processes
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }

    async fn execute(spec: &CommandSpec) -> SwagResult<ExecutionResult> {
        let start_time = Instant::now();

        let mut cmd = TokioCommand::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(working_dir) = &spec.config.working_directory {
            cmd.current_dir(working_dir);
        }
        for (key, value) in &spec.config.environment_variables {
            cmd.env(key, value);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);

        tracing::debug!(
            command = %spec.display(),
            cwd = ?spec.config.working_directory,
            "spawning command"
        );

        let child = cmd.spawn().map_err(|e| {
            SwagError::command_error_with_source(
                format!("Failed to spawn '{}'", spec.program),
                spec.display(),
                e,
            )
        })?;

        let output = match spec.config.timeout_seconds {
            Some(timeout_secs) => timeout(
                Duration::from_secs(timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| SwagError::timeout(timeout_secs))?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| {
            SwagError::command_error_with_source(
                format!("Failed to wait for '{}'", spec.program),
                spec.display(),
                e,
            )
        })?;

        let result = ExecutionResult::new(
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            start_time.elapsed().as_millis() as u64,
        );

        tracing::debug!(
            command = %spec.display(),
            exit_code = result.exit_code,
            elapsed_ms = result.execution_time_ms,
            "command finished"
        );

        if result.success() {
            Ok(result)
        } else {
            Err(SwagError::command_error(
                format!("{} exited with code {}", spec.program, result.exit_code),
                spec.display(),
                Some(result.exit_code),
                result.stderr,
            ))
        }
    }
}

#[async_trait]
impl ProcessRunner for CommandExecutor {
    async fn run(&self, spec: &CommandSpec) -> SwagResult<ExecutionResult> {
        Self::execute(spec).await
    }
}

/// Parallel execution configuration
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Maximum number of concurrent executions
    pub max_concurrency: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_concurrency: num_cpus::get(),
        }
    }
}

impl ParallelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum concurrency
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}

/// Run `task` for every item, at most `max_concurrency` at a time
///
/// All items run to completion; results keep the order of `items`.
pub async fn run_bounded<T, F, Fut, R>(items: Vec<T>, config: &ParallelConfig, task: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));

    let futures = items.into_iter().map(|item| {
        let sem = semaphore.clone();
        let fut = task(item);
        async move {
            let _permit = sem.acquire().await.ok();
            fut.await
        }
    });

    futures::future::join_all(futures).await
}
