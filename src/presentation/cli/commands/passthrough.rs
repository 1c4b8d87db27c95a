use anyhow::Result;

use crate::application::use_cases::console::{PassthroughTarget, PassthroughUseCase};
use crate::presentation::cli::commands::CommandEnv;

/// Forward arguments to `bin/console` or `sw.phar`
pub struct PassthroughCommand {
    pub target: PassthroughTarget,
    pub args: Vec<String>,
    pub silent: bool,
}

impl PassthroughCommand {
    pub fn new(target: PassthroughTarget, args: Vec<String>, silent: bool) -> Self {
        Self {
            target,
            args,
            silent,
        }
    }

    pub async fn execute(&self, env: &CommandEnv) -> Result<()> {
        let settings = env.settings()?;
        let console = env.console(env.layout(), &settings);
        let output = PassthroughUseCase::new(console)
            .execute(self.target, &self.args)
            .await?;

        if !self.silent {
            print!("{}", output);
        }
        Ok(())
    }
}
