pub mod command_executor;

pub use command_executor::{
    run_bounded, CommandExecutor, CommandSpec, ExecutionConfig, ExecutionResult, ParallelConfig,
    ProcessRunner,
};
