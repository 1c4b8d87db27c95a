/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - Git operations through libgit2 (repository init, submodules)
/// - File system operations (preference store, settings files, symlinks)
/// - Process execution (command runner, bounded fan-out)
/// - PHP-FPM access over FastCGI and MySQL through its command line client
pub mod fastcgi;
pub mod filesystem;
pub mod git;
pub mod mysql;
pub mod process;

// Re-export commonly used types
pub use fastcgi::FastCgiClient;
pub use filesystem::PreferenceStore;
pub use git::{Git2Vcs, Vcs};
pub use mysql::MySqlClient;
pub use process::{CommandExecutor, CommandSpec, ProcessRunner};
