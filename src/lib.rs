//! # swag - Shopware project helper
//!
//! `swag` installs, updates and manages a Shopware installation living as a git
//! submodule inside a host project. It drives git, composer, Shopware's
//! `bin/console`, the bundled `sw.phar` and a theme asset pipeline.
//!
//! ## Quick Start
//!
//! ```bash
//! swag install --url shop.localhost --dbname shop --dbuser root --yes
//! swag refresh
//! swag console sw:plugin:list --filter=active
//! swag assets build
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: project layout, settings, install answers and console flags
//! - [`application`]: install, refresh, passthrough and maintenance use cases,
//!   plus the asset task graph
//! - [`infrastructure`]: process execution, libgit2, file system helpers,
//!   FastCGI and MySQL access
//! - [`presentation`]: CLI interface, prompts and task-list output
//! - [`common`]: error handling and embedded templates
//!
//! ## Error Handling
//!
//! - [`common::error::SwagError`]: main error type with detailed context
//! - [`common::result::SwagResult`]: type alias for `Result<T, SwagError>`
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swag::application::services::ShopwareConsole;
//! use swag::application::use_cases::console::{PassthroughTarget, PassthroughUseCase};
//! use swag::domain::entities::ProjectLayout;
//! use swag::infrastructure::CommandExecutor;
//!
//! # async fn example() -> swag::Result<()> {
//! let layout = ProjectLayout::discover(&std::env::current_dir()?);
//! let console = ShopwareConsole::new(Arc::new(CommandExecutor::new()), layout, "bin".into());
//!
//! let output = PassthroughUseCase::new(console)
//!     .execute(PassthroughTarget::Console, &["sw:plugin:list"])
//!     .await?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::SwagError;
pub use crate::common::result::SwagResult as Result;
