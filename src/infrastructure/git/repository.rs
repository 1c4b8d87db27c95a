use git2::{Repository as Git2Repository, SubmoduleUpdateOptions};
use std::path::{Path, PathBuf};

use crate::common::{SwagError, SwagResult};

/// Version control operations needed by `install` and `refresh`
#[cfg_attr(test, mockall::automock)]
pub trait Vcs: Send + Sync {
    /// Initialize a repository in `dir`; `false` when one is already in place
    fn init(&self, dir: &Path) -> SwagResult<bool>;

    /// Add `url` as submodule at `path`; `false` when the submodule already exists
    fn add_submodule(&self, dir: &Path, url: &str, path: &str) -> SwagResult<bool>;

    /// Register every submodule listed in `.gitmodules`
    fn init_submodules(&self, dir: &Path) -> SwagResult<()>;

    /// Check out the recorded commit of every submodule
    fn update_submodules(&self, dir: &Path) -> SwagResult<()>;

    /// Working directory of the repository containing `dir`
    fn toplevel(&self, dir: &Path) -> Option<PathBuf>;
}

/// [`Vcs`] backed by libgit2
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2Vcs;

impl Git2Vcs {
    pub fn new() -> Self {
        Self
    }

    fn open(dir: &Path) -> SwagResult<Git2Repository> {
        Git2Repository::open(dir).map_err(|e| {
            SwagError::git_error_with_source(
                format!("No git repository at {}", dir.display()),
                e,
            )
        })
    }
}

impl Vcs for Git2Vcs {
    fn init(&self, dir: &Path) -> SwagResult<bool> {
        if Git2Repository::open(dir).is_ok() {
            tracing::debug!(dir = %dir.display(), "git repository already in place");
            return Ok(false);
        }

        Git2Repository::init(dir)
            .map_err(|e| SwagError::git_error_with_source("Failed to initialize repository", e))?;
        Ok(true)
    }

    fn add_submodule(&self, dir: &Path, url: &str, path: &str) -> SwagResult<bool> {
        let repo = Self::open(dir)?;
        if repo.find_submodule(path).is_ok() {
            tracing::debug!(path, "submodule already exists");
            return Ok(false);
        }

        let mut submodule = repo
            .submodule(url, Path::new(path), true)
            .map_err(|e| SwagError::git_error_with_source(format!("Failed to add submodule {}", url), e))?;

        let mut options = SubmoduleUpdateOptions::new();
        submodule
            .clone(Some(&mut options))
            .map_err(|e| SwagError::git_error_with_source(format!("Failed to clone {}", url), e))?;
        submodule.add_finalize()?;

        Ok(true)
    }

    fn init_submodules(&self, dir: &Path) -> SwagResult<()> {
        let repo = Self::open(dir)?;
        for mut submodule in repo.submodules()? {
            submodule.init(false)?;
        }
        Ok(())
    }

    fn update_submodules(&self, dir: &Path) -> SwagResult<()> {
        let repo = Self::open(dir)?;
        for mut submodule in repo.submodules()? {
            let name = submodule.name().unwrap_or_default().to_string();
            let mut options = SubmoduleUpdateOptions::new();
            submodule.update(true, Some(&mut options)).map_err(|e| {
                SwagError::git_error_with_source(format!("Failed to update submodule {}", name), e)
            })?;
        }
        Ok(())
    }

    fn toplevel(&self, dir: &Path) -> Option<PathBuf> {
        Git2Repository::discover(dir)
            .ok()
            .and_then(|repo| repo.workdir().map(Path::to_path_buf))
    }
}
