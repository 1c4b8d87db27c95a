use crate::common::{SwagError, SwagResult};
use std::path::{Path, PathBuf};

/// File marking the root directory of a project managed by swag
pub const MARKER_FILE: &str = ".shopware-cli.json";

/// Upstream Shopware repository added as submodule
pub const SUBMODULE_URL: &str = "https://github.com/shopware/shopware.git";

/// Directory the Shopware submodule is checked out to
pub const SUBMODULE_TARGET: &str = "src";

/// Entry script identifying a Shopware directory
pub const SHOPWARE_ENTRY: &str = "shopware.php";

/// Layout of the host project around a Shopware installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root: directory holding the marker file, or the starting directory
    pub base: PathBuf,
}

impl ProjectLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve the project root from `cwd` by searching upward for the marker file
    pub fn discover(cwd: &Path) -> Self {
        let base = find_up(cwd, &[MARKER_FILE])
            .and_then(|marker| marker.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| cwd.to_path_buf());
        Self { base }
    }

    /// Join path components onto the project root
    pub fn dir<I, P>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        parts
            .into_iter()
            .fold(self.base.clone(), |acc, part| acc.join(part))
    }

    pub fn marker_path(&self) -> PathBuf {
        self.base.join(MARKER_FILE)
    }

    /// Directory of the Shopware submodule
    pub fn source_dir(&self) -> PathBuf {
        self.base.join(SUBMODULE_TARGET)
    }

    pub fn is_initialized(&self) -> bool {
        self.marker_path().is_file()
    }

    /// Locate the Shopware directory
    ///
    /// Looks for `shopware.php` or `*/shopware.php` below the root first, then
    /// upward from the root.
    pub fn shopware_dir(&self) -> SwagResult<PathBuf> {
        if let Some(dir) = glob_shopware_entry(&self.base) {
            return Ok(dir);
        }

        find_up(&self.base, &[SHOPWARE_ENTRY])
            .and_then(|entry| entry.parent().map(Path::to_path_buf))
            .ok_or_else(|| {
                SwagError::project_error(
                    "Could not find shopware base dir",
                    Some(self.base.clone()),
                )
            })
    }

    /// Path of Shopware's `bin/console`
    pub fn console_path(&self) -> SwagResult<PathBuf> {
        let console = self.shopware_dir()?.join("bin").join("console");
        if console.is_file() {
            Ok(console)
        } else {
            Err(SwagError::project_error(
                "Could not find \"console\"",
                Some(self.base.clone()),
            ))
        }
    }

    /// Locate the Shopware docroot for asset tasks
    ///
    /// Without an explicit base the docroot is searched upward from `cwd`.
    /// Otherwise, or when that fails, `shopware.php` is matched below the first
    /// of: the explicit base, the git toplevel, the nearest directory holding a
    /// `.env` or `.gitmodules` file, `cwd`.
    pub fn locate_docroot(
        cwd: &Path,
        explicit_base: Option<&Path>,
        git_toplevel: Option<PathBuf>,
    ) -> SwagResult<PathBuf> {
        if explicit_base.is_none() {
            if let Some(entry) = find_up(cwd, &[SHOPWARE_ENTRY]) {
                if let Some(dir) = entry.parent() {
                    return Ok(dir.to_path_buf());
                }
            }
        }

        let search_root = explicit_base
            .map(|b| if b.is_absolute() { b.to_path_buf() } else { cwd.join(b) })
            .or(git_toplevel)
            .or_else(|| {
                find_up(cwd, &[".env", ".gitmodules"])
                    .and_then(|f| f.parent().map(Path::to_path_buf))
            })
            .unwrap_or_else(|| cwd.to_path_buf());

        glob_shopware_entry(&search_root).ok_or_else(|| {
            SwagError::project_error("Could not resolve shopware directory", Some(search_root))
        })
    }
}

/// Search `start` and its ancestors for the first of `names`
pub fn find_up(start: &Path, names: &[&str]) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        names
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.exists())
    })
}

/// Match `shopware.php` or `*/shopware.php` directly below `root`
fn glob_shopware_entry(root: &Path) -> Option<PathBuf> {
    if root.join(SHOPWARE_ENTRY).is_file() {
        return Some(root.to_path_buf());
    }

    let pattern = format!(
        "{}/*/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        SHOPWARE_ENTRY
    );
    glob::glob(&pattern)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.is_file())
        .find_map(|entry| entry.parent().map(Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discover_uses_marker_directory() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join(MARKER_FILE));
        let nested = temp.path().join("themes/Frontend/Custom");
        std::fs::create_dir_all(&nested).unwrap();

        let layout = ProjectLayout::discover(&nested);
        assert_eq!(layout.base, temp.path());
        assert!(layout.is_initialized());
    }

    #[test]
    fn test_discover_falls_back_to_cwd() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::discover(temp.path());
        assert_eq!(layout.base, temp.path());
        assert!(!layout.is_initialized());
    }

    #[test]
    fn test_dir_joins_parts() {
        let layout = ProjectLayout::new("/project");
        assert_eq!(
            layout.dir(["src", "config.php"]),
            PathBuf::from("/project/src/config.php")
        );
    }

    #[test]
    fn test_shopware_dir_in_subdirectory() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("src").join(SHOPWARE_ENTRY));

        let layout = ProjectLayout::new(temp.path());
        assert_eq!(layout.shopware_dir().unwrap(), temp.path().join("src"));
    }

    #[test]
    fn test_shopware_dir_below_root_with_glob_characters() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("shop [dev]");
        touch(&root.join("b/shopware.php"));
        touch(&root.join("a/shopware.php"));

        let layout = ProjectLayout::new(&root);
        assert_eq!(layout.shopware_dir().unwrap(), root.join("a"));
    }

    #[test]
    fn test_missing_shopware_dir_is_reported() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());

        let error = layout.shopware_dir().unwrap_err();
        assert_eq!(error.to_string(), "Could not find shopware base dir");
    }

    #[test]
    fn test_console_path_requires_binary() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("src").join(SHOPWARE_ENTRY));
        let layout = ProjectLayout::new(temp.path());

        assert_eq!(
            layout.console_path().unwrap_err().to_string(),
            "Could not find \"console\""
        );

        touch(&temp.path().join("src/bin/console"));
        assert_eq!(
            layout.console_path().unwrap(),
            temp.path().join("src/bin/console")
        );
    }

    #[test]
    fn test_locate_docroot_prefers_explicit_base() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("shop/shopware").join(SHOPWARE_ENTRY));

        let docroot =
            ProjectLayout::locate_docroot(temp.path(), Some(Path::new("shop")), None).unwrap();
        assert_eq!(docroot, temp.path().join("shop/shopware"));
    }

    #[test]
    fn test_locate_docroot_uses_project_files() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join(".gitmodules"));
        touch(&temp.path().join("src").join(SHOPWARE_ENTRY));
        let frontend = temp.path().join("frontend");
        std::fs::create_dir_all(&frontend).unwrap();

        let docroot = ProjectLayout::locate_docroot(&frontend, None, None).unwrap();
        assert_eq!(docroot, temp.path().join("src"));
    }
}
