//! Test fixtures for Shopware project layouts

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A host project with Shopware checked out in `src`
pub struct ProjectFixture {
    pub temp: TempDir,
}

impl ProjectFixture {
    /// Project with `src/shopware.php` and `src/bin/console`
    pub fn new() -> Self {
        let fixture = Self {
            temp: TempDir::new().expect("Failed to create temp dir"),
        };
        fixture.touch("src/shopware.php");
        fixture.touch("src/bin/console");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    /// Create an empty file, including its parent directories
    pub fn touch(&self, relative: &str) -> PathBuf {
        self.write(relative, "")
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.join(relative)).expect("Failed to read file")
    }
}
