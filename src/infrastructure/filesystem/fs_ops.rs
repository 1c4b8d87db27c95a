use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::common::result::ResultExt;
use crate::common::{SwagError, SwagResult};

/// Write a file, creating missing parent directories
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> SwagResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_filesystem_error("Failed to create directory", Some(parent.to_path_buf()))?;
    }
    fs::write(path, contents).with_filesystem_error("Failed to write file", Some(path.to_path_buf()))
}

/// Create a directory and its parents
pub fn ensure_dir(path: &Path) -> SwagResult<()> {
    fs::create_dir_all(path)
        .with_filesystem_error("Failed to create directory", Some(path.to_path_buf()))
}

/// Immediate subdirectories of `root`, or of each of them when `depth` is 2
///
/// Results are relative to `root` and sorted. A missing root yields nothing.
pub fn list_dirs(root: &Path, depth: usize) -> SwagResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(depth)
        .max_depth(depth)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Create `link` pointing at `target` through a relative path
///
/// Returns `false` when something already exists at `link`.
pub fn symlink_relative(target: &Path, link: &Path) -> SwagResult<bool> {
    if link.symlink_metadata().is_ok() {
        tracing::debug!(link = %link.display(), "link already exists");
        return Ok(false);
    }

    let link_dir = link
        .parent()
        .ok_or_else(|| SwagError::filesystem_error("Link has no parent directory", Some(link.to_path_buf())))?;
    ensure_dir(link_dir)?;

    let relative = pathdiff::diff_paths(target, link_dir).unwrap_or_else(|| target.to_path_buf());
    create_symlink(&relative, link)
        .with_filesystem_error("Failed to create symlink", Some(link.to_path_buf()))?;

    tracing::debug!(link = %link.display(), target = %relative.display(), "symlink created");
    Ok(true)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

/// Copy every file below `source` into `destination`, keeping the layout
///
/// Returns the number of copied files.
pub fn copy_tree(source: &Path, destination: &Path) -> SwagResult<usize> {
    let files: Vec<PathBuf> = WalkDir::new(source)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    files
        .par_iter()
        .map(|file| {
            let relative = file.strip_prefix(source).map_err(|_| {
                SwagError::filesystem_error("File outside of source tree", Some(file.clone()))
            })?;
            let target = destination.join(relative);
            if let Some(parent) = target.parent() {
                ensure_dir(parent)?;
            }
            fs::copy(file, &target)
                .with_filesystem_error("Failed to copy file", Some(target.clone()))?;
            Ok(())
        })
        .collect::<SwagResult<Vec<()>>>()
        .map(|copied| copied.len())
}

/// Delete files and directories matching glob `patterns`
///
/// Returns the number of removed entries.
pub fn remove_matching(patterns: &[String]) -> SwagResult<usize> {
    let mut removed = 0;
    for pattern in patterns {
        for entry in glob::glob(pattern)?.filter_map(|e| e.ok()) {
            let result = if entry.is_dir() && !entry.is_symlink() {
                fs::remove_dir_all(&entry)
            } else {
                fs::remove_file(&entry)
            };
            result.with_filesystem_error("Failed to remove", Some(entry.clone()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Expand glob `patterns`, keeping only files, sorted and deduplicated
pub fn glob_files(patterns: &[String]) -> SwagResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        files.extend(
            glob::glob(pattern)?
                .filter_map(|e| e.ok())
                .filter(|p| p.is_file()),
        );
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/c.txt");
        write_file(&path, "content").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "content");
    }

    #[test]
    fn test_list_dirs() {
        let temp = TempDir::new().unwrap();
        ensure_dir(&temp.path().join("Frontend/Custom")).unwrap();
        ensure_dir(&temp.path().join("Frontend/Other")).unwrap();
        write_file(&temp.path().join("Frontend/file.txt"), "").unwrap();

        assert_eq!(
            list_dirs(temp.path(), 2).unwrap(),
            vec![PathBuf::from("Frontend/Custom"), PathBuf::from("Frontend/Other")]
        );
        assert_eq!(list_dirs(temp.path(), 1).unwrap(), vec![PathBuf::from("Frontend")]);
        assert!(list_dirs(&temp.path().join("missing"), 1).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_relative() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("themes/Frontend/Custom");
        ensure_dir(&target).unwrap();
        let link = temp.path().join("src/themes/Frontend/Custom");

        assert!(symlink_relative(&target, &link).unwrap());
        assert_eq!(
            std::fs::read_link(&link).unwrap(),
            PathBuf::from("../../../themes/Frontend/Custom")
        );
        assert!(link.join(".").exists());

        assert!(!symlink_relative(&target, &link).unwrap());
    }

    #[test]
    fn test_copy_tree() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        write_file(&source.join("Plugin.php"), "<?php").unwrap();
        write_file(&source.join("Views/index.tpl"), "{block}").unwrap();

        let destination = temp.path().join("destination");
        assert_eq!(copy_tree(&source, &destination).unwrap(), 2);
        assert_eq!(
            std::fs::read_to_string(destination.join("Views/index.tpl")).unwrap(),
            "{block}"
        );
    }

    #[test]
    fn test_remove_matching() {
        let temp = TempDir::new().unwrap();
        write_file(&temp.path().join("cache/a.css"), "").unwrap();
        write_file(&temp.path().join("cache/b.less"), "").unwrap();
        write_file(&temp.path().join("cache/keep.txt"), "").unwrap();

        let pattern = format!("{}/cache/*.css", temp.path().display());
        let less = format!("{}/cache/*.less", temp.path().display());
        assert_eq!(remove_matching(&[pattern, less]).unwrap(), 2);
        assert!(temp.path().join("cache/keep.txt").exists());
    }
}
