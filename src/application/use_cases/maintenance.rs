use std::path::Path;

use walkdir::WalkDir;

use crate::application::services::shopware_console::ShopwareConsole;
use crate::common::SwagResult;
use crate::domain::value_objects::ConsoleFlags;

/// Directories Shopware writes to at runtime, relative to the Shopware dir
pub const WRITABLE_DIRS: [&str; 7] = [
    "var",
    "web",
    "files",
    "media",
    "custom/plugins",
    "engine/Shopware/Plugins/Community",
    "engine/Shopware/Plugins/Local",
];

const DIR_MODE: u32 = 0o775;
const FILE_MODE: u32 = 0o664;

/// `sw:cache:clear` for the given environment
pub async fn clear_cache(console: &ShopwareConsole, env: &str) -> SwagResult<String> {
    console
        .command("sw:cache:clear", ConsoleFlags::new().with("env", env))
        .await
}

/// Make the writable directories group-writable, returning the number of touched entries
///
/// Missing directories are ignored. Symlinks are not followed.
pub fn fix_permissions(shopware_dir: &Path) -> SwagResult<usize> {
    let mut touched = 0;
    for dir in WRITABLE_DIRS {
        let root = shopware_dir.join(dir);
        if !root.is_dir() {
            tracing::debug!(dir = %root.display(), "skipping missing directory");
            continue;
        }

        for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                continue;
            }
            let mode = if file_type.is_dir() { DIR_MODE } else { FILE_MODE };
            set_mode(entry.path(), mode)?;
            touched += 1;
        }
    }
    Ok(touched)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> SwagResult<()> {
    use crate::common::result::ResultExt;
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_filesystem_error("Failed to change permissions", Some(path.to_path_buf()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> SwagResult<()> {
    Ok(())
}
