use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::application::assets::context::AssetContext;
use crate::common::result::ResultExt;
use crate::common::SwagResult;
use crate::infrastructure::filesystem::fs_ops::{glob_files, write_file};

/// Image extensions that get content hashed
pub const REV_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "gif", "png", "webp", "svg"];

/// Prefix dropped from manifest keys when rewriting references inside `DIST`
const RESOURCES_PREFIX: &str = "frontend/_resources/";

/// Original file names mapped to their hashed names
pub type RevManifest = BTreeMap<String, String>;

/// First 10 hex digits of the SHA-256 of `content`
pub fn content_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest.iter().take(5).map(|b| format!("{:02x}", b)).collect()
}

/// `dir/name.ext` becomes `dir/name-<hash>.ext`
pub fn revved_name(relative: &str, hash: &str) -> String {
    let path = Path::new(relative);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, hash, ext.to_string_lossy()),
        None => format!("{}-{}", stem, hash),
    };
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => format!("{}/{}", parent.to_string_lossy(), file),
        None => file,
    }
}

/// Rewrite every manifest key found in `content` to its hashed name
///
/// Keys are also matched without their `frontend/_resources/` prefix. Longer
/// keys are replaced first so a key never clobbers a longer one containing it.
pub fn replace_references(content: &str, manifest: &RevManifest) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for (original, revved) in manifest {
        pairs.push((original, revved));
        if let (Some(short_original), Some(short_revved)) = (
            original.strip_prefix(RESOURCES_PREFIX),
            revved.strip_prefix(RESOURCES_PREFIX),
        ) {
            pairs.push((short_original, short_revved));
        }
    }
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

    // Placeholders keep already rewritten names from matching shorter keys
    let mut output = content.to_string();
    for (index, (original, _)) in pairs.iter().enumerate() {
        output = output.replace(original, &format!("\u{0}{}\u{0}", index));
    }
    for (index, (_, revved)) in pairs.iter().enumerate() {
        output = output.replace(&format!("\u{0}{}\u{0}", index), revved);
    }
    output
}

fn read_manifest(path: &Path) -> SwagResult<RevManifest> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RevManifest::new()),
        Err(e) => Err(e).with_filesystem_error("Failed to read rev manifest", Some(path.to_path_buf())),
    }
}

fn revisable_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .map_or(false, |ext| REV_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect()
}

/// Hash the images of `tmp` into `root` and merge the names into `manifest_path`
pub fn rev_files(tmp: &Path, root: &Path, manifest_path: &Path) -> SwagResult<RevManifest> {
    let entries = revisable_files(tmp)
        .par_iter()
        .map(|file| {
            let relative = file
                .strip_prefix(tmp)
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            let content = std::fs::read(file)
                .with_filesystem_error("Failed to read file", Some(file.clone()))?;
            let revved = revved_name(&relative, &content_hash(&content));
            write_file(&root.join(&revved), &content)?;
            Ok((relative, revved))
        })
        .collect::<SwagResult<Vec<_>>>()?;

    let mut manifest = read_manifest(manifest_path)?;
    manifest.extend(entries);
    write_file(manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    Ok(manifest)
}

pub async fn rev_files_task(ctx: &AssetContext) -> SwagResult<()> {
    let dirs = ctx.dirs().await?;
    let manifest = rev_files(&dirs.tmp, &dirs.root, &dirs.dist.join("rev-manifest.json"))?;
    tracing::info!(entries = manifest.len(), "rev manifest written");
    Ok(())
}

/// Rewrite references in `DIST/styles/*.css` and `DIST/scripts/*.js`
pub async fn rev_replace(ctx: &AssetContext) -> SwagResult<()> {
    let dirs = ctx.dirs().await?;
    let manifest = read_manifest(&dirs.dist.join("rev-manifest.json"))?;
    if manifest.is_empty() {
        return Ok(());
    }

    let patterns = [
        dirs.dist.join("styles/*.css").to_string_lossy().into_owned(),
        dirs.dist.join("scripts/*.js").to_string_lossy().into_owned(),
    ];
    for file in glob_files(&patterns)? {
        let content = std::fs::read_to_string(&file)
            .with_filesystem_error("Failed to read file", Some(file.clone()))?;
        let replaced = replace_references(&content, &manifest);
        if replaced != content {
            write_file(&file, replaced)?;
            tracing::debug!(file = %file.display(), "references replaced");
        }
    }
    Ok(())
}
