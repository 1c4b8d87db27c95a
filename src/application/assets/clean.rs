use crate::application::assets::context::AssetContext;
use crate::application::assets::dirs::join_paths;
use crate::common::SwagResult;
use crate::infrastructure::filesystem::fs_ops::remove_matching;

const CACHE_EXTENSIONS: [&str; 4] = ["css", "less", "js", "map"];

/// Remove generated images and webpack bundles from `DIST`
pub async fn clean_dist(ctx: &AssetContext) -> SwagResult<()> {
    let dirs = ctx.dirs().await?;
    let removed = remove_matching(&join_paths(&dirs.dist, &["img/*", "js/vendor*", "js/sw"]))?;
    tracing::info!(removed, "clean:dist");
    Ok(())
}

/// Remove compiled files from `WEB/cache` and the intermediate build folders
pub async fn clean_cache(ctx: &AssetContext) -> SwagResult<()> {
    let dirs = ctx.dirs().await?;

    let mut patterns = vec![ctx.project_root.join(".tmp").to_string_lossy().into_owned()];
    patterns.extend(
        CACHE_EXTENSIONS
            .iter()
            .map(|ext| dirs.web.join("cache").join(format!("*.{}", ext)).to_string_lossy().into_owned()),
    );
    patterns.push(dirs.tmp.to_string_lossy().into_owned());

    let removed = remove_matching(&patterns)?;
    tracing::info!(removed, "clean:cache");
    Ok(())
}
