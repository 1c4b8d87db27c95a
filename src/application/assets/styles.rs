use std::collections::HashMap;
use std::path::Path;

use crate::application::assets::context::AssetContext;
use crate::application::assets::dirs::{join_path, ThemeDirs};
use crate::common::result::ResultExt;
use crate::common::templates::{all_less_template, TemplateProcessor};
use crate::common::SwagResult;
use crate::domain::entities::ThemeConfig;
use crate::infrastructure::filesystem::fs_ops::write_file;

/// `@import` lines for every LESS file of the theme configuration, relative to `WEB/cache`
pub fn dev_less(config: &ThemeConfig, dirs: &ThemeDirs) -> String {
    let cache = dirs.web.join("cache");
    config
        .less
        .iter()
        .map(|file| {
            let absolute = join_path(&dirs.docroot, file);
            let relative = pathdiff::diff_paths(&absolute, &cache)
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or(absolute);
            format!("@import \"{}\";", relative)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `WEB/cache/dev.less` and generate the theme's `all.less` when missing
pub async fn prepare(ctx: &AssetContext) -> SwagResult<()> {
    let config = ctx.theme_config().await?;
    let dirs = ctx.dirs().await?;

    write_file(&dirs.web.join("cache/dev.less"), dev_less(config, &dirs))?;

    let all_less = dirs.src.join("less/all.less");
    if !all_less.exists() {
        tracing::info!(file = %ctx.docroot_relative(&all_less).display(), "generating missing file");
        let replacements = HashMap::from([("theme", dirs.theme.clone())]);
        write_file(
            &all_less,
            TemplateProcessor::new().process(all_less_template(), &replacements),
        )?;
    }
    Ok(())
}

/// Compile `dev.less` next to itself and copy the result into `TMP`
pub async fn compile(ctx: &AssetContext) -> SwagResult<()> {
    let config = ctx.theme_config().await?;
    let dirs = ctx.dirs().await?;
    let cache = dirs.web.join("cache");
    let input = cache.join("dev.less");
    let output = cache.join("dev.css");

    let spec = ctx
        .node_tool("lessc")
        .arg("--relative-urls")
        .arg("--source-map")
        .arg(format!("--include-path={}", dirs.root.join("node_modules").display()))
        .args(
            config
                .less_variables()
                .into_iter()
                .map(|(name, value)| format!("--modify-var={}={}", name, value)),
        )
        .arg(input.to_string_lossy())
        .arg(output.to_string_lossy());
    ctx.runner().run(&spec).await?;

    for file in ["dev.css", "dev.css.map"] {
        copy_if_exists(&cache.join(file), &dirs.tmp.join(file))?;
    }
    Ok(())
}

/// `styles:prepare` followed by the compilation
pub async fn styles(ctx: &AssetContext) -> SwagResult<()> {
    prepare(ctx).await?;
    compile(ctx).await
}

fn copy_if_exists(from: &Path, to: &Path) -> SwagResult<()> {
    if !from.is_file() {
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)
            .with_filesystem_error("Failed to create directory", Some(parent.to_path_buf()))?;
    }
    std::fs::copy(from, to)
        .with_filesystem_error("Failed to copy file", Some(to.to_path_buf()))
        .map(|_| ())
}
