use std::path::Path;

use serde::Serialize;

use crate::application::assets::context::AssetContext;
use crate::application::assets::dirs::{join_path, ThemeDirs};
use crate::application::assets::rev::RevManifest;
use crate::common::SwagResult;
use crate::domain::entities::ThemeConfig;
use crate::infrastructure::filesystem::fs_ops::write_file;

const FONT_EXTENSIONS: [&str; 4] = ["woff", "woff2", "ttf", "eot"];
const ASSET_EXTENSIONS: [&str; 6] = ["svg", "gif", "png", "jpg", "js", "css"];

/// Static styleguide images are never precached
const CONTENT_IMAGES: &str = "_resources/img/content";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkboxConfig {
    pub cache_id: String,
    pub sw_dest: String,
    pub runtime_caching: Vec<RuntimeCache>,
    pub glob_strict: bool,
    pub glob_directory: String,
    pub glob_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeCache {
    pub url_pattern: String,
    pub handler: String,
    pub options: CacheOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheOptions {
    pub cache_name: String,
}

fn runtime_cache(extensions: &[&str], handler: &str, cache_name: String) -> RuntimeCache {
    RuntimeCache {
        url_pattern: format!(".*.({})", extensions.join("|")),
        handler: handler.to_string(),
        options: CacheOptions { cache_name },
    }
}

/// Workbox configuration precaching the rev'd files and the compiled theme targets
pub fn workbox_config(
    cache_id: &str,
    dirs: &ThemeDirs,
    config: &ThemeConfig,
    manifest: &RevManifest,
) -> WorkboxConfig {
    let docroot = &dirs.docroot;
    let relative = |absolute: String| {
        pathdiff::diff_paths(&absolute, docroot)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or(absolute)
    };

    let mut glob_patterns: Vec<String> = manifest
        .values()
        .filter(|file| !file.contains(CONTENT_IMAGES))
        .map(|file| relative(join_path(&dirs.root, file)))
        .collect();
    glob_patterns.extend(
        [&config.less_target, &config.js_target]
            .into_iter()
            .flatten()
            .map(|target| relative(join_path(docroot, target))),
    );

    WorkboxConfig {
        cache_id: cache_id.to_string(),
        sw_dest: docroot.join("service-worker.js").to_string_lossy().into_owned(),
        runtime_caching: vec![
            runtime_cache(&FONT_EXTENSIONS, "CacheFirst", format!("{}-font-cache", cache_id)),
            runtime_cache(
                &ASSET_EXTENSIONS,
                "StaleWhileRevalidate",
                format!("{}-asset-cache", cache_id),
            ),
        ],
        glob_strict: false,
        glob_directory: docroot.to_string_lossy().into_owned(),
        glob_patterns,
    }
}

/// `name` of the project's `package.json`, `swag` when unavailable
fn cache_id(project_root: &Path) -> String {
    std::fs::read_to_string(project_root.join("package.json"))
        .ok()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
        .and_then(|pkg| pkg.get("name").and_then(|n| n.as_str()).map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "swag".to_string())
}

fn read_manifest(path: &Path) -> RevManifest {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub async fn generate_service_worker(ctx: &AssetContext) -> SwagResult<()> {
    let config = ctx.theme_config().await?;
    let dirs = ctx.dirs().await?;
    let manifest = read_manifest(&dirs.dist.join("rev-manifest.json"));

    let workbox = workbox_config(&cache_id(&ctx.project_root), &dirs, config, &manifest);
    let config_path = dirs.tmp.join("workbox-config.js");
    write_file(
        &config_path,
        format!("module.exports = {};\n", serde_json::to_string_pretty(&workbox)?),
    )?;

    let spec = ctx
        .node_tool("workbox")
        .arg("generateSW")
        .arg(config_path.to_string_lossy());
    let result = ctx.runner().run(&spec).await?;
    tracing::info!(dest = %workbox.sw_dest, precached = workbox.glob_patterns.len(), "service worker generated");
    tracing::debug!(output = %result.stdout.trim(), "workbox");
    Ok(())
}
