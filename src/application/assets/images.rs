use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::application::assets::context::AssetContext;
use crate::common::result::ResultExt;
use crate::common::SwagResult;
use crate::infrastructure::filesystem::fs_ops::{ensure_dir, write_file};

/// Where processed images end up, relative to `TMP`
pub const IMAGE_OUTPUT: &str = "frontend/_resources/img";

/// One icon of the sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteIcon {
    pub id: String,
    pub view_box: Option<String>,
    pub content: String,
}

impl SpriteIcon {
    /// Parse an svg file; the id is its path below the icon root with `/` replaced by `-`
    pub fn parse(id: impl Into<String>, svg: &str) -> Self {
        let view_box = Regex::new(r#"<svg[^>]*\sviewBox="([^"]*)""#)
            .ok()
            .and_then(|re| re.captures(svg).map(|c| c[1].to_string()));

        let content = Regex::new(r"(?s)<svg[^>]*>(.*)</svg>")
            .ok()
            .and_then(|re| re.captures(svg).map(|c| c[1].trim().to_string()))
            .unwrap_or_default();

        Self {
            id: id.into(),
            view_box,
            content,
        }
    }
}

/// Combine icons into one svg of `<symbol>`s
pub fn build_sprite(icons: &[SpriteIcon]) -> String {
    let mut sprite = String::from(r#"<svg xmlns="http://www.w3.org/2000/svg">"#);
    for icon in icons {
        match &icon.view_box {
            Some(view_box) => sprite.push_str(&format!(
                r#"<symbol id="{}" viewBox="{}">"#,
                icon.id, view_box
            )),
            None => sprite.push_str(&format!(r#"<symbol id="{}">"#, icon.id)),
        }
        sprite.push_str(&icon.content);
        sprite.push_str("</symbol>");
    }
    sprite.push_str("</svg>");
    sprite
}

fn icon_id(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("-")
}

/// Files below `root`, sorted, as (absolute, relative) pairs
fn files_below(root: &Path) -> Vec<(PathBuf, PathBuf)> {
    let mut files: Vec<(PathBuf, PathBuf)> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?.to_path_buf();
            Some((entry.into_path(), relative))
        })
        .collect();
    files.sort();
    files
}

/// Build `TMP/frontend/_resources/img/icons.svg` from `SRC/img/icons/**/*.svg`
pub async fn svgstore(ctx: &AssetContext) -> SwagResult<()> {
    let dirs = ctx.dirs().await?;
    let icons_root = dirs.src.join("img/icons");

    let icons = files_below(&icons_root)
        .into_iter()
        .filter(|(path, _)| path.extension().map_or(false, |ext| ext == "svg"))
        .map(|(path, relative)| {
            let svg = std::fs::read_to_string(&path)
                .with_filesystem_error("Failed to read icon", Some(path.clone()))?;
            Ok(SpriteIcon::parse(icon_id(&relative), &svg))
        })
        .collect::<SwagResult<Vec<_>>>()?;

    if icons.is_empty() {
        tracing::info!(dir = %icons_root.display(), "no icons found");
        return Ok(());
    }

    let target = dirs.tmp.join(IMAGE_OUTPUT).join("icons.svg");
    write_file(&target, build_sprite(&icons))?;
    tracing::info!(icons = icons.len(), sprite = %target.display(), "svgstore");
    Ok(())
}

/// Copy `img/**` of every theme in the chain into `TMP`, the child theme winning
///
/// Icon svgs are left out since they go into the sprite.
pub async fn imagemin(ctx: &AssetContext) -> SwagResult<()> {
    let config = ctx.theme_config().await?;
    let dirs = ctx.dirs().await?;
    let target_root = dirs.tmp.join(IMAGE_OUTPUT);

    let mut chain: Vec<&str> = config.inheritance_path.iter().map(String::as_str).collect();
    if chain.is_empty() {
        chain.push(&dirs.theme);
    }

    let mut copied = 0;
    for theme in chain.iter().rev() {
        let img = dirs.for_theme(theme).src.join("img");
        for (path, relative) in files_below(&img) {
            let is_icon = relative.starts_with("icons")
                && path.extension().map_or(false, |ext| ext == "svg");
            if is_icon {
                continue;
            }

            let target = target_root.join(&relative);
            if let Some(parent) = target.parent() {
                ensure_dir(parent)?;
            }
            std::fs::copy(&path, &target)
                .with_filesystem_error("Failed to copy image", Some(target.clone()))?;
            copied += 1;
        }
    }

    tracing::info!(copied, "imagemin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::assets::context::test_support::{context, theme_config, RecordingRunner};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_parse_and_build_sprite() {
        let svg = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="24" viewBox="0 0 24 24"><path d="M0 0h24"/></svg>"#;
        let icon = SpriteIcon::parse("arrows-left", svg);
        assert_eq!(icon.view_box.as_deref(), Some("0 0 24 24"));
        assert_eq!(icon.content, r#"<path d="M0 0h24"/>"#);

        assert_eq!(
            build_sprite(&[icon]),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><symbol id="arrows-left" viewBox="0 0 24 24"><path d="M0 0h24"/></symbol></svg>"#
        );
    }

    #[test]
    fn test_icon_ids() {
        assert_eq!(icon_id(Path::new("cart.svg")), "cart");
        assert_eq!(icon_id(Path::new("arrows/left.svg")), "arrows-left");
    }

    #[tokio::test]
    async fn test_imagemin_child_wins() {
        let temp = TempDir::new().unwrap();
        let write = |theme: &str, file: &str, content: &str| {
            let path = temp
                .path()
                .join("themes/Frontend")
                .join(theme)
                .join("frontend/_public/src/img")
                .join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        };
        write("Custom", "logo.png", "child");
        write("Custom", "icons/cart.svg", "<svg/>");
        write("Responsive", "logo.png", "parent");
        write("Responsive", "bg.jpg", "parent");

        let ctx = context(
            temp.path(),
            theme_config(&["Custom", "Responsive"]),
            Arc::new(RecordingRunner::default()),
        );
        imagemin(&ctx).await.unwrap();

        let out = temp.path().join("themes/Frontend/Custom/.tmp/frontend/_resources/img");
        assert_eq!(fs::read_to_string(out.join("logo.png")).unwrap(), "child");
        assert_eq!(fs::read_to_string(out.join("bg.jpg")).unwrap(), "parent");
        assert!(!out.join("icons/cart.svg").exists());
    }

    #[tokio::test]
    async fn test_svgstore_writes_sprite() {
        let temp = TempDir::new().unwrap();
        let icons = temp.path().join("themes/Frontend/Custom/frontend/_public/src/img/icons/arrows");
        fs::create_dir_all(&icons).unwrap();
        fs::write(icons.join("left.svg"), r#"<svg viewBox="0 0 8 8"><g/></svg>"#).unwrap();

        let ctx = context(temp.path(), theme_config(&["Custom"]), Arc::new(RecordingRunner::default()));
        svgstore(&ctx).await.unwrap();

        let sprite = fs::read_to_string(
            temp.path()
                .join("themes/Frontend/Custom/.tmp/frontend/_resources/img/icons.svg"),
        )
        .unwrap();
        assert!(sprite.contains(r#"<symbol id="arrows-left" viewBox="0 0 8 8"><g/></symbol>"#));
    }
}
