use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::application::assets::context::AssetContext;
use crate::application::assets::dirs::ThemeDirs;
use crate::common::templates::webpack_config_template;
use crate::common::SwagResult;
use crate::domain::entities::ThemeConfig;
use crate::infrastructure::filesystem::fs_ops::{glob_files, write_file};

/// Environment variable pointing the webpack config shim at its plan
pub const PLAN_ENV: &str = "SWAG_WEBPACK_PLAN";

const JQUERY_PATTERN: &str = r"jquery(\.min)?\.js";

/// Scripts plugins rely on, bundled into the vendor chunk
const RESPONSIVE_DEPENDENCIES: [&str; 3] = [
    "jquery.plugin-base.js",
    "jquery.state-manager.js",
    "jquery.storage-manager.js",
];

/// Everything the webpack config shim needs to know about the theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpackPlan {
    pub production: bool,
    pub context: PathBuf,
    pub entry: BTreeMap<String, Vec<String>>,
    pub resolve_modules: Vec<String>,
    pub aliases: BTreeMap<String, String>,
    pub output: WebpackOutput,
    pub provide: BTreeMap<String, String>,
    pub expose: Vec<ExposeRule>,
    pub transpile_exclude: String,
    pub externals: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpackOutput {
    pub path: PathBuf,
    pub public_path: String,
    pub filename: String,
}

/// Globals a module exposes when it is bundled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExposeRule {
    pub pattern: String,
    pub vars: Vec<String>,
}

struct PlanBuilder<'a> {
    config: &'a ThemeConfig,
    dirs: &'a ThemeDirs,
    project_root: &'a Path,
}

impl<'a> PlanBuilder<'a> {
    fn docroot(&self) -> &Path {
        &self.dirs.docroot
    }

    fn theme_dir(&self, theme: &str, rest: &str) -> PathBuf {
        ThemeDirs::theme_root(self.docroot(), theme).join(rest)
    }

    /// First configured script matching `pattern`, as absolute path
    fn from_config(&self, pattern: &str) -> Option<String> {
        let re = Regex::new(pattern).ok()?;
        self.config
            .js
            .iter()
            .find(|file| re.is_match(file))
            .map(|file| self.docroot().join(file).to_string_lossy().into_owned())
    }

    /// `module` from the first theme of the chain that installed it
    fn from_node_modules(&self, module: &str) -> Option<String> {
        self.config
            .inheritance_path
            .iter()
            .map(|theme| self.theme_dir(theme, "node_modules").join(module))
            .chain(std::iter::once(self.project_root.join("node_modules").join(module)))
            .find(|path| path.exists())
            .map(|path| path.to_string_lossy().into_owned())
    }

    /// Configured scripts that exist on disk, deduplicated
    fn config_files(&self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        let own_resources = format!("Frontend/{}/frontend/_resources/js", self.dirs.theme);
        let mut seen = Vec::new();
        for file in &self.config.js {
            let rooted = PathBuf::from(format!("/{}", file));
            let resolved = if rooted.exists() {
                rooted
            } else {
                self.docroot().join(file)
            };

            if !resolved.exists() {
                if !file.contains(&own_resources) {
                    tracing::warn!(file = %file, "file not found, skipping");
                }
                continue;
            }

            let resolved = resolved.to_string_lossy().into_owned();
            if keep(&resolved) && !seen.contains(&resolved) {
                seen.push(resolved);
            }
        }
        seen
    }

    fn needs_vendor_script(&self) -> bool {
        self.config.parent_theme() == Some("Bare") || self.from_config(JQUERY_PATTERN).is_none()
    }

    fn aliases(&self) -> BTreeMap<String, String> {
        let mut aliases = BTreeMap::new();
        let jquery = self
            .from_config(JQUERY_PATTERN)
            .or_else(|| self.from_node_modules("jquery"));

        let candidates = [
            ("jquery", jquery),
            ("../jquery", Some("jquery".to_string())),
            ("hyperform", self.from_node_modules("hyperform/dist/hyperform.cjs.js")),
            ("modernizr", self.from_config("modernizr")),
            (
                "Responsive",
                Some(
                    self.theme_dir("Responsive", "frontend/_public/src/js")
                        .to_string_lossy()
                        .into_owned(),
                ),
            ),
        ];
        for (name, target) in candidates {
            if let Some(target) = target {
                aliases.insert(name.to_string(), target);
            }
        }

        for theme in &self.config.inheritance_path {
            aliases.insert(
                theme.clone(),
                self.theme_dir(theme, "frontend/_public/src/js")
                    .to_string_lossy()
                    .into_owned(),
            );
        }
        aliases
    }

    fn resolve_modules(&self) -> Vec<String> {
        let mut modules = vec![
            self.dirs.src.join("js").to_string_lossy().into_owned(),
            self.dirs.root.join("tests").to_string_lossy().into_owned(),
        ];
        modules.extend(
            self.config
                .inheritance_path
                .iter()
                .map(|theme| self.theme_dir(theme, "node_modules").to_string_lossy().into_owned()),
        );
        modules.push(self.project_root.join("node_modules").to_string_lossy().into_owned());
        modules
    }

    fn build(&self, scripts: &[PathBuf], production: bool) -> WebpackPlan {
        let theme_sources = format!("Frontend/{}/frontend/_public/src", self.dirs.theme);
        let theme_js = self.config_files(|file| file.contains(&theme_sources));
        let main: Vec<String> = scripts
            .iter()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !theme_js.contains(s))
            .collect();

        let mut entry = BTreeMap::from([("main".to_string(), main)]);
        if self.needs_vendor_script() {
            let mut vendor = vec![self
                .from_node_modules("jquery")
                .unwrap_or_else(|| "jquery".to_string())];
            vendor.extend(RESPONSIVE_DEPENDENCIES.iter().map(|file| {
                self.theme_dir("Responsive", "frontend/_public/src/js")
                    .join(file)
                    .to_string_lossy()
                    .into_owned()
            }));
            entry.insert("vendor".to_string(), vendor);
        }

        let mut externals = BTreeMap::new();
        if self.from_config(JQUERY_PATTERN).is_some() {
            externals.insert("jquery".to_string(), "jQuery".to_string());
        }

        let output = if production {
            WebpackOutput {
                path: self.dirs.dist.join("js"),
                public_path: "frontend/_resources/js/".to_string(),
                filename: "main.js".to_string(),
            }
        } else {
            WebpackOutput {
                path: self.dirs.web.join("cache"),
                public_path: "/web/cache/".to_string(),
                filename: "[name].js".to_string(),
            }
        };

        let provide = [
            ("$", "jquery"),
            ("jQuery", "jquery"),
            ("window.jQuery", "jquery"),
            ("window.picturefill", "picturefill"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let expose = vec![
            ExposeRule {
                pattern: JQUERY_PATTERN.to_string(),
                vars: vec!["jQuery".to_string(), "$".to_string()],
            },
            ExposeRule {
                pattern: r"picturefill\.js".to_string(),
                vars: vec!["picturefill".to_string()],
            },
            ExposeRule {
                pattern: "modernizr".to_string(),
                vars: vec!["Modernizr".to_string()],
            },
        ];

        WebpackPlan {
            production,
            context: self.dirs.src.join("js"),
            entry,
            resolve_modules: self.resolve_modules(),
            aliases: self.aliases(),
            output,
            provide,
            expose,
            transpile_exclude:
                r"(node_modules)|(Frontend/Bare)|(Frontend/Responsive)|(/plugins/)|(/plugins-custom/)"
                    .to_string(),
            externals,
        }
    }
}

/// Assemble the webpack plan for the active theme
///
/// `scripts` are the theme's script roots; the ones the theme configuration
/// already lists are left to Shopware.
pub fn build_plan(
    config: &ThemeConfig,
    dirs: &ThemeDirs,
    project_root: &Path,
    scripts: &[PathBuf],
    production: bool,
) -> WebpackPlan {
    PlanBuilder {
        config,
        dirs,
        project_root,
    }
    .build(scripts, production)
}

/// Scripts from other themes and plugins merged into `WEB/cache/swag.js` for development
fn merged_swag_js(config: &ThemeConfig, dirs: &ThemeDirs, project_root: &Path) -> SwagResult<String> {
    let builder = PlanBuilder {
        config,
        dirs,
        project_root,
    };
    let own_resources = format!("Frontend/{}/frontend/_resources", dirs.theme);
    let files = builder.config_files(|file| !file.contains(&own_resources));
    if files.is_empty() {
        return Ok("/* No custom shopware script files */".to_string());
    }

    let mut merged = String::new();
    for file in files {
        merged.push_str(&std::fs::read_to_string(&file)?);
        merged.push('\n');
    }
    Ok(merged)
}

pub async fn scripts(ctx: &AssetContext) -> SwagResult<()> {
    let config = ctx.theme_config().await?;
    let dirs = ctx.dirs().await?;
    let production = ctx.settings.is_prod();

    let roots = [
        dirs.src.join("js/*.js").to_string_lossy().into_owned(),
        dirs.src.join("scripts/*.js").to_string_lossy().into_owned(),
    ];
    let scripts = glob_files(&roots)?;

    let mut plan = build_plan(config, &dirs, &ctx.project_root, &scripts, production);
    if plan.entry.get("main").map_or(true, Vec::is_empty) {
        let empty = dirs.tmp.join("empty.js");
        write_file(&empty, "/** Intentionally empty **/")?;
        plan.entry
            .insert("main".to_string(), vec![empty.to_string_lossy().into_owned()]);
    }

    if !production {
        let swag = merged_swag_js(config, &dirs, &ctx.project_root)?;
        write_file(&dirs.web.join("cache/swag.js"), swag)?;
    }

    let plan_path = dirs.tmp.join("webpack.plan.json");
    write_file(&plan_path, serde_json::to_string_pretty(&plan)?)?;
    let config_path = dirs.tmp.join("webpack.config.js");
    write_file(&config_path, webpack_config_template())?;

    let spec = ctx
        .node_tool("webpack")
        .arg("--config")
        .arg(config_path.to_string_lossy())
        .env(PLAN_ENV, plan_path.to_string_lossy())
        .env(
            "NODE_PATH",
            ctx.project_root.join("node_modules").to_string_lossy(),
        );
    ctx.runner().run(&spec).await?;
    Ok(())
}
