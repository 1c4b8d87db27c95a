use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use url::Url;
use walkdir::WalkDir;

use crate::application::assets::context::AssetContext;
use crate::application::assets::dirs::join_path;
use crate::common::result::ResultExt;
use crate::common::templates::backstop_template;
use crate::common::SwagResult;
use crate::infrastructure::filesystem::fs_ops::write_file;

/// Backstop commands exposed as `regression:*` tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackstopCommand {
    Test,
    Reference,
    Approve,
}

impl BackstopCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackstopCommand::Test => "test",
            BackstopCommand::Reference => "reference",
            BackstopCommand::Approve => "approve",
        }
    }
}

/// Merge `overlay` into `base`: objects recursively, arrays concatenated
pub fn merge_config(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_config(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(overlay)) => base.extend(overlay),
        (base, overlay) => *base = overlay,
    }
}

/// Scenario url moved onto `host`, keeping path, query and fragment
fn scenario_url(raw: Option<&str>, host: &str) -> String {
    let parsed = Url::parse(raw.unwrap_or("http://localhost")).ok();
    let path = parsed
        .as_ref()
        .map(|u| match u.query() {
            Some(query) => format!("{}?{}", u.path(), query),
            None => u.path().to_string(),
        })
        .unwrap_or_default();
    let fragment = parsed
        .as_ref()
        .and_then(|u| u.fragment())
        .map(|f| format!("#{}", f))
        .unwrap_or_default();
    format!("http://{}{}{}", host, path, fragment)
}

fn docroot_path(docroot: &Path, value: Option<&Value>) -> Option<Value> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| Value::String(join_path(docroot, s)))
}

/// Point scenarios at the shop and make every path absolute to the docroot
///
/// Report and reference folders get the shop id appended so shops don't
/// overwrite each other's bitmaps.
pub fn prepare_config(mut config: Value, docroot: &Path, host: &str, shop: &str) -> Value {
    let Some(object) = config.as_object_mut() else {
        return config;
    };

    if let Some(Value::Array(scenarios)) = object.get_mut("scenarios") {
        for scenario in scenarios.iter_mut().filter_map(Value::as_object_mut) {
            let url = scenario_url(scenario.get("url").and_then(Value::as_str), host);
            scenario.insert("url".to_string(), Value::String(url));
            if let Some(cookie_path) = docroot_path(docroot, scenario.get("cookiePath")) {
                scenario.insert("cookiePath".to_string(), cookie_path);
            }
        }
    }

    for key in ["onBeforeScript", "onReadyScript"] {
        if let Some(script) = docroot_path(docroot, object.get(key)) {
            object.insert(key.to_string(), script);
        }
    }

    if let Some(Value::Object(paths)) = object.get_mut("paths") {
        let rewritten: Map<String, Value> = paths
            .iter()
            .filter_map(|(key, value)| {
                let value = value.as_str()?;
                let path = if key.contains("scripts") {
                    join_path(docroot, value)
                } else {
                    join_path(&docroot.join(value), shop)
                };
                Some((key.clone(), Value::String(path)))
            })
            .collect();
        *paths = rewritten;
    }

    config
}

/// Every `backstop.json` below `root`, skipping `node_modules`
fn theme_configs(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == "backstop.json")
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Merge the backstop configurations and run `backstop <command>`
pub async fn run_backstop(ctx: &AssetContext, command: BackstopCommand) -> SwagResult<()> {
    let dirs = ctx.dirs().await?;

    let mut config: Value = serde_json::from_str(backstop_template())?;
    for file in theme_configs(&dirs.root) {
        let raw = std::fs::read_to_string(&file)
            .with_filesystem_error("Failed to read backstop config", Some(file.clone()))?;
        let overlay: Value = serde_json::from_str(&raw)
            .with_config_error(format!("Invalid backstop config {}", file.display()))?;
        merge_config(&mut config, overlay);
    }
    let config = prepare_config(config, &ctx.docroot, ctx.host(), &ctx.settings.shop);

    let config_path = dirs.tmp.join("backstop.json");
    write_file(&config_path, serde_json::to_string_pretty(&config)?)?;

    let spec = ctx
        .node_tool("backstop")
        .arg(command.as_str())
        .arg(format!("--config={}", config_path.display()))
        .current_dir(&ctx.docroot);
    ctx.runner().run(&spec).await?;
    tracing::info!(command = command.as_str(), "backstop finished");
    Ok(())
}
