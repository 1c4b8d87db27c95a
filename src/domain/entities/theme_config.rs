use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Theme configuration dumped by `sw:theme:dump:configuration`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    /// LESS files, relative to the docroot after [`ThemeConfig::repair`]
    pub less: Vec<String>,

    /// Script files, relative to the docroot after [`ThemeConfig::repair`]
    pub js: Vec<String>,

    /// Theme chain, child first
    pub inheritance_path: Vec<String>,

    /// Theme variables passed to LESS
    pub config: serde_json::Map<String, serde_json::Value>,

    pub less_target: Option<String>,

    pub js_target: Option<String>,
}

impl ThemeConfig {
    /// Location of the dump for a shop
    pub fn dump_path(docroot: &Path, shop: &str) -> PathBuf {
        docroot
            .join("web")
            .join("cache")
            .join(format!("config_{}.json", shop))
    }

    /// The active theme: first entry of the inheritance path
    pub fn current_theme(&self) -> Option<&str> {
        self.inheritance_path.first().map(String::as_str)
    }

    /// Direct parent of the active theme
    pub fn parent_theme(&self) -> Option<&str> {
        self.inheritance_path.get(1).map(String::as_str)
    }

    /// Rewrite misresolved `less` and `js` paths relative to the docroot
    ///
    /// Paths dumped inside a container start with `/project/`, which maps to the
    /// parent of the docroot. Paths missing their leading slash are retried as
    /// absolute paths.
    pub fn repair(mut self, docroot: &Path) -> Self {
        self.less = self.less.iter().map(|f| repair_path(f, docroot)).collect();
        self.js = self.js.iter().map(|f| repair_path(f, docroot)).collect();
        self
    }

    /// Theme variables as LESS `name=value` pairs
    ///
    /// Null and empty values are skipped since LESS rejects empty declarations.
    pub fn less_variables(&self) -> Vec<(String, String)> {
        self.config
            .iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) if !s.is_empty() => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key.clone(), value))
            })
            .collect()
    }
}

fn repair_path(file: &str, docroot: &Path) -> String {
    let project_prefix = ["/project/", "project/"]
        .iter()
        .find_map(|prefix| file.strip_prefix(prefix));

    let candidate = match (project_prefix, docroot.parent()) {
        (Some(rest), Some(project)) => project.join(rest),
        _ => PathBuf::from(file),
    };

    let absolute = if candidate.exists() {
        Some(absolutize(&candidate))
    } else if Path::new(&format!("/{}", file)).exists() {
        Some(PathBuf::from(format!("/{}", file)))
    } else {
        None
    };

    absolute
        .and_then(|path| pathdiff::diff_paths(path, docroot))
        .map(|relative| relative.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
