use std::path::{Path, PathBuf};

/// Directories the asset tasks work in, for one theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeDirs {
    pub theme: String,
    /// Shopware directory
    pub docroot: PathBuf,
    pub web: PathBuf,
    /// Theme directory
    pub root: PathBuf,
    /// Published resources
    pub dist: PathBuf,
    /// Theme sources
    pub src: PathBuf,
    /// Intermediate build output
    pub tmp: PathBuf,
}

impl ThemeDirs {
    pub fn new(docroot: &Path, theme: &str) -> Self {
        let root = Self::theme_root(docroot, theme);
        Self {
            theme: theme.to_string(),
            docroot: docroot.to_path_buf(),
            web: docroot.join("web"),
            dist: root.join("frontend/_resources"),
            src: root.join("frontend/_public/src"),
            tmp: root.join(".tmp"),
            root,
        }
    }

    pub fn theme_root(docroot: &Path, theme: &str) -> PathBuf {
        docroot.join("themes/Frontend").join(theme)
    }

    /// Same directories for another theme of the inheritance chain
    pub fn for_theme(&self, theme: &str) -> Self {
        Self::new(&self.docroot, theme)
    }
}

/// Join a path or glob onto `base`
///
/// Absolute parts are returned untouched. Leading `!` of negated globs stay in front.
pub fn join_path(base: &Path, part: &str) -> String {
    let rest = part.trim_start_matches('!');
    let negation = &part[..part.len() - rest.len()];

    if Path::new(rest).is_absolute() {
        return part.to_string();
    }
    format!("{}{}", negation, base.join(rest).display())
}

pub fn join_paths(base: &Path, parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| join_path(base, part)).collect()
}
