/// Templates module for embedded project files
/// Every template is embedded at compile time using the include_str! macro
use std::collections::HashMap;

use regex::{Captures, Regex};

/// Shopware `config.php` written by `install`
pub fn config_php_template() -> &'static str {
    include_str!("../../templates/config.php")
}

/// `.gitmodules` entry for the Shopware submodule
pub fn gitmodules_template() -> &'static str {
    include_str!("../../templates/gitmodules")
}

/// Content of the `.shopware-cli.json` project marker
pub fn marker_template() -> &'static str {
    include_str!("../../templates/marker")
}

/// Header of a generated theme `all.less`
pub fn all_less_template() -> &'static str {
    include_str!("../../templates/all.less")
}

/// Base backstop configuration merged with the theme ones
pub fn backstop_template() -> &'static str {
    include_str!("../../templates/backstop.json")
}

/// webpack config reading the plan computed by the `scripts` task
pub fn webpack_config_template() -> &'static str {
    include_str!("../../templates/webpack.config.js")
}

/// Template replacement functionality
///
/// Placeholders have the form `{{name}}`. Unknown placeholders are left untouched.
pub struct TemplateProcessor;

impl TemplateProcessor {
    /// Create a new template processor
    pub fn new() -> Self {
        Self
    }

    /// Substitute every `{{key}}` occurrence with its replacement
    ///
    /// The template is scanned once, so replacement values are never expanded again.
    pub fn process(&self, template: &str, replacements: &HashMap<&str, String>) -> String {
        let Ok(placeholder) = Regex::new(r"\{\{(\w+)\}\}") else {
            return template.to_string();
        };

        placeholder
            .replace_all(template, |caps: &Captures| match replacements.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}
