use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError};

use crate::common::templates::{config_php_template, TemplateProcessor};
use crate::domain::entities::preferences::Preferences;

/// Default database host offered by the install prompts
pub const DEFAULT_DB_HOST: &str = "127.0.0.1";

/// Default database port offered by the install prompts
pub const DEFAULT_DB_PORT: &str = "3306";

/// Answers collected by `install`, either prompted or passed as flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct InstallAnswers {
    /// Shop url used as host during the database setup
    pub url: String,

    #[validate(length(min = 1, message = "database name must not be empty"))]
    pub dbname: String,

    #[validate(length(min = 1, message = "database user must not be empty"))]
    pub dbuser: String,

    pub dbpass: String,

    #[validate(length(min = 1, message = "database host must not be empty"))]
    pub dbhost: String,

    #[validate(custom(function = "validate_port"))]
    pub dbport: String,
}

fn validate_port(port: &str) -> Result<(), ValidationError> {
    match port.parse::<u16>() {
        Ok(p) if p > 0 => Ok(()),
        _ => {
            let mut error = ValidationError::new("port");
            error.message = Some("database port must be a number between 1 and 65535".into());
            Err(error)
        }
    }
}

impl Default for InstallAnswers {
    fn default() -> Self {
        Self {
            url: String::new(),
            dbname: String::new(),
            dbuser: String::new(),
            dbpass: String::new(),
            dbhost: DEFAULT_DB_HOST.to_string(),
            dbport: DEFAULT_DB_PORT.to_string(),
        }
    }
}

impl InstallAnswers {
    /// Answers pre-filled from stored preferences, falling back to the defaults
    pub fn from_preferences(preferences: &Preferences) -> Self {
        let defaults = Self::default();
        Self {
            url: preferences.url.clone().unwrap_or(defaults.url),
            dbname: preferences.dbname.clone().unwrap_or(defaults.dbname),
            dbuser: preferences.dbuser.clone().unwrap_or(defaults.dbuser),
            dbpass: preferences.dbpass.clone().unwrap_or(defaults.dbpass),
            dbhost: non_empty(preferences.dbhost.clone()).unwrap_or(defaults.dbhost),
            dbport: non_empty(preferences.dbport.clone()).unwrap_or(defaults.dbport),
        }
    }

    /// Answers as they are persisted in the preference store
    pub fn to_preferences(&self) -> Preferences {
        Preferences {
            url: Some(self.url.clone()),
            dbname: Some(self.dbname.clone()),
            dbuser: Some(self.dbuser.clone()),
            dbpass: Some(self.dbpass.clone()),
            dbhost: Some(self.dbhost.clone()),
            dbport: Some(self.dbport.clone()),
        }
    }

    /// Render Shopware's `config.php`
    ///
    /// Values end up inside single quoted PHP strings, so `\` and `'` are escaped.
    /// Everything else is written verbatim.
    pub fn render_config_php(&self) -> String {
        let replacements: HashMap<&str, String> = HashMap::from([
            ("dbuser", php_single_quoted(&self.dbuser)),
            ("dbpass", php_single_quoted(&self.dbpass)),
            ("dbname", php_single_quoted(&self.dbname)),
            ("dbhost", php_single_quoted(&self.dbhost)),
            ("dbport", php_single_quoted(&self.dbport)),
        ]);

        TemplateProcessor::new().process(config_php_template(), &replacements)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn php_single_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
