use serde::{Deserialize, Serialize};

/// Values remembered between install sessions to pre-fill the prompts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbuser: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbpass: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbhost: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbport: Option<String>,
}

impl Preferences {
    /// Stored shop url, empty when never answered
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}
