use dialoguer::{Input, Password};
use validator::Validate;

use crate::common::{SwagError, SwagResult};
use crate::domain::entities::InstallAnswers;
use crate::infrastructure::filesystem::PreferenceStore;

/// Install answers given as command line flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerOverrides {
    pub url: Option<String>,
    pub dbname: Option<String>,
    pub dbuser: Option<String>,
    pub dbpass: Option<String>,
    pub dbhost: Option<String>,
    pub dbport: Option<String>,
}

impl AnswerOverrides {
    /// `defaults` with every given flag applied
    pub fn apply(&self, defaults: InstallAnswers) -> InstallAnswers {
        InstallAnswers {
            url: self.url.clone().unwrap_or(defaults.url),
            dbname: self.dbname.clone().unwrap_or(defaults.dbname),
            dbuser: self.dbuser.clone().unwrap_or(defaults.dbuser),
            dbpass: self.dbpass.clone().unwrap_or(defaults.dbpass),
            dbhost: self.dbhost.clone().unwrap_or(defaults.dbhost),
            dbport: self.dbport.clone().unwrap_or(defaults.dbport),
        }
    }
}

/// Collects the install answers, pre-filled from the preference store
pub struct InstallPrompts {
    store: PreferenceStore,
    interactive: bool,
}

impl InstallPrompts {
    /// Prompts only run when `assume_yes` is unset and stdin is a terminal
    pub fn new(store: PreferenceStore, assume_yes: bool) -> Self {
        Self {
            store,
            interactive: !assume_yes && atty::is(atty::Stream::Stdin),
        }
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    /// Ask for every answer not given as a flag, then remember the answers
    ///
    /// Invalid answers are rejected before anything is stored.
    pub fn collect(&self, overrides: &AnswerOverrides) -> SwagResult<InstallAnswers> {
        let stored = InstallAnswers::from_preferences(&self.store.load()?);
        let defaults = overrides.apply(stored);

        let answers = if self.interactive {
            self.prompt(defaults, overrides)?
        } else {
            tracing::debug!("non-interactive install, using stored answers and flags");
            defaults
        };

        answers.validate()?;
        self.store.save(&answers.to_preferences())?;
        Ok(answers)
    }

    fn prompt(&self, defaults: InstallAnswers, overrides: &AnswerOverrides) -> SwagResult<InstallAnswers> {
        let ask = |given: &Option<String>, prompt: &str, default: String| -> SwagResult<String> {
            if given.is_some() {
                return Ok(default);
            }
            Input::<String>::new()
                .with_prompt(prompt)
                .default(default)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| SwagError::internal_error_with_source("Prompt failed", e))
        };

        let url = ask(&overrides.url, "Shop url", defaults.url)?;
        let dbname = ask(&overrides.dbname, "Database name", defaults.dbname)?;
        let dbuser = ask(&overrides.dbuser, "Database user", defaults.dbuser)?;
        let dbpass = match overrides.dbpass {
            Some(_) => defaults.dbpass,
            None => {
                let entered = Password::new()
                    .with_prompt("Database password (empty keeps the stored one)")
                    .allow_empty_password(true)
                    .interact()
                    .map_err(|e| SwagError::internal_error_with_source("Prompt failed", e))?;
                if entered.is_empty() {
                    defaults.dbpass
                } else {
                    entered
                }
            }
        };
        let dbhost = ask(&overrides.dbhost, "Database host", defaults.dbhost)?;
        let dbport = ask(&overrides.dbport, "Database port", defaults.dbport)?;

        Ok(InstallAnswers {
            url,
            dbname,
            dbuser,
            dbpass,
            dbhost,
            dbport,
        })
    }
}
