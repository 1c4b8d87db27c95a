pub mod db_settings;
pub mod install_answers;
pub mod preferences;
pub mod project;
pub mod settings;
pub mod theme_config;

pub use db_settings::DbSettings;
pub use install_answers::InstallAnswers;
pub use preferences::Preferences;
pub use project::ProjectLayout;
pub use settings::{PackageSettings, Settings, SettingsOverrides};
pub use theme_config::ThemeConfig;
